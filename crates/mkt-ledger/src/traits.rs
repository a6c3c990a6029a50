use async_trait::async_trait;
use mkt_types::{Address, ItemId, ItemRecord};

use crate::error::LedgerResult;
use crate::tx::{PendingTx, TxReceipt, WriteCall};

/// Read boundary of the remote marketplace contract.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// The total-supply counter. Items `1..=total_supply` exist.
    async fn total_supply(&self) -> LedgerResult<u64>;

    async fn record(&self, item: ItemId) -> LedgerResult<ItemRecord>;

    /// Ids currently offered for sale, as the contract indexes them.
    async fn available_items(&self) -> LedgerResult<Vec<ItemId>>;
}

/// Write boundary of the remote marketplace contract.
///
/// Writes are two-phase. `submit` hands the call to the remote and returns
/// as soon as it is accepted for inclusion; `confirm` waits for the terminal
/// outcome. Only a confirmed write is durable.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Identity every write from this handle is attributed to.
    fn signer(&self) -> Option<Address>;

    async fn submit(&self, call: WriteCall) -> LedgerResult<PendingTx>;

    async fn confirm(&self, tx: &PendingTx) -> LedgerResult<TxReceipt>;
}

/// A handle bound to one contract that can both read and write.
pub trait RemoteLedger: LedgerReader + LedgerWriter {}

impl<T: LedgerReader + LedgerWriter + ?Sized> RemoteLedger for T {}
