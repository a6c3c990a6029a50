//! Write workflows: validate, submit, await confirmation.
//!
//! Re-synchronization after a confirmed write is the caller's job; see
//! [`crate::Marketplace`].

use mkt_ledger::{RemoteLedger, TxReceipt, Wallet, WriteCall};
use mkt_types::{parse_ether, Address, ItemId};
use tracing::{info, warn};

use crate::error::{MarketError, MarketResult};

/// Build a mint call. Fails with `InvalidAmount` before anything is sent.
pub fn mint_call(owner: Address, price: &str, content_url: &str) -> MarketResult<WriteCall> {
    Ok(WriteCall::Mint {
        owner,
        price: parse_ether(price)?,
        content_url: content_url.to_string(),
    })
}

/// Build a list-for-sale call. Ownership is enforced remotely.
pub fn list_call(item: ItemId, price: &str) -> MarketResult<WriteCall> {
    Ok(WriteCall::List {
        item,
        price: parse_ether(price)?,
    })
}

/// Build a purchase call paying `price`.
pub fn purchase_call(item: ItemId, price: &str) -> MarketResult<WriteCall> {
    Ok(WriteCall::Purchase {
        item,
        payment: parse_ether(price)?,
    })
}

/// Submits writes through a bound ledger handle.
pub struct Orchestrator<'a> {
    ledger: &'a dyn RemoteLedger,
    bound: Address,
    wallet: Option<&'a dyn Wallet>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ledger: &'a dyn RemoteLedger, bound: Address) -> Self {
        Self {
            ledger,
            bound,
            wallet: None,
        }
    }

    /// Check the wallet's active account against the bound signer before
    /// every write.
    pub fn guard_account(mut self, wallet: &'a dyn Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Submit `call` and wait for its terminal outcome.
    ///
    /// There is no timeout and no retry: the wait ends when the ledger
    /// confirms or rejects.
    pub async fn execute(&self, call: WriteCall) -> MarketResult<TxReceipt> {
        if let Some(wallet) = self.wallet {
            let active = wallet.active_account().await;
            if active != Some(self.bound) {
                warn!(bound = %self.bound, "active account changed since bind");
                return Err(MarketError::StaleSession {
                    bound: self.bound,
                    active,
                });
            }
        }

        let function = call.function();
        let pending = self.ledger.submit(call).await.map_err(|e| {
            warn!(function, error = %e, "write not accepted");
            MarketError::rejected(e)
        })?;
        info!(function, tx = %pending.hash.short_hex(), "write submitted, awaiting confirmation");

        let receipt = self.ledger.confirm(&pending).await.map_err(|e| {
            warn!(function, tx = %pending.hash.short_hex(), error = %e, "write rejected");
            MarketError::rejected(e)
        })?;
        info!(function, tx = %receipt.hash.short_hex(), block = receipt.block, "write confirmed");
        Ok(receipt)
    }
}
