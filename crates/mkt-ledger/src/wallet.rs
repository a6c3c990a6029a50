use std::sync::Arc;

use async_trait::async_trait;
use mkt_types::Address;
use thiserror::Error;

use crate::binding::ContractBinding;
use crate::error::LedgerResult;
use crate::traits::RemoteLedger;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("user rejected the request: {0}")]
    ConsentDenied(String),

    #[error("wallet exposes no accounts")]
    NoAccounts,

    #[error("wallet unavailable: {0}")]
    Unavailable(String),
}

/// A signing capability in the host environment.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Ask for the active account. May prompt the user and may be refused.
    async fn request_account(&self) -> Result<Address, WalletError>;

    /// The account currently selected in the wallet, without prompting.
    async fn active_account(&self) -> Option<Address>;

    /// Bind a ledger handle to `binding` whose writes are signed by `signer`.
    fn connect(
        &self,
        binding: &ContractBinding,
        signer: Address,
    ) -> LedgerResult<Arc<dyn RemoteLedger>>;
}
