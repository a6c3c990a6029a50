use mkt_types::{Address, ItemId};

/// Errors produced at the remote ledger boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("item {0} does not exist")]
    NonexistentItem(ItemId),

    #[error("no contract deployed at {0}")]
    NoContract(Address),

    #[error("contract at {address} is {found}, expected {expected}")]
    InterfaceMismatch {
        address: Address,
        expected: String,
        found: String,
    },

    #[error("contract already deployed at {0}")]
    AlreadyDeployed(Address),

    #[error("write calls require a signer")]
    ReadOnly,

    #[error("unknown transaction {0}")]
    UnknownTransaction(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("state error: {0}")]
    State(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
