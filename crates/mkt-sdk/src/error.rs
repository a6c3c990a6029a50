use std::fmt;

use mkt_ledger::{LedgerError, WalletError};
use mkt_types::{Address, AmountError, ItemId};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("no signing capability available")]
    NoSigningCapability,

    #[error("account access denied: {0}")]
    ConsentDenied(String),

    #[error("remote read failed: {0}")]
    RemoteReadError(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("remote rejected write: {0}")]
    RemoteWriteRejected(String),

    #[error("signing account changed since bind (bound {bound}, active {})", display_active(.active))]
    StaleSession {
        bound: Address,
        active: Option<Address>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

fn display_active(active: &Option<Address>) -> String {
    active.map(|a| a.to_hex()).unwrap_or_else(|| "none".into())
}

impl MarketError {
    /// Classify a failed read during synchronization.
    pub fn read(err: LedgerError) -> Self {
        Self::RemoteReadError(err.to_string())
    }

    pub fn read_item(item: ItemId, err: LedgerError) -> Self {
        Self::RemoteReadError(format!("item {item}: {err}"))
    }

    /// Classify a failed submit or confirmation. The reason is passed
    /// through verbatim.
    pub fn rejected(err: LedgerError) -> Self {
        match err {
            LedgerError::Reverted(reason) => Self::RemoteWriteRejected(reason),
            other => Self::RemoteWriteRejected(other.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoSigningCapability => "no_signing_capability",
            Self::ConsentDenied(_) => "consent_denied",
            Self::RemoteReadError(_) => "remote_read_error",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::RemoteWriteRejected(_) => "remote_write_rejected",
            Self::StaleSession { .. } => "stale_session",
            Self::Config(_) => "config",
        }
    }
}

impl From<WalletError> for MarketError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ConsentDenied(reason) => Self::ConsentDenied(reason),
            WalletError::NoAccounts => Self::ConsentDenied(err.to_string()),
            WalletError::Unavailable(_) => Self::NoSigningCapability,
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;

/// Controller operation an error is reported against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Bind,
    RefreshForSale,
    RefreshMintedNotForSale,
    AvailableItems,
    Mint,
    List,
    Purchase,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bind => "connecting wallet",
            Self::RefreshForSale => "fetching items for sale",
            Self::RefreshMintedNotForSale => "fetching minted items",
            Self::AvailableItems => "fetching available items",
            Self::Mint => "minting item",
            Self::List => "listing item",
            Self::Purchase => "buying item",
        };
        f.write_str(label)
    }
}

/// The single current error shown to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationError {
    pub operation: Operation,
    pub error: MarketError,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.operation, self.error)
    }
}
