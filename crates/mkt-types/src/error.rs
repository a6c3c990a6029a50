use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid item id: {0} (item ids start at 1)")]
    InvalidItemId(String),
}

/// Errors produced while converting human-readable decimal amounts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is negative: {0}")]
    Negative(String),

    #[error("malformed decimal amount: {0}")]
    Malformed(String),

    #[error("fractional component exceeds {decimals} decimals: {value}")]
    TooPrecise { value: String, decimals: u32 },

    #[error("amount does not fit in the smallest-unit range: {0}")]
    Overflow(String),
}
