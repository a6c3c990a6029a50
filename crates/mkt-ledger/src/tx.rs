use std::fmt;

use mkt_types::{Address, ItemId, Wei};
use serde::{Deserialize, Serialize};

/// A state-changing call against the marketplace contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteCall {
    Mint {
        owner: Address,
        price: Wei,
        content_url: String,
    },
    List {
        item: ItemId,
        price: Wei,
    },
    Purchase {
        item: ItemId,
        payment: Wei,
    },
}

impl WriteCall {
    /// Contract function this call invokes.
    pub fn function(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mintNFT",
            Self::List { .. } => "sellNFT",
            Self::Purchase { .. } => "buyNFT",
        }
    }

    /// Value attached to the call.
    pub fn value(&self) -> Wei {
        match self {
            Self::Purchase { payment, .. } => *payment,
            _ => Wei::ZERO,
        }
    }

    /// Item this call targets, if it targets an existing one.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Mint { .. } => None,
            Self::List { item, .. } | Self::Purchase { item, .. } => Some(*item),
        }
    }
}

/// Transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn short_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.short_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A submitted, not yet confirmed write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    pub hash: TxHash,
    pub from: Address,
    pub contract: Address,
    pub call: WriteCall,
}

/// Terminal success of a write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub from: Address,
    pub block: u64,
    /// Id assigned by a confirmed mint.
    pub minted: Option<ItemId>,
}
