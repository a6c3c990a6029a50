use std::path::Path;

use mkt_ledger::ContractBinding;
use mkt_types::Address;
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

/// First contract address on a fresh local development chain.
pub const DEFAULT_CONTRACT_ADDRESS: Address = Address::from_bytes([
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64,
    0x2f, 0x64, 0x18, 0x0a, 0xa3,
]);

pub const DEFAULT_CONTRACT_NAME: &str = "NFTMarketplace";

/// Controller configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Pre-agreed address of the marketplace contract.
    pub contract_address: Address,
    /// Interface name expected at `contract_address`.
    pub contract_name: String,
    /// When `true`, writes fail with `StaleSession` if the wallet's active
    /// account no longer matches the account bound at startup.
    pub reject_stale_session: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            contract_name: DEFAULT_CONTRACT_NAME.into(),
            reject_stale_session: true,
        }
    }
}

impl MarketConfig {
    pub fn from_toml_str(raw: &str) -> MarketResult<Self> {
        toml::from_str(raw).map_err(|e| MarketError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> MarketResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MarketError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> MarketResult<String> {
        toml::to_string_pretty(self).map_err(|e| MarketError::Config(e.to_string()))
    }

    /// The fixed address + interface pair sessions bind to.
    pub fn binding(&self) -> ContractBinding {
        ContractBinding::marketplace(self.contract_address, self.contract_name.clone())
    }
}
