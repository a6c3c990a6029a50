use mkt_types::Address;
use serde::{Deserialize, Serialize};

use crate::tx::WriteCall;

/// The call surface the controller expects a contract to expose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub name: String,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
}

impl ContractInterface {
    /// The marketplace contract interface.
    pub fn marketplace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reads: ["tokenId", "nfts", "getAvailableNFTs"]
                .into_iter()
                .map(String::from)
                .collect(),
            writes: ["mintNFT", "sellNFT", "buyNFT"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn supports(&self, function: &str) -> bool {
        self.reads.iter().chain(self.writes.iter()).any(|f| f == function)
    }

    pub fn supports_call(&self, call: &WriteCall) -> bool {
        self.writes.iter().any(|f| f == call.function())
    }

    /// `true` if every function of `required` is present here.
    pub fn covers(&self, required: &ContractInterface) -> bool {
        required
            .reads
            .iter()
            .chain(required.writes.iter())
            .all(|f| self.supports(f))
    }
}

/// A fixed contract address paired with the interface expected there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBinding {
    pub address: Address,
    pub interface: ContractInterface,
}

impl ContractBinding {
    pub fn new(address: Address, interface: ContractInterface) -> Self {
        Self { address, interface }
    }

    pub fn marketplace(address: Address, name: impl Into<String>) -> Self {
        Self::new(address, ContractInterface::marketplace(name))
    }
}
