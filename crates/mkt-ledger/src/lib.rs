//! Remote ledger boundary for the marketplace controller.
//!
//! The marketplace contract is an external, authoritative service. This
//! crate describes how the controller talks to it:
//! - `LedgerReader` / `LedgerWriter` async trait boundaries
//! - `Wallet`, the signing capability that yields an identity and a bound
//!   ledger handle
//! - `ContractBinding`, the fixed address + interface pair a handle is bound to
//! - Two-phase writes: `WriteCall` → `PendingTx` → `TxReceipt`
//! - `Devnet`, an in-memory marketplace host for tests, demos, and the CLI

pub mod binding;
pub mod error;
pub mod memory;
pub mod traits;
pub mod tx;
pub mod wallet;

pub use binding::{ContractBinding, ContractInterface};
pub use error::{LedgerError, LedgerResult};
pub use memory::{DevWallet, Devnet, DevnetContract};
pub use traits::{LedgerReader, LedgerWriter, RemoteLedger};
pub use tx::{PendingTx, TxHash, TxReceipt, WriteCall};
pub use wallet::{Wallet, WalletError};
