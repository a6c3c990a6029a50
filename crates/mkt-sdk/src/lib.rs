//! Client-side controller for an NFT marketplace contract.
//!
//! Binds a signer session through a [`Wallet`], mirrors remote inventory
//! into two views (items for sale, and minted items not for sale), and
//! drives the mint, list, and purchase workflows. This is the main entry
//! point for presentation layers embedding the marketplace.
//!
//! ```no_run
//! # async fn demo(wallet: std::sync::Arc<dyn mkt_sdk::Wallet>) -> mkt_sdk::MarketResult<()> {
//! use mkt_sdk::{MarketConfig, Marketplace};
//!
//! let market = Marketplace::start(MarketConfig::default(), Some(wallet)).await;
//! market.refresh_all().await?;
//! for listing in market.state().for_sale.iter() {
//!     println!("{} {} ETH", listing.item_id, listing.display_price());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod market;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod sync;

pub use config::{MarketConfig, DEFAULT_CONTRACT_ADDRESS, DEFAULT_CONTRACT_NAME};
pub use error::{MarketError, MarketResult, Operation, OperationError};
pub use market::Marketplace;
pub use session::Session;
pub use store::{Store, ViewKind, ViewState};

// Re-export key types
pub use mkt_ledger::{ContractBinding, DevWallet, Devnet, TxReceipt, Wallet};
pub use mkt_types::{format_ether, parse_ether, Address, ItemId, ListingRecord, Wei};
