//! Foundation types for the marketplace controller.
//!
//! This crate provides the identity, amount, and record types shared by the
//! ledger boundary and the controller. Every other marketplace crate depends
//! on `mkt-types`.
//!
//! # Key Types
//!
//! - [`Address`]: 20-byte account or contract address
//! - [`ItemId`]: Positive, dense item identifier assigned by the ledger
//! - [`Wei`]: Amount in the smallest currency unit
//! - [`ItemRecord`]: Per-item record as reported by the remote ledger
//! - [`ListingRecord`]: An [`ItemRecord`] augmented with its [`ItemId`]

pub mod address;
pub mod amount;
pub mod error;
pub mod listing;

pub use address::Address;
pub use amount::{format_ether, parse_ether, Wei, ETHER_DECIMALS};
pub use error::{AmountError, TypeError};
pub use listing::{ItemId, ItemRecord, ListingRecord};
