use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::{format_ether, Wei};
use crate::error::TypeError;

/// Identifier of an item on the remote ledger.
///
/// Item ids are assigned by the ledger, start at 1, and are dense up to the
/// ledger's total-supply counter. Zero never names an item.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(id: u64) -> Result<Self, TypeError> {
        if id == 0 {
            return Err(TypeError::InvalidItemId(id.to_string()));
        }
        Ok(Self(id))
    }

    /// The first id a ledger assigns.
    pub const FIRST: ItemId = ItemId(1);

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Every id a ledger reporting `total_supply` items holds, in scan order.
    pub fn range(total_supply: u64) -> impl Iterator<Item = ItemId> {
        (1..=total_supply).map(ItemId)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let id = digits
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidItemId(s.to_string()))?;
        Self::new(id)
    }
}

impl TryFrom<u64> for ItemId {
    type Error = TypeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// An item as the remote ledger reports it, without its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub owner: Address,
    pub price: Wei,
    pub is_for_sale: bool,
    pub content_url: String,
}

/// A ledger record augmented with the id it was fetched under.
///
/// Listing records are never edited locally. A changed item is only ever
/// observed by fetching it again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub item_id: ItemId,
    pub owner: Address,
    pub price: Wei,
    pub is_for_sale: bool,
    pub content_url: String,
}

impl ListingRecord {
    pub fn from_remote(item_id: ItemId, record: ItemRecord) -> Self {
        Self {
            item_id,
            owner: record.owner,
            price: record.price,
            is_for_sale: record.is_for_sale,
            content_url: record.content_url,
        }
    }

    /// Displayed price in the major unit, e.g. `"1.5"`.
    pub fn display_price(&self) -> String {
        format_ether(self.price)
    }
}
