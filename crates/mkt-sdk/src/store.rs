//! Session and view state consumed by the presentation layer.
//!
//! The store holds one [`ViewState`] value. Every change replaces fields of
//! that value inside a single `send_modify`, so a reader holding a snapshot
//! or a subscription never observes a half-applied update.

use std::fmt;
use std::sync::Arc;

use mkt_types::{Address, ListingRecord};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::{MarketError, Operation, OperationError};

/// The two materialized views of remote inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    ForSale,
    MintedNotForSale,
}

impl ViewKind {
    /// Whether a record with the given sale flag belongs in this view.
    pub fn includes(&self, is_for_sale: bool) -> bool {
        match self {
            Self::ForSale => is_for_sale,
            Self::MintedNotForSale => !is_for_sale,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::ForSale => Operation::RefreshForSale,
            Self::MintedNotForSale => Operation::RefreshMintedNotForSale,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ForSale => "for-sale",
            Self::MintedNotForSale => "minted",
        })
    }
}

/// A consistent snapshot of everything presentation may show.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    /// Signer identity of the bound session.
    pub session: Option<Address>,
    pub for_sale: Arc<Vec<ListingRecord>>,
    pub minted_not_for_sale: Arc<Vec<ListingRecord>>,
    /// Synchronization passes currently running.
    pub in_flight: usize,
    pub error: Option<OperationError>,
    /// Bumped on every change.
    pub revision: u64,
}

impl ViewState {
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn view(&self, kind: ViewKind) -> &[ListingRecord] {
        match kind {
            ViewKind::ForSale => &self.for_sale,
            ViewKind::MintedNotForSale => &self.minted_not_for_sale,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

pub struct Store {
    tx: watch::Sender<ViewState>,
}

impl Store {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewState::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Receive every subsequent snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    pub(crate) fn set_session(&self, signer: Address) {
        self.update(|s| s.session = Some(signer));
    }

    pub(crate) fn replace_view(&self, kind: ViewKind, records: Vec<ListingRecord>) {
        let records = Arc::new(records);
        self.update(|s| match kind {
            ViewKind::ForSale => s.for_sale = records,
            ViewKind::MintedNotForSale => s.minted_not_for_sale = records,
        });
    }

    pub(crate) fn report(&self, operation: Operation, error: MarketError) {
        self.update(|s| s.error = Some(OperationError { operation, error }));
    }

    pub(crate) fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    /// Mark a synchronization pass as running until the guard drops.
    pub(crate) fn begin_pass(&self) -> PassGuard<'_> {
        self.update(|s| s.in_flight += 1);
        PassGuard { store: self }
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        self.tx.send_modify(|state| {
            f(state);
            state.revision += 1;
        });
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Busy marker for one synchronization pass.
pub(crate) struct PassGuard<'a> {
    store: &'a Store,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.store
            .update(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkt_types::{ItemId, Wei};

    fn listing(id: u64, for_sale: bool) -> ListingRecord {
        ListingRecord {
            item_id: ItemId::new(id).unwrap(),
            owner: Address::derive(b"owner"),
            price: Wei::ether(1),
            is_for_sale: for_sale,
            content_url: format!("ipfs://{id}"),
        }
    }

    #[test]
    fn view_kind_partition() {
        assert!(ViewKind::ForSale.includes(true));
        assert!(!ViewKind::ForSale.includes(false));
        assert!(ViewKind::MintedNotForSale.includes(false));
        assert_eq!(ViewKind::ForSale.operation(), Operation::RefreshForSale);
    }

    #[test]
    fn replace_view_swaps_whole_sequence() {
        let store = Store::new();
        store.replace_view(ViewKind::ForSale, vec![listing(1, true), listing(3, true)]);
        store.replace_view(ViewKind::MintedNotForSale, vec![listing(2, false)]);
        store.replace_view(ViewKind::ForSale, vec![listing(3, true)]);

        let snap = store.snapshot();
        assert_eq!(snap.view(ViewKind::ForSale).len(), 1);
        assert_eq!(snap.view(ViewKind::MintedNotForSale).len(), 1);
    }

    #[test]
    fn snapshots_are_isolated_from_later_updates() {
        let store = Store::new();
        store.replace_view(ViewKind::ForSale, vec![listing(1, true)]);
        let before = store.snapshot();
        store.replace_view(ViewKind::ForSale, Vec::new());
        assert_eq!(before.for_sale.len(), 1);
        assert!(store.snapshot().for_sale.is_empty());
    }

    #[test]
    fn pass_guard_tracks_overlapping_passes() {
        let store = Store::new();
        let first = store.begin_pass();
        let second = store.begin_pass();
        assert_eq!(store.snapshot().in_flight, 2);
        drop(first);
        assert!(store.snapshot().is_busy());
        drop(second);
        assert!(!store.snapshot().is_busy());
    }

    #[test]
    fn error_slot_holds_one_message() {
        let store = Store::new();
        store.report(Operation::List, MarketError::RemoteWriteRejected("a".into()));
        store.report(Operation::Mint, MarketError::RemoteWriteRejected("b".into()));
        assert_eq!(
            store.snapshot().error_message().as_deref(),
            Some("error minting item: remote rejected write: b")
        );
        store.clear_error();
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = Store::new();
        let mut rx = store.subscribe();
        store.set_session(Address::derive(b"me"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().session, Some(Address::derive(b"me")));
        assert!(rx.borrow().revision > 0);
    }
}
