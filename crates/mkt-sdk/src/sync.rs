use mkt_ledger::LedgerReader;
use mkt_types::{ItemId, ListingRecord};
use tracing::{debug, warn};

use crate::error::{MarketError, MarketResult};
use crate::store::{Store, ViewKind};

/// Read every item the ledger holds and keep those belonging to `kind`.
///
/// Items are fetched one at a time in id order. The first failed read
/// aborts the scan.
pub async fn scan<L>(ledger: &L, kind: ViewKind) -> MarketResult<Vec<ListingRecord>>
where
    L: LedgerReader + ?Sized,
{
    let total = ledger.total_supply().await.map_err(MarketError::read)?;
    let mut view = Vec::new();
    for item in ItemId::range(total) {
        let record = ledger
            .record(item)
            .await
            .map_err(|e| MarketError::read_item(item, e))?;
        if kind.includes(record.is_for_sale) {
            view.push(ListingRecord::from_remote(item, record));
        }
    }
    Ok(view)
}

/// Run one synchronization pass and publish its result.
///
/// The store is marked busy for the duration. On success the target view is
/// replaced in full; on failure it is left exactly as it was.
pub async fn refresh<L>(ledger: &L, store: &Store, kind: ViewKind) -> MarketResult<Vec<ListingRecord>>
where
    L: LedgerReader + ?Sized,
{
    let _pass = store.begin_pass();
    debug!(view = %kind, "synchronization pass started");
    match scan(ledger, kind).await {
        Ok(view) => {
            debug!(view = %kind, items = view.len(), "synchronization pass finished");
            store.replace_view(kind, view.clone());
            Ok(view)
        }
        Err(e) => {
            warn!(view = %kind, error = %e, "synchronization pass aborted");
            Err(e)
        }
    }
}
