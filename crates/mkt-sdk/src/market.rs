use std::sync::Arc;

use mkt_ledger::{LedgerReader, TxReceipt, Wallet, WriteCall};
use mkt_types::{format_ether, Address, ItemId, ListingRecord};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult, Operation};
use crate::orchestrator::{self, Orchestrator};
use crate::session::{self, Session};
use crate::store::{Store, ViewKind, ViewState};
use crate::sync;

/// The client-side marketplace controller.
///
/// Binds a session once at startup, then serves the presentation layer:
/// two refresh entry points, three write workflows, and the view state.
/// Every method takes `&self`; share the controller behind an `Arc` to drive
/// overlapping operations. Nothing is queued or deduplicated.
pub struct Marketplace {
    config: MarketConfig,
    store: Store,
    session: Result<Session, MarketError>,
    wallet: Option<Arc<dyn Wallet>>,
}

impl Marketplace {
    /// Start the controller and run the session binder.
    ///
    /// A failed bind does not fail startup: the controller comes up blocked,
    /// with no session and the bind error in the error slot.
    pub async fn start(config: MarketConfig, wallet: Option<Arc<dyn Wallet>>) -> Self {
        let store = Store::new();
        let session = session::bind(&config, wallet.as_deref()).await;
        match &session {
            Ok(s) => store.set_session(s.signer()),
            Err(e) => store.report(Operation::Bind, e.clone()),
        }
        Self {
            config,
            store,
            session,
            wallet,
        }
    }

    // ---- State ----

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref().ok()
    }

    pub fn signer(&self) -> Option<Address> {
        self.session().map(Session::signer)
    }

    /// The reason the controller is blocked, if binding failed.
    pub fn bind_error(&self) -> Option<&MarketError> {
        self.session.as_ref().err()
    }

    pub fn state(&self) -> ViewState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.subscribe()
    }

    // ---- Synchronization ----

    pub async fn refresh_for_sale(&self) -> MarketResult<Vec<ListingRecord>> {
        self.refresh(ViewKind::ForSale).await
    }

    pub async fn refresh_minted_not_for_sale(&self) -> MarketResult<Vec<ListingRecord>> {
        self.refresh(ViewKind::MintedNotForSale).await
    }

    /// Refresh both views, for-sale first. Stops at the first failure.
    pub async fn refresh_all(&self) -> MarketResult<()> {
        self.refresh_for_sale().await?;
        self.refresh_minted_not_for_sale().await?;
        Ok(())
    }

    pub async fn refresh(&self, kind: ViewKind) -> MarketResult<Vec<ListingRecord>> {
        self.store.clear_error();
        let result = self.pass(kind).await;
        if let Err(e) = &result {
            self.store.report(kind.operation(), e.clone());
        }
        result
    }

    /// One synchronization pass. Leaves the error slot alone.
    async fn pass(&self, kind: ViewKind) -> MarketResult<Vec<ListingRecord>> {
        match &self.session {
            Ok(session) => sync::refresh(session.ledger(), &self.store, kind).await,
            Err(_) => Err(MarketError::RemoteReadError("session not bound".into())),
        }
    }

    /// Ids the contract itself reports as available for sale.
    pub async fn available_items(&self) -> MarketResult<Vec<ItemId>> {
        self.store.clear_error();
        let result = match &self.session {
            Ok(session) => session
                .ledger()
                .available_items()
                .await
                .map_err(MarketError::read),
            Err(_) => Err(MarketError::RemoteReadError("session not bound".into())),
        };
        if let Err(e) = &result {
            self.store.report(Operation::AvailableItems, e.clone());
        }
        result
    }

    // ---- Write workflows ----

    /// Mint a new item owned by `owner`, priced in major units.
    pub async fn mint(&self, owner: Address, price: &str, content_url: &str) -> MarketResult<TxReceipt> {
        self.write(Operation::Mint, orchestrator::mint_call(owner, price, content_url))
            .await
    }

    /// Offer `item` for sale at `price` major units.
    pub async fn list(&self, item: ItemId, price: &str) -> MarketResult<TxReceipt> {
        self.write(Operation::List, orchestrator::list_call(item, price))
            .await
    }

    /// Buy `item`, paying `price` major units.
    ///
    /// `price` is whatever the caller last displayed; it is not re-read. If
    /// the remote price moved in the meantime the remote rejects the payment.
    pub async fn purchase(&self, item: ItemId, price: &str) -> MarketResult<TxReceipt> {
        self.write(Operation::Purchase, orchestrator::purchase_call(item, price))
            .await
    }

    /// Buy a displayed listing at its displayed price.
    pub async fn purchase_listing(&self, listing: &ListingRecord) -> MarketResult<TxReceipt> {
        self.purchase(listing.item_id, &format_ether(listing.price))
            .await
    }

    async fn write(
        &self,
        operation: Operation,
        call: MarketResult<WriteCall>,
    ) -> MarketResult<TxReceipt> {
        self.store.clear_error();
        match self.submit(call).await {
            Ok(receipt) => {
                info!(%operation, tx = %receipt.hash.short_hex(), "write workflow complete, resynchronizing");
                self.resync().await;
                Ok(receipt)
            }
            Err(e) => {
                debug!(%operation, error = %e, "write workflow failed");
                self.store.report(operation, e.clone());
                Err(e)
            }
        }
    }

    async fn submit(&self, call: MarketResult<WriteCall>) -> MarketResult<TxReceipt> {
        let call = call?;
        let session = self.session.as_ref().map_err(Clone::clone)?;
        let mut orchestrator = Orchestrator::new(session.ledger(), session.signer());
        if self.config.reject_stale_session {
            if let Some(wallet) = self.wallet.as_deref() {
                orchestrator = orchestrator.guard_account(wallet);
            }
        }
        orchestrator.execute(call).await
    }

    /// Re-derive both views after a confirmed write. Both passes run; the
    /// first failure is reported once they finish. The write itself already
    /// succeeded.
    async fn resync(&self) {
        let mut failure = None;
        for kind in [ViewKind::ForSale, ViewKind::MintedNotForSale] {
            if let Err(e) = self.pass(kind).await {
                failure.get_or_insert((kind, e));
            }
        }
        if let Some((kind, e)) = failure {
            self.store.report(kind.operation(), e);
        }
    }
}
