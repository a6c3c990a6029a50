use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use mkt_types::{Address, ItemId, ItemRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::binding::{ContractBinding, ContractInterface};
use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerReader, LedgerWriter, RemoteLedger};
use crate::tx::{PendingTx, TxHash, TxReceipt, WriteCall};
use crate::wallet::{Wallet, WalletError};

/// In-memory marketplace host for tests, local demos, and the CLI.
///
/// Holds any number of deployed marketplace contracts and mines each
/// submitted write when it is confirmed. State can be saved to and loaded
/// from a JSON file. Faults can be injected to exercise the controller's
/// failure paths; they are never persisted.
pub struct Devnet {
    state: RwLock<DevnetState>,
    faults: Mutex<FaultPlan>,
    calls: AtomicU64,
}

#[derive(Default, Serialize, Deserialize)]
struct DevnetState {
    contracts: BTreeMap<Address, MarketContract>,
    pending: Vec<PendingTx>,
    block: u64,
    nonce: u64,
}

#[derive(Default)]
struct FaultPlan {
    fail_supply_reads: bool,
    fail_next_supply_read: bool,
    failing_reads: HashSet<ItemId>,
    reject_next_write: Option<String>,
}

/// Contract rules mirrored from the marketplace contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct MarketContract {
    name: String,
    deployer: Address,
    items: Vec<ItemRecord>,
    minted_urls: BTreeSet<(Address, String)>,
}

impl MarketContract {
    fn new(name: &str, deployer: Address) -> Self {
        Self {
            name: name.to_string(),
            deployer,
            items: Vec::new(),
            minted_urls: BTreeSet::new(),
        }
    }

    fn item_mut(&mut self, item: ItemId) -> Result<&mut ItemRecord, String> {
        let index = (item.get() - 1) as usize;
        self.items
            .get_mut(index)
            .ok_or_else(|| format!("nonexistent token {item}"))
    }

    /// Apply a call from `from`. Returns the minted id for a mint, or the
    /// revert reason.
    fn execute(&mut self, from: Address, call: &WriteCall) -> Result<Option<ItemId>, String> {
        match call {
            WriteCall::Mint { owner, price, content_url } => {
                if owner.is_zero() {
                    return Err("mint to the zero address".into());
                }
                if content_url.trim().is_empty() {
                    return Err("token URL required".into());
                }
                let key = (*owner, content_url.clone());
                if self.minted_urls.contains(&key) {
                    return Err("token URL already minted for owner".into());
                }
                self.items.push(ItemRecord {
                    owner: *owner,
                    price: *price,
                    is_for_sale: false,
                    content_url: content_url.clone(),
                });
                self.minted_urls.insert(key);
                let id = ItemId::new(self.items.len() as u64).map_err(|e| e.to_string())?;
                Ok(Some(id))
            }
            WriteCall::List { item, price } => {
                let record = self.item_mut(*item)?;
                if record.owner != from {
                    return Err("caller is not the token owner".into());
                }
                if price.is_zero() {
                    return Err("price must be greater than zero".into());
                }
                record.price = *price;
                record.is_for_sale = true;
                Ok(None)
            }
            WriteCall::Purchase { item, payment } => {
                let record = self.item_mut(*item)?;
                if !record.is_for_sale {
                    return Err("token is not for sale".into());
                }
                if *payment != record.price {
                    return Err(format!(
                        "incorrect payment: sent {}, price is {}",
                        payment.as_u128(),
                        record.price.as_u128()
                    ));
                }
                if record.owner == from {
                    return Err("owner cannot buy own token".into());
                }
                record.owner = from;
                record.is_for_sale = false;
                Ok(None)
            }
        }
    }
}

impl Devnet {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(DevnetState::default()),
            faults: Mutex::new(FaultPlan::default()),
            calls: AtomicU64::new(0),
        }
    }

    /// Load devnet state from `path`, or start empty if the file is absent.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::State(format!("{}: {e}", path.display())))?;
        let state: DevnetState =
            serde_json::from_str(&raw).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        debug!(path = %path.display(), contracts = state.contracts.len(), "devnet loaded");
        Ok(Self {
            state: RwLock::new(state),
            ..Self::new()
        })
    }

    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        let encoded = self.read_state(|state| {
            serde_json::to_string_pretty(state).map_err(|e| LedgerError::Serialization(e.to_string()))
        })?;
        std::fs::write(path, encoded)
            .map_err(|e| LedgerError::State(format!("{}: {e}", path.display())))
    }

    /// Well-known development account number `index`.
    pub fn dev_account(index: u32) -> Address {
        Address::derive(format!("devnet-account:{index}").as_bytes())
    }

    /// Publish a marketplace contract named `name`.
    ///
    /// With `at` set the contract lands at that address; otherwise the
    /// address is derived from the deployer and the devnet nonce.
    pub fn deploy(&self, deployer: Address, name: &str, at: Option<Address>) -> LedgerResult<Address> {
        let address = self.write_state(|state| {
            let address = at.unwrap_or_else(|| {
                let mut label = b"contract:".to_vec();
                label.extend_from_slice(deployer.as_bytes());
                label.extend_from_slice(&state.nonce.to_le_bytes());
                Address::derive(&label)
            });
            if state.contracts.contains_key(&address) {
                return Err(LedgerError::AlreadyDeployed(address));
            }
            state.nonce += 1;
            state.block += 1;
            state.contracts.insert(address, MarketContract::new(name, deployer));
            Ok(address)
        })?;
        info!(%address, %deployer, name, "contract deployed");
        Ok(address)
    }

    pub fn is_deployed(&self, address: &Address) -> bool {
        self.read_state(|state| Ok(state.contracts.contains_key(address)))
            .unwrap_or(false)
    }

    /// A handle on the contract described by `binding`, signing as `signer`.
    pub fn bind(
        self: &Arc<Self>,
        binding: &ContractBinding,
        signer: Option<Address>,
    ) -> LedgerResult<DevnetContract> {
        self.read_state(|state| {
            let contract = state
                .contracts
                .get(&binding.address)
                .ok_or(LedgerError::NoContract(binding.address))?;
            let deployed = ContractInterface::marketplace(contract.name.clone());
            if contract.name != binding.interface.name || !deployed.covers(&binding.interface) {
                return Err(LedgerError::InterfaceMismatch {
                    address: binding.address,
                    expected: binding.interface.name.clone(),
                    found: contract.name.clone(),
                });
            }
            Ok(())
        })?;
        Ok(DevnetContract {
            devnet: Arc::clone(self),
            address: binding.address,
            signer,
        })
    }

    // ---- Fault injection ----

    pub fn fail_supply_reads(&self, fail: bool) -> LedgerResult<()> {
        self.faults()?.fail_supply_reads = fail;
        Ok(())
    }

    /// Fail only the next supply read.
    pub fn fail_next_supply_read(&self) -> LedgerResult<()> {
        self.faults()?.fail_next_supply_read = true;
        Ok(())
    }

    pub fn fail_reads_of(&self, item: ItemId) -> LedgerResult<()> {
        self.faults()?.failing_reads.insert(item);
        Ok(())
    }

    /// Revert the next confirmed write with `reason`.
    pub fn reject_next_write(&self, reason: impl Into<String>) -> LedgerResult<()> {
        self.faults()?.reject_next_write = Some(reason.into());
        Ok(())
    }

    pub fn clear_faults(&self) -> LedgerResult<()> {
        *self.faults()? = FaultPlan::default();
        Ok(())
    }

    // ---- Introspection ----

    /// Number of contract calls served, reads and writes alike.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.read_state(|state| Ok(state.pending.len())).unwrap_or(0)
    }

    pub fn block_number(&self) -> u64 {
        self.read_state(|state| Ok(state.block)).unwrap_or(0)
    }

    fn read_state<T>(&self, f: impl FnOnce(&DevnetState) -> LedgerResult<T>) -> LedgerResult<T> {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::State("devnet read lock poisoned".into()))?;
        f(&state)
    }

    fn write_state<T>(&self, f: impl FnOnce(&mut DevnetState) -> LedgerResult<T>) -> LedgerResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|_| LedgerError::State("devnet write lock poisoned".into()))?;
        f(&mut state)
    }

    fn faults(&self) -> LedgerResult<MutexGuard<'_, FaultPlan>> {
        self.faults
            .lock()
            .map_err(|_| LedgerError::State("devnet fault lock poisoned".into()))
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for Devnet {
    fn default() -> Self {
        Self::new()
    }
}

/// A devnet contract handle, optionally bound to a signer.
#[derive(Clone)]
pub struct DevnetContract {
    devnet: Arc<Devnet>,
    address: Address,
    signer: Option<Address>,
}

impl DevnetContract {
    pub fn address(&self) -> Address {
        self.address
    }

    fn with_contract<T>(
        &self,
        f: impl FnOnce(&MarketContract) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        self.devnet.read_state(|state| {
            let contract = state
                .contracts
                .get(&self.address)
                .ok_or(LedgerError::NoContract(self.address))?;
            f(contract)
        })
    }
}

#[async_trait]
impl LedgerReader for DevnetContract {
    async fn total_supply(&self) -> LedgerResult<u64> {
        tokio::task::yield_now().await;
        self.devnet.count_call();
        {
            let mut faults = self.devnet.faults()?;
            let one_shot = std::mem::take(&mut faults.fail_next_supply_read);
            if faults.fail_supply_reads || one_shot {
                return Err(LedgerError::Transport("tokenId() call failed".into()));
            }
        }
        self.with_contract(|c| Ok(c.items.len() as u64))
    }

    async fn record(&self, item: ItemId) -> LedgerResult<ItemRecord> {
        tokio::task::yield_now().await;
        self.devnet.count_call();
        if self.devnet.faults()?.failing_reads.contains(&item) {
            return Err(LedgerError::Transport(format!("nfts({}) call failed", item.get())));
        }
        self.with_contract(|c| {
            c.items
                .get((item.get() - 1) as usize)
                .cloned()
                .ok_or(LedgerError::NonexistentItem(item))
        })
    }

    async fn available_items(&self) -> LedgerResult<Vec<ItemId>> {
        tokio::task::yield_now().await;
        self.devnet.count_call();
        self.with_contract(|c| {
            Ok(ItemId::range(c.items.len() as u64)
                .zip(c.items.iter())
                .filter(|(_, record)| record.is_for_sale)
                .map(|(id, _)| id)
                .collect())
        })
    }
}

#[async_trait]
impl LedgerWriter for DevnetContract {
    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn submit(&self, call: WriteCall) -> LedgerResult<PendingTx> {
        tokio::task::yield_now().await;
        self.devnet.count_call();
        let from = self.signer.ok_or(LedgerError::ReadOnly)?;
        let pending = self.devnet.write_state(|state| {
            if !state.contracts.contains_key(&self.address) {
                return Err(LedgerError::NoContract(self.address));
            }
            let encoded =
                serde_json::to_vec(&call).map_err(|e| LedgerError::Serialization(e.to_string()))?;
            let mut hasher = blake3::Hasher::new();
            hasher.update(b"mkt-tx-v1:");
            hasher.update(self.address.as_bytes());
            hasher.update(from.as_bytes());
            hasher.update(&state.nonce.to_le_bytes());
            hasher.update(&encoded);
            state.nonce += 1;

            let pending = PendingTx {
                hash: TxHash::from_bytes(*hasher.finalize().as_bytes()),
                from,
                contract: self.address,
                call,
            };
            state.pending.push(pending.clone());
            Ok(pending)
        })?;
        debug!(tx = %pending.hash.short_hex(), function = pending.call.function(), "write submitted");
        Ok(pending)
    }

    async fn confirm(&self, tx: &PendingTx) -> LedgerResult<TxReceipt> {
        tokio::task::yield_now().await;
        let injected = self.devnet.faults()?.reject_next_write.take();
        let receipt = self.devnet.write_state(|state| {
            let index = state
                .pending
                .iter()
                .position(|p| p.hash == tx.hash)
                .ok_or_else(|| LedgerError::UnknownTransaction(tx.hash.to_hex()))?;
            let pending = state.pending.remove(index);
            state.block += 1;

            if let Some(reason) = injected {
                return Err(LedgerError::Reverted(reason));
            }
            let contract = state
                .contracts
                .get_mut(&pending.contract)
                .ok_or(LedgerError::NoContract(pending.contract))?;
            let minted = contract
                .execute(pending.from, &pending.call)
                .map_err(LedgerError::Reverted)?;
            Ok(TxReceipt {
                hash: pending.hash,
                from: pending.from,
                block: state.block,
                minted,
            })
        });
        match &receipt {
            Ok(r) => debug!(tx = %r.hash.short_hex(), block = r.block, "write confirmed"),
            Err(e) => debug!(tx = %tx.hash.short_hex(), error = %e, "write failed"),
        }
        receipt
    }
}

/// Development wallet holding devnet accounts.
pub struct DevWallet {
    devnet: Arc<Devnet>,
    active: RwLock<Option<Address>>,
    consent: bool,
}

impl DevWallet {
    pub fn new(devnet: Arc<Devnet>, account: Address) -> Self {
        Self {
            devnet,
            active: RwLock::new(Some(account)),
            consent: true,
        }
    }

    /// A wallet with no accounts unlocked.
    pub fn locked(devnet: Arc<Devnet>) -> Self {
        Self {
            devnet,
            active: RwLock::new(None),
            consent: true,
        }
    }

    /// A wallet whose user refuses every account request.
    pub fn denying_consent(mut self) -> Self {
        self.consent = false;
        self
    }

    /// Select a different account, as a user would in the wallet UI.
    pub fn switch_account(&self, account: Address) -> Result<(), WalletError> {
        let mut active = self
            .active
            .write()
            .map_err(|_| WalletError::Unavailable("wallet account lock poisoned".into()))?;
        *active = Some(account);
        Ok(())
    }

    fn current(&self) -> Option<Address> {
        self.active.read().ok().and_then(|a| *a)
    }
}

#[async_trait]
impl Wallet for DevWallet {
    async fn request_account(&self) -> Result<Address, WalletError> {
        tokio::task::yield_now().await;
        if !self.consent {
            return Err(WalletError::ConsentDenied("account access denied".into()));
        }
        self.current().ok_or(WalletError::NoAccounts)
    }

    async fn active_account(&self) -> Option<Address> {
        self.current()
    }

    fn connect(
        &self,
        binding: &ContractBinding,
        signer: Address,
    ) -> LedgerResult<Arc<dyn RemoteLedger>> {
        let contract = self.devnet.bind(binding, Some(signer))?;
        Ok(Arc::new(contract))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkt_types::Wei;

    const NAME: &str = "NFTMarketplace";

    fn setup() -> (Arc<Devnet>, Address, DevnetContract) {
        let devnet = Arc::new(Devnet::new());
        let deployer = Devnet::dev_account(0);
        let address = devnet.deploy(deployer, NAME, None).unwrap();
        let contract = devnet
            .bind(&ContractBinding::marketplace(address, NAME), Some(deployer))
            .unwrap();
        (devnet, address, contract)
    }

    async fn mine(contract: &DevnetContract, call: WriteCall) -> LedgerResult<TxReceipt> {
        let pending = contract.submit(call).await?;
        contract.confirm(&pending).await
    }

    fn mint_call(owner: Address, url: &str) -> WriteCall {
        WriteCall::Mint {
            owner,
            price: Wei::ether(1),
            content_url: url.into(),
        }
    }

    #[tokio::test]
    async fn empty_contract_has_no_supply() {
        let (_, _, contract) = setup();
        assert_eq!(contract.total_supply().await.unwrap(), 0);
        assert!(contract.available_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mint_assigns_dense_ids_not_for_sale() {
        let (_, _, contract) = setup();
        let owner = Devnet::dev_account(0);
        let r1 = mine(&contract, mint_call(owner, "ipfs://a")).await.unwrap();
        let r2 = mine(&contract, mint_call(owner, "ipfs://b")).await.unwrap();
        assert_eq!(r1.minted.map(|id| id.get()), Some(1));
        assert_eq!(r2.minted.map(|id| id.get()), Some(2));
        assert!(r2.block > r1.block);

        let record = contract.record(ItemId::FIRST).await.unwrap();
        assert_eq!(record.owner, owner);
        assert!(!record.is_for_sale);
        assert_eq!(record.content_url, "ipfs://a");
    }

    #[tokio::test]
    async fn mint_rejects_duplicate_and_empty_urls() {
        let (_, _, contract) = setup();
        let owner = Devnet::dev_account(0);
        mine(&contract, mint_call(owner, "ipfs://a")).await.unwrap();
        let dup = mine(&contract, mint_call(owner, "ipfs://a")).await.unwrap_err();
        assert!(matches!(dup, LedgerError::Reverted(ref r) if r.contains("already minted")));
        let empty = mine(&contract, mint_call(owner, "  ")).await.unwrap_err();
        assert!(matches!(empty, LedgerError::Reverted(_)));
        assert_eq!(contract.total_supply().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_requires_ownership() {
        let (devnet, address, contract) = setup();
        let owner = Devnet::dev_account(0);
        mine(&contract, mint_call(owner, "ipfs://a")).await.unwrap();

        let stranger = devnet
            .bind(&ContractBinding::marketplace(address, NAME), Some(Devnet::dev_account(1)))
            .unwrap();
        let err = mine(&stranger, WriteCall::List { item: ItemId::FIRST, price: Wei::ether(2) })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(ref r) if r.contains("not the token owner")));

        mine(&contract, WriteCall::List { item: ItemId::FIRST, price: Wei::ether(2) })
            .await
            .unwrap();
        let record = contract.record(ItemId::FIRST).await.unwrap();
        assert!(record.is_for_sale);
        assert_eq!(record.price, Wei::ether(2));
        assert_eq!(contract.available_items().await.unwrap(), vec![ItemId::FIRST]);
    }

    #[tokio::test]
    async fn list_rejects_missing_item_and_zero_price() {
        let (_, _, contract) = setup();
        let missing = mine(&contract, WriteCall::List { item: ItemId::new(9).unwrap(), price: Wei::ether(1) })
            .await
            .unwrap_err();
        assert!(matches!(missing, LedgerError::Reverted(ref r) if r.contains("nonexistent")));

        mine(&contract, mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();
        let zero = mine(&contract, WriteCall::List { item: ItemId::FIRST, price: Wei::ZERO })
            .await
            .unwrap_err();
        assert!(matches!(zero, LedgerError::Reverted(_)));
    }

    #[tokio::test]
    async fn purchase_transfers_and_clears_sale_flag() {
        let (devnet, address, seller) = setup();
        mine(&seller, mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();
        mine(&seller, WriteCall::List { item: ItemId::FIRST, price: Wei::ether(1) }).await.unwrap();

        let buyer_addr = Devnet::dev_account(1);
        let buyer = devnet
            .bind(&ContractBinding::marketplace(address, NAME), Some(buyer_addr))
            .unwrap();

        let wrong = mine(&buyer, WriteCall::Purchase { item: ItemId::FIRST, payment: Wei::ether(2) })
            .await
            .unwrap_err();
        assert!(matches!(wrong, LedgerError::Reverted(ref r) if r.contains("incorrect payment")));

        mine(&buyer, WriteCall::Purchase { item: ItemId::FIRST, payment: Wei::ether(1) })
            .await
            .unwrap();
        let record = buyer.record(ItemId::FIRST).await.unwrap();
        assert_eq!(record.owner, buyer_addr);
        assert!(!record.is_for_sale);

        let again = mine(&buyer, WriteCall::Purchase { item: ItemId::FIRST, payment: Wei::ether(1) })
            .await
            .unwrap_err();
        assert!(matches!(again, LedgerError::Reverted(ref r) if r.contains("not for sale")));
    }

    #[tokio::test]
    async fn owner_cannot_buy_own_item() {
        let (_, _, seller) = setup();
        mine(&seller, mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();
        mine(&seller, WriteCall::List { item: ItemId::FIRST, price: Wei::ether(1) }).await.unwrap();
        let err = mine(&seller, WriteCall::Purchase { item: ItemId::FIRST, payment: Wei::ether(1) })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Reverted(_)));
    }

    #[tokio::test]
    async fn reading_unknown_item_fails() {
        let (_, _, contract) = setup();
        let err = contract.record(ItemId::FIRST).await.unwrap_err();
        assert_eq!(err, LedgerError::NonexistentItem(ItemId::FIRST));
    }

    #[tokio::test]
    async fn read_only_handle_cannot_submit() {
        let (devnet, address, _) = setup();
        let reader = devnet.bind(&ContractBinding::marketplace(address, NAME), None).unwrap();
        let err = reader.submit(mint_call(Devnet::dev_account(0), "x")).await.unwrap_err();
        assert_eq!(err, LedgerError::ReadOnly);
    }

    #[tokio::test]
    async fn pending_until_confirmed() {
        let (devnet, _, contract) = setup();
        let pending = contract.submit(mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();
        assert_eq!(devnet.pending_count(), 1);
        assert_eq!(contract.total_supply().await.unwrap(), 0);
        contract.confirm(&pending).await.unwrap();
        assert_eq!(devnet.pending_count(), 0);
        assert_eq!(contract.total_supply().await.unwrap(), 1);

        let err = contract.confirm(&pending).await.unwrap_err();
        assert!(matches!(err, LedgerError::UnknownTransaction(_)));
    }

    #[tokio::test]
    async fn injected_faults() {
        let (devnet, _, contract) = setup();
        mine(&contract, mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();

        devnet.fail_supply_reads(true).unwrap();
        assert!(matches!(contract.total_supply().await, Err(LedgerError::Transport(_))));
        devnet.fail_reads_of(ItemId::FIRST).unwrap();
        devnet.fail_supply_reads(false).unwrap();
        assert!(matches!(contract.record(ItemId::FIRST).await, Err(LedgerError::Transport(_))));

        devnet.reject_next_write("paused").unwrap();
        let err = mine(&contract, mint_call(Devnet::dev_account(0), "ipfs://b")).await.unwrap_err();
        assert_eq!(err, LedgerError::Reverted("paused".into()));

        devnet.clear_faults().unwrap();
        assert!(contract.record(ItemId::FIRST).await.is_ok());
        assert_eq!(contract.total_supply().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn one_shot_supply_fault() {
        let (devnet, _, contract) = setup();
        devnet.fail_next_supply_read().unwrap();
        assert!(matches!(contract.total_supply().await, Err(LedgerError::Transport(_))));
        assert_eq!(contract.total_supply().await.unwrap(), 0);
    }

    #[test]
    fn fault_setters_surface_poisoned_lock() {
        let devnet = Devnet::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = devnet.faults.lock().unwrap();
            panic!("poison fault plan");
        }));
        assert!(matches!(devnet.fail_supply_reads(true), Err(LedgerError::State(_))));
        assert!(matches!(devnet.fail_next_supply_read(), Err(LedgerError::State(_))));
        assert!(matches!(devnet.fail_reads_of(ItemId::FIRST), Err(LedgerError::State(_))));
        assert!(matches!(devnet.reject_next_write("x"), Err(LedgerError::State(_))));
        assert!(matches!(devnet.clear_faults(), Err(LedgerError::State(_))));
    }

    #[test]
    fn switch_account_surfaces_poisoned_lock() {
        let wallet = DevWallet::new(Arc::new(Devnet::new()), Devnet::dev_account(0));
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = wallet.active.write().unwrap();
            panic!("poison wallet");
        }));
        assert!(matches!(
            wallet.switch_account(Devnet::dev_account(1)),
            Err(WalletError::Unavailable(_))
        ));
    }

    #[test]
    fn bind_checks_address_and_interface() {
        let devnet = Arc::new(Devnet::new());
        let deployer = Devnet::dev_account(0);
        let missing = Address::derive(b"nowhere");
        let err = devnet
            .bind(&ContractBinding::marketplace(missing, NAME), None)
            .err()
            .unwrap();
        assert_eq!(err, LedgerError::NoContract(missing));

        let address = devnet.deploy(deployer, NAME, None).unwrap();
        let err = devnet
            .bind(&ContractBinding::marketplace(address, "OtherContract"), None)
            .err()
            .unwrap();
        assert!(matches!(err, LedgerError::InterfaceMismatch { .. }));
    }

    #[test]
    fn deploy_at_fixed_address_once() {
        let devnet = Devnet::new();
        let at = Address::derive(b"fixed");
        let deployer = Devnet::dev_account(0);
        assert_eq!(devnet.deploy(deployer, NAME, Some(at)).unwrap(), at);
        assert!(devnet.is_deployed(&at));
        assert_eq!(
            devnet.deploy(deployer, NAME, Some(at)).unwrap_err(),
            LedgerError::AlreadyDeployed(at)
        );
    }

    #[test]
    fn derived_deploy_addresses_differ() {
        let devnet = Devnet::new();
        let deployer = Devnet::dev_account(0);
        let a = devnet.deploy(deployer, NAME, None).unwrap();
        let b = devnet.deploy(deployer, NAME, None).unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn state_survives_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devnet.json");

        let (devnet, address, contract) = setup();
        mine(&contract, mint_call(Devnet::dev_account(0), "ipfs://a")).await.unwrap();
        devnet.save(&path).unwrap();

        let reopened = Arc::new(Devnet::open(&path).unwrap());
        let handle = reopened.bind(&ContractBinding::marketplace(address, NAME), None).unwrap();
        assert_eq!(handle.total_supply().await.unwrap(), 1);
        assert_eq!(handle.record(ItemId::FIRST).await.unwrap().content_url, "ipfs://a");
        assert_eq!(reopened.block_number(), devnet.block_number());
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let devnet = Devnet::open(&dir.path().join("absent.json")).unwrap();
        assert_eq!(devnet.block_number(), 0);
    }

    #[tokio::test]
    async fn call_count_tracks_contract_calls() {
        let (devnet, _, contract) = setup();
        assert_eq!(devnet.call_count(), 0);
        contract.total_supply().await.unwrap();
        contract.available_items().await.unwrap();
        assert_eq!(devnet.call_count(), 2);
    }

    #[tokio::test]
    async fn dev_wallet_consent_and_switching() {
        let devnet = Arc::new(Devnet::new());
        let account = Devnet::dev_account(0);
        let wallet = DevWallet::new(Arc::clone(&devnet), account);
        assert_eq!(wallet.request_account().await.unwrap(), account);

        wallet.switch_account(Devnet::dev_account(1)).unwrap();
        assert_eq!(wallet.active_account().await, Some(Devnet::dev_account(1)));

        let refusing = DevWallet::new(Arc::clone(&devnet), account).denying_consent();
        assert!(matches!(
            refusing.request_account().await,
            Err(WalletError::ConsentDenied(_))
        ));

        let locked = DevWallet::locked(devnet);
        assert_eq!(locked.request_account().await, Err(WalletError::NoAccounts));
    }

    #[tokio::test]
    async fn dev_wallet_connects_signed_handle() {
        let devnet = Arc::new(Devnet::new());
        let account = Devnet::dev_account(0);
        let address = devnet.deploy(account, NAME, None).unwrap();
        let wallet = DevWallet::new(Arc::clone(&devnet), account);
        let ledger = wallet
            .connect(&ContractBinding::marketplace(address, NAME), account)
            .unwrap();
        assert_eq!(ledger.signer(), Some(account));
        assert_eq!(ledger.total_supply().await.unwrap(), 0);
    }
}
