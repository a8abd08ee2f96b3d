//! In-process collaborators for tests.
//!
//! Compiled for unit tests and behind the `test-utils` feature for integration tests.

use crate::coins::{Host, ManifestRegistry, NetworkHostSelector, NetworkManifest};
use crate::environment::{Container, MemoryBlobStore};
use crate::ledger::hd::address_from_public_key;
use crate::ledger::{
	DerivationPath, ExtendedPublicKey, LedgerAddress, LedgerError, LedgerTransport,
	LedgerTransportFactory,
};
use crate::network::{
	ClientFactory, ClientService, Delegate, KnownWallet, LookupError, PriceFeed, TransactionFees,
	WalletData, WalletIdentifier,
};

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Account-level extended public key handed out by [`MockLedgerTransport`]: the secp256k1
/// generator point followed by a constant chain code.
pub const ACCOUNT_XPUB: &str = concat!(
	"0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
	"1111111111111111111111111111111111111111111111111111111111111111"
);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct MockClientState {
	funded: HashMap<String, String>,
	fund_everything: bool,
	fail_with_status: Option<u16>,
	delegates: Vec<Delegate>,
	fees: TransactionFees,
	known_wallets: Vec<KnownWallet>,
}

/// Network client answering from in-memory state.
#[derive(Default)]
pub struct MockClientService {
	state: Mutex<MockClientState>,
	requests: AtomicUsize,
	identifiers_seen: AtomicUsize,
}

impl MockClientService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fund(&self, address: &str, balance: &str) {
		lock(&self.state)
			.funded
			.insert(address.to_string(), balance.to_string());
	}

	/// Report every looked-up address as funded.
	pub fn fund_everything(&self) {
		lock(&self.state).fund_everything = true;
	}

	pub fn fail_with_status(&self, status: u16) {
		lock(&self.state).fail_with_status = Some(status);
	}

	pub fn recover(&self) {
		lock(&self.state).fail_with_status = None;
	}

	pub fn set_delegates(&self, delegates: Vec<Delegate>) {
		lock(&self.state).delegates = delegates;
	}

	pub fn set_fees(&self, fees: TransactionFees) {
		lock(&self.state).fees = fees;
	}

	pub fn set_known_wallets(&self, known_wallets: Vec<KnownWallet>) {
		lock(&self.state).known_wallets = known_wallets;
	}

	/// Number of `wallets` calls made.
	pub fn requests(&self) -> usize {
		self.requests.load(Ordering::SeqCst)
	}

	/// Total identifiers sent across all `wallets` calls.
	pub fn identifiers_seen(&self) -> usize {
		self.identifiers_seen.load(Ordering::SeqCst)
	}

	fn check(&self) -> Result<(), LookupError> {
		match lock(&self.state).fail_with_status {
			Some(status) => Err(LookupError::StatusError {
				status,
				url: "mock://client".to_string(),
			}),
			None => Ok(()),
		}
	}
}

#[async_trait::async_trait]
impl ClientService for MockClientService {
	async fn wallets(&self, identifiers: &[WalletIdentifier]) -> Result<Vec<WalletData>, LookupError> {
		self.requests.fetch_add(1, Ordering::SeqCst);
		self.identifiers_seen
			.fetch_add(identifiers.len(), Ordering::SeqCst);
		self.check()?;

		let state = lock(&self.state);
		Ok(identifiers
			.iter()
			.filter_map(|identifier| {
				let balance = match state.funded.get(&identifier.value) {
					Some(balance) => balance.clone(),
					None if state.fund_everything => "1".to_string(),
					None => return None,
				};
				Some(WalletData {
					address: identifier.value.clone(),
					public_key: None,
					balance,
					nonce: Some("1".to_string()),
					username: None,
				})
			})
			.collect())
	}

	async fn delegates(&self) -> Result<Vec<Delegate>, LookupError> {
		self.check()?;
		Ok(lock(&self.state).delegates.clone())
	}

	async fn fees(&self) -> Result<TransactionFees, LookupError> {
		self.check()?;
		Ok(lock(&self.state).fees.clone())
	}

	async fn known_wallets(&self) -> Result<Vec<KnownWallet>, LookupError> {
		self.check()?;
		Ok(lock(&self.state).known_wallets.clone())
	}
}

/// Hands out one shared [`MockClientService`] for every network.
pub struct MockClientFactory {
	client: Arc<MockClientService>,
	made: AtomicUsize,
}

impl MockClientFactory {
	pub fn new(client: Arc<MockClientService>) -> Self {
		Self {
			client,
			made: AtomicUsize::new(0),
		}
	}

	pub fn made(&self) -> usize {
		self.made.load(Ordering::SeqCst)
	}
}

impl ClientFactory for MockClientFactory {
	fn make(
		&self,
		_manifest: &NetworkManifest,
		_host: &Host,
		_timeout: Option<Duration>,
	) -> Arc<dyn ClientService> {
		self.made.fetch_add(1, Ordering::SeqCst);
		self.client.clone()
	}
}

/// Device stand-in deriving everything from [`ACCOUNT_XPUB`].
pub struct MockLedgerTransport {
	account: ExtendedPublicKey,
	pub_key_hash: u8,
	failing: bool,
	connected: AtomicBool,
}

impl MockLedgerTransport {
	pub fn new() -> Self {
		Self::with_pub_key_hash(0x1e)
	}

	pub fn with_pub_key_hash(pub_key_hash: u8) -> Self {
		Self {
			account: account_key(),
			pub_key_hash,
			failing: false,
			connected: AtomicBool::new(false),
		}
	}

	/// A transport whose every call fails, like an unplugged device.
	pub fn failing() -> Self {
		Self {
			failing: true,
			..Self::new()
		}
	}

	pub fn account(&self) -> &ExtendedPublicKey {
		&self.account
	}

	pub fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	fn check(&self) -> Result<(), LedgerError> {
		if self.failing {
			Err(LedgerError::TransportError("device disconnected".to_string()))
		} else {
			Ok(())
		}
	}

	/// Key for a full `m/44'/{slip44}'/0'/change/index` path.
	fn derive(&self, path: &str) -> Result<ExtendedPublicKey, LedgerError> {
		let path: DerivationPath = path.parse()?;
		let indices: Vec<u32> = path
			.components()
			.iter()
			.skip(3)
			.map(|component| component.index())
			.collect();
		self.account.derive_path(&indices)
	}
}

impl Default for MockLedgerTransport {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait::async_trait]
impl LedgerTransport for MockLedgerTransport {
	async fn connect(&self) -> Result<(), LedgerError> {
		self.check()?;
		self.connected.store(true, Ordering::SeqCst);
		Ok(())
	}

	async fn disconnect(&self) -> Result<(), LedgerError> {
		self.connected.store(false, Ordering::SeqCst);
		Ok(())
	}

	async fn get_public_key(&self, path: &str) -> Result<String, LedgerError> {
		self.check()?;
		Ok(self.derive(path)?.public_key_hex())
	}

	async fn get_extended_public_key(&self, path: &str) -> Result<String, LedgerError> {
		self.check()?;
		Ok(self.derive(path)?.to_hex())
	}

	async fn get_address(&self, path: &str) -> Result<LedgerAddress, LedgerError> {
		self.check()?;
		let key = self.derive(path)?;
		Ok(LedgerAddress {
			public_key: key.public_key_hex(),
			address: address_from_public_key(&key.public_key, self.pub_key_hash),
		})
	}
}

pub struct MockLedgerTransportFactory {
	transport: Arc<MockLedgerTransport>,
}

impl MockLedgerTransportFactory {
	pub fn new(transport: Arc<MockLedgerTransport>) -> Self {
		Self { transport }
	}
}

impl LedgerTransportFactory for MockLedgerTransportFactory {
	fn create(&self) -> Result<Arc<dyn LedgerTransport>, LedgerError> {
		Ok(self.transport.clone())
	}
}

/// Price feed with fixed rates.
#[derive(Default)]
pub struct MockPriceFeed {
	rates: Mutex<HashMap<(String, String), f64>>,
	failing: Mutex<HashSet<String>>,
}

impl MockPriceFeed {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_rate(&self, ticker: &str, currency: &str, rate: f64) {
		lock(&self.rates).insert((ticker.to_uppercase(), currency.to_uppercase()), rate);
	}

	/// Make lookups for `ticker` fail.
	pub fn fail_for(&self, ticker: &str) {
		lock(&self.failing).insert(ticker.to_uppercase());
	}
}

#[async_trait::async_trait]
impl PriceFeed for MockPriceFeed {
	async fn rate(&self, ticker: &str, currency: &str) -> Result<f64, LookupError> {
		if lock(&self.failing).contains(&ticker.to_uppercase()) {
			return Err(LookupError::StatusError {
				status: 500,
				url: "mock://market".to_string(),
			});
		}
		lock(&self.rates)
			.get(&(ticker.to_uppercase(), currency.to_uppercase()))
			.copied()
			.ok_or(LookupError::NoData)
	}
}

/// Handles to the collaborators behind a [`mocked_container`].
#[derive(Clone)]
pub struct Mocks {
	pub client: Arc<MockClientService>,
	pub client_factory: Arc<MockClientFactory>,
	pub transport: Arc<MockLedgerTransport>,
	pub price_feed: Arc<MockPriceFeed>,
	pub storage: Arc<MemoryBlobStore>,
}

/// Container wired entirely with mocks and in-memory storage.
pub fn mocked_container() -> (Arc<Container>, Mocks) {
	let client = Arc::new(MockClientService::new());
	let mocks = Mocks {
		client_factory: Arc::new(MockClientFactory::new(client.clone())),
		client,
		transport: Arc::new(MockLedgerTransport::new()),
		price_feed: Arc::new(MockPriceFeed::new()),
		storage: Arc::new(MemoryBlobStore::new()),
	};

	let container = Container {
		manifests: ManifestRegistry::builtin(),
		host_selector: NetworkHostSelector::new(),
		client_factory: mocks.client_factory.clone(),
		ledger_factory: Arc::new(MockLedgerTransportFactory::new(mocks.transport.clone())),
		price_feed: mocks.price_feed.clone(),
		storage: mocks.storage.clone(),
		request_timeout: None,
	};

	(Arc::new(container), mocks)
}

pub fn container() -> Arc<Container> {
	mocked_container().0
}

pub fn account_key() -> ExtendedPublicKey {
	ExtendedPublicKey::from_hex(ACCOUNT_XPUB).expect("valid account key")
}

/// Address the discovery scan derives for `index` on `manifest`.
pub fn derived_address(
	transport: &MockLedgerTransport,
	manifest: &NetworkManifest,
	index: u32,
) -> String {
	let key = transport
		.account()
		.derive_path(&[0, index])
		.expect("non-hardened derivation");
	address_from_public_key(&key.public_key, manifest.pub_key_hash)
}
