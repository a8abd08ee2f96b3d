use super::manifest::NetworkManifest;
use super::types::Host;
use crate::ledger::{
	DiscoveryConfig, LedgerDiscoveryService, LedgerError, LedgerTransport, LedgerTransportFactory,
	hd::address_from_public_key_hex,
};
use crate::network::ClientService;

use std::sync::Arc;

/// A constructed network client for one `(coin, network)` pair.
///
/// Instances are created once per profile by [`CoinService`](super::CoinService) and shared by
/// reference afterwards.
pub struct Coin {
	manifest: NetworkManifest,
	host: Host,
	client: Arc<dyn ClientService>,
	ledger_factory: Arc<dyn LedgerTransportFactory>,
}

impl Coin {
	pub fn new(
		manifest: NetworkManifest,
		host: Host,
		client: Arc<dyn ClientService>,
		ledger_factory: Arc<dyn LedgerTransportFactory>,
	) -> Self {
		Self {
			manifest,
			host,
			client,
			ledger_factory,
		}
	}

	pub fn key(&self) -> String {
		self.manifest.key()
	}

	pub fn manifest(&self) -> &NetworkManifest {
		&self.manifest
	}

	/// The host this instance was bound to at construction.
	pub fn host(&self) -> &Host {
		&self.host
	}

	pub fn client(&self) -> Arc<dyn ClientService> {
		self.client.clone()
	}

	pub fn ledger(&self) -> Result<Arc<dyn LedgerTransport>, LedgerError> {
		self.ledger_factory.create()
	}

	/// Discovery service bound to a connected device and this coin's network client.
	pub fn ledger_discovery(
		&self,
		transport: Arc<dyn LedgerTransport>,
		config: DiscoveryConfig,
	) -> LedgerDiscoveryService {
		LedgerDiscoveryService::new(transport, self.client(), self.manifest.clone(), config)
	}

	pub fn address_from_public_key(&self, public_key: &str) -> Result<String, LedgerError> {
		address_from_public_key_hex(public_key, self.manifest.pub_key_hash)
	}
}

impl std::fmt::Debug for Coin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Coin")
			.field("key", &self.key())
			.field("host", &self.host.url)
			.finish()
	}
}
