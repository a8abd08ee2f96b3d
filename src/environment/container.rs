//! Shared collaborators for one environment.
//!
//! A `Container` is built once at boot and handed to every service by `Arc`. Nothing in it is
//! mutated after boot.

use super::storage::{BlobStore, FileBlobStore, MemoryBlobStore};
use crate::coins::{ManifestRegistry, NetworkHostSelector};
use crate::config::{EnvironmentConfig, StorageKind};
use crate::ledger::{LedgerTransportFactory, UnavailableTransportFactory};
use crate::network::{ClientFactory, HttpClientFactory, HttpPriceFeed, PriceFeed};

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct Container {
	pub manifests: ManifestRegistry,
	pub host_selector: NetworkHostSelector,
	pub client_factory: Arc<dyn ClientFactory>,
	pub ledger_factory: Arc<dyn LedgerTransportFactory>,
	pub price_feed: Arc<dyn PriceFeed>,
	pub storage: Arc<dyn BlobStore>,
	/// Per-request timeout handed to every coin instance.
	pub request_timeout: Option<Duration>,
}

impl Container {
	/// Production wiring: HTTP network clients, HTTP price feed and the configured storage backend.
	///
	/// No hardware transport is available by default; use [`with_ledger_factory`](Self::with_ledger_factory)
	/// to plug one in.
	pub fn from_config(config: &EnvironmentConfig) -> Self {
		let http_client = Client::new();

		let storage: Arc<dyn BlobStore> = match config.storage {
			StorageKind::File => Arc::new(FileBlobStore::new(config.data_dir.clone())),
			StorageKind::Memory => Arc::new(MemoryBlobStore::new()),
		};
		info!("Using {:?} storage at {:?}", config.storage, config.data_dir);

		Self {
			manifests: ManifestRegistry::builtin(),
			host_selector: NetworkHostSelector::new(),
			client_factory: Arc::new(HttpClientFactory::new(http_client.clone())),
			ledger_factory: Arc::new(UnavailableTransportFactory),
			price_feed: Arc::new(HttpPriceFeed::new(
				http_client,
				config.market_url.clone(),
				config.request_timeout,
			)),
			storage,
			request_timeout: Some(config.request_timeout),
		}
	}

	pub fn with_ledger_factory(mut self, ledger_factory: Arc<dyn LedgerTransportFactory>) -> Self {
		self.ledger_factory = ledger_factory;
		self
	}
}
