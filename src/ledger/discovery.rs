//! Hardware wallet address discovery.
//!
//! This module defines the `LedgerDiscoveryService`, which walks the BIP44 key space of a connected
//! device page by page to find the addresses that already have on-chain activity.
//!
//! Each page derives `page_size` consecutive addresses below `m/44'/{slip44}'/0'/0`, looks them up
//! against the network API in parallel chunks, reports every funded wallet to the caller, and moves
//! on only if at least one chunk came back non-empty. A page without any activity is the gap signal
//! that ends the scan. The number of pages is additionally capped by `DiscoveryConfig::max_pages`.
//!
//! Transport and lookup errors abort the scan and are returned unmodified; nothing is retried here.

use super::hd::{ChildNumber, DerivationPath, ExtendedPublicKey, address_from_public_key};
use super::progress_tracker::{DiscoveryProgressTracker, DiscoveryStats};
use super::transport::LedgerTransport;
use super::types::{DiscoveryConfig, LedgerError, LedgerWallet};
use crate::coins::NetworkManifest;
use crate::network::{ClientService, WalletData, WalletIdentifier};

use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Derived address recorded under its full derivation path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedAddress {
	path: String,
	index: u32,
	address: String,
	public_key: String,
}

pub struct LedgerDiscoveryService {
	transport: Arc<dyn LedgerTransport>,
	client: Arc<dyn ClientService>,
	manifest: NetworkManifest,
	config: DiscoveryConfig,
}

impl LedgerDiscoveryService {
	pub fn new(
		transport: Arc<dyn LedgerTransport>,
		client: Arc<dyn ClientService>,
		manifest: NetworkManifest,
		config: DiscoveryConfig,
	) -> Self {
		Self {
			transport,
			client,
			manifest,
			config,
		}
	}

	/// Scan for funded wallets, calling `on_progress` once per wallet in derivation order.
	///
	/// `start_path` resumes a previous scan: derivation starts at its address index + 1.
	pub async fn scan<F>(
		&self,
		start_path: Option<&str>,
		on_progress: F,
	) -> Result<Vec<LedgerWallet>, LedgerError>
	where
		F: FnMut(&LedgerWallet) + Send,
	{
		let (wallets, _) = self.scan_with_stats(start_path, on_progress).await?;
		Ok(wallets)
	}

	/// Same as [`scan`](Self::scan), also returning the scan statistics.
	pub async fn scan_with_stats<F>(
		&self,
		start_path: Option<&str>,
		mut on_progress: F,
	) -> Result<(Vec<LedgerWallet>, DiscoveryStats), LedgerError>
	where
		F: FnMut(&LedgerWallet) + Send,
	{
		let page_size = self.config.page_size.max(1);
		let chunk_size = self.config.chunk_size.max(1);
		let initial_address_index = Self::initial_address_index(start_path)?;
		let account_path = DerivationPath::bip44_account(self.manifest.slip44, 0);
		let account_path_str = account_path.to_string();

		info!(
			"Starting ledger discovery for {} at {} from address index {}",
			self.manifest.key(),
			account_path_str,
			initial_address_index
		);

		let mut tracker = DiscoveryProgressTracker::new(initial_address_index);
		let mut address_cache: HashMap<String, CachedAddress> = HashMap::new();
		let mut wallets = Vec::new();
		let mut page: u32 = 0;

		loop {
			if page >= self.config.max_pages {
				warn!(
					"Stopping ledger discovery for {} after {} pages without an empty page",
					self.manifest.key(),
					page
				);
				tracker.record_page_cap();
				break;
			}

			let account_key = ExtendedPublicKey::from_hex(
				&self.transport.get_extended_public_key(&account_path_str).await?,
			)?;
			let change_key = account_key.derive_child(0)?;
			let change_path = account_path.child(ChildNumber::Normal(0));

			let mut page_addresses = Vec::with_capacity(page_size as usize);
			for offset in 0..page_size {
				let index = Self::address_index(initial_address_index, page, page_size, offset)?;
				let child = change_key.derive_child(index)?;
				let path = change_path.child(ChildNumber::Normal(index)).to_string();
				let entry = CachedAddress {
					path: path.clone(),
					index,
					address: address_from_public_key(&child.public_key, self.manifest.pub_key_hash),
					public_key: child.public_key_hex(),
				};
				debug!("Derived {} at {}", entry.address, path);
				page_addresses.push(entry.clone());
				address_cache.insert(path, entry);
			}

			let identifiers: Vec<WalletIdentifier> = page_addresses
				.iter()
				.map(|entry| WalletIdentifier::address(entry.address.clone()))
				.collect();

			let chunks: Vec<Vec<WalletData>> = try_join_all(
				identifiers
					.chunks(chunk_size)
					.map(|chunk| self.client.wallets(chunk)),
			)
			.await?;

			let has_activity = chunks.iter().any(|chunk| !chunk.is_empty());

			// lookups answer by address, only ever for addresses of the current page
			let page_paths: HashMap<&str, &str> = page_addresses
				.iter()
				.map(|entry| (entry.address.as_str(), entry.path.as_str()))
				.collect();

			let mut found: Vec<LedgerWallet> = chunks
				.into_iter()
				.flatten()
				.filter_map(|data| {
					let cached = page_paths
						.get(data.address.as_str())
						.and_then(|path| address_cache.get(*path));
					match cached {
						Some(entry) => Some(LedgerWallet {
							path: entry.path.clone(),
							address: entry.address.clone(),
							public_key: entry.public_key.clone(),
							data,
						}),
						None => {
							warn!("Lookup returned unknown address {}, ignoring", data.address);
							None
						}
					}
				})
				.collect();
			found.sort_by_key(|wallet| address_cache.get(&wallet.path).map(|entry| entry.index));

			for wallet in &found {
				on_progress(wallet);
			}

			let highest_index = page_addresses.last().map_or(initial_address_index, |entry| entry.index);
			tracker.record_page(highest_index, page_addresses.len(), found.len());
			tracker.log_progress(false);
			wallets.extend(found);

			if !has_activity {
				break;
			}

			page += 1;
		}

		tracker.log_progress(true);
		let stats = tracker.get_stats();
		info!("Ledger discovery completed: {}", stats.summary());

		Ok((wallets, stats))
	}

	/// Address index of `offset` within `page`, counted from `initial`.
	fn address_index(initial: u32, page: u32, page_size: u32, offset: u32) -> Result<u32, LedgerError> {
		page.checked_mul(page_size)
			.and_then(|start| start.checked_add(offset))
			.and_then(|relative| initial.checked_add(relative))
			.ok_or_else(|| LedgerError::DerivationError("address index overflow".to_string()))
	}

	fn initial_address_index(start_path: Option<&str>) -> Result<u32, LedgerError> {
		match start_path {
			Some(path) => {
				let path: DerivationPath = path.parse()?;
				let index = path
					.last_index()
					.ok_or_else(|| LedgerError::InvalidPath(path.to_string()))?;
				index
					.checked_add(1)
					.ok_or_else(|| LedgerError::InvalidPath(path.to_string()))
			}
			None => Ok(0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::coins::manifest::ark_devnet;
	use crate::testing::{MockClientService, MockLedgerTransport, derived_address};

	fn service(
		transport: Arc<MockLedgerTransport>,
		client: Arc<MockClientService>,
		config: DiscoveryConfig,
	) -> LedgerDiscoveryService {
		LedgerDiscoveryService::new(transport, client, ark_devnet(), config)
	}

	#[tokio::test]
	async fn stops_after_first_page_without_activity() {
		let manifest = ark_devnet();
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());
		for index in [0, 6, 11, 12] {
			client.fund(&derived_address(&transport, &manifest, index), "100");
		}

		let mut progress = Vec::new();
		let (wallets, stats) = service(transport.clone(), client.clone(), DiscoveryConfig::default())
			.scan_with_stats(None, |wallet| progress.push(wallet.path.clone()))
			.await
			.unwrap();

		assert_eq!(stats.pages_scanned, 4);
		assert_eq!(stats.addresses_derived, 20);
		assert_eq!(client.identifiers_seen(), 20);
		assert_eq!(
			wallets.iter().map(|w| w.path.as_str()).collect::<Vec<_>>(),
			vec![
				"m/44'/1'/0'/0/0",
				"m/44'/1'/0'/0/6",
				"m/44'/1'/0'/0/11",
				"m/44'/1'/0'/0/12",
			]
		);
		assert_eq!(progress.len(), 4);
		assert_eq!(progress[0], "m/44'/1'/0'/0/0");
		assert_eq!(wallets[1].address, derived_address(&transport, &manifest, 6));
	}

	#[tokio::test]
	async fn resumes_after_start_path() {
		let manifest = ark_devnet();
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());
		client.fund(&derived_address(&transport, &manifest, 4), "1");
		client.fund(&derived_address(&transport, &manifest, 8), "1");

		let wallets = service(transport, client.clone(), DiscoveryConfig::default())
			.scan(Some("m/44'/1'/0'/0/3"), |_| {})
			.await
			.unwrap();

		assert_eq!(
			wallets.iter().map(|w| w.path.as_str()).collect::<Vec<_>>(),
			vec!["m/44'/1'/0'/0/4", "m/44'/1'/0'/0/8"]
		);
		// indices 4..=8 funded page, 9..=13 empty page
		assert_eq!(client.identifiers_seen(), 10);
	}

	#[tokio::test]
	async fn empty_first_page_returns_nothing() {
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());

		let wallets = service(transport, client.clone(), DiscoveryConfig::default())
			.scan(None, |_| panic!("no wallet expected"))
			.await
			.unwrap();

		assert!(wallets.is_empty());
		assert_eq!(client.identifiers_seen(), 5);
	}

	#[tokio::test]
	async fn page_cap_bounds_an_always_active_lookup() {
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());
		client.fund_everything();

		let config = DiscoveryConfig {
			max_pages: 3,
			..DiscoveryConfig::default()
		};
		let (wallets, stats) = service(transport, client, config)
			.scan_with_stats(None, |_| {})
			.await
			.unwrap();

		assert_eq!(wallets.len(), 15);
		assert_eq!(stats.pages_scanned, 3);
		assert!(stats.hit_page_cap);
	}

	#[tokio::test]
	async fn splits_pages_into_chunks_preserving_order() {
		let manifest = ark_devnet();
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());
		for index in [1, 3, 4] {
			client.fund(&derived_address(&transport, &manifest, index), "5");
		}

		let config = DiscoveryConfig {
			page_size: 5,
			chunk_size: 2,
			..DiscoveryConfig::default()
		};
		let wallets = service(transport, client.clone(), config)
			.scan(None, |_| {})
			.await
			.unwrap();

		assert_eq!(
			wallets.iter().map(|w| w.path.as_str()).collect::<Vec<_>>(),
			vec!["m/44'/1'/0'/0/1", "m/44'/1'/0'/0/3", "m/44'/1'/0'/0/4"]
		);
		// two pages of three chunks each
		assert_eq!(client.requests(), 6);
	}

	#[test]
	fn address_index_overflow_is_an_error() {
		assert_eq!(LedgerDiscoveryService::address_index(3, 2, 5, 1).unwrap(), 14);
		assert!(matches!(
			LedgerDiscoveryService::address_index(0, 2, u32::MAX / 2 + 1, 0),
			Err(LedgerError::DerivationError(_))
		));
		assert!(matches!(
			LedgerDiscoveryService::address_index(u32::MAX, 0, 5, 1),
			Err(LedgerError::DerivationError(_))
		));
	}

	#[tokio::test]
	async fn transport_errors_abort_the_scan() {
		let transport = Arc::new(MockLedgerTransport::failing());
		let client = Arc::new(MockClientService::new());

		let result = service(transport, client, DiscoveryConfig::default())
			.scan(None, |_| {})
			.await;

		assert!(matches!(result, Err(LedgerError::TransportError(_))));
	}

	#[tokio::test]
	async fn lookup_errors_abort_the_scan() {
		let transport = Arc::new(MockLedgerTransport::new());
		let client = Arc::new(MockClientService::new());
		client.fail_with_status(503);

		let result = service(transport, client, DiscoveryConfig::default())
			.scan(None, |_| {})
			.await;

		assert!(matches!(result, Err(LedgerError::LookupError(_))));
	}
}
