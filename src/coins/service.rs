//! Per-profile cache of coin instances.
//!
//! `CoinService` guarantees at most one live [`Coin`] per `(coin, network)` for the profile owning
//! it. Construction pulls the shared factories (network client, ledger transport) and the host
//! selector out of the environment container; none of them are owned by the cache.

use super::coin::Coin;
use super::manifest::NetworkManifest;
use super::types::{CoinError, CoinOptions};
use crate::environment::Container;
use crate::repository::DataRepository;

use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CoinService {
	container: Arc<Container>,
	instances: DataRepository<Arc<Coin>>,
}

impl CoinService {
	pub fn new(container: Arc<Container>) -> Self {
		Self {
			container,
			instances: DataRepository::new(),
		}
	}

	fn key(coin: &str, network: &str) -> String {
		format!("{}.{}", coin, network)
	}

	/// Return the cached instance for `(coin, network)`, constructing it on first use.
	pub fn set(
		&mut self,
		coin: &str,
		network: &str,
		options: &CoinOptions,
	) -> Result<Arc<Coin>, CoinError> {
		let key = Self::key(coin, network);
		if let Some(instance) = self.instances.get(&key) {
			return Ok(instance.clone());
		}

		let manifest = self
			.container
			.manifests
			.find(coin, network)
			.ok_or_else(|| CoinError::ManifestNotFound {
				coin: coin.to_string(),
				network: network.to_string(),
			})?
			.clone();

		let host = self.container.host_selector.select(
			&manifest,
			&options.custom_hosts,
			options.fallback_to_default,
		)?;
		let client = self
			.container
			.client_factory
			.make(&manifest, &host, options.timeout);

		info!("Constructed coin instance {} using host {}", key, host.url);
		let instance = Arc::new(Coin::new(
			manifest,
			host,
			client,
			self.container.ledger_factory.clone(),
		));
		self.instances.set(key, instance.clone());

		Ok(instance)
	}

	pub fn get(&self, coin: &str, network: &str) -> Result<Arc<Coin>, CoinError> {
		let key = Self::key(coin, network);
		self.instances
			.get(&key)
			.cloned()
			.ok_or(CoinError::NotFound(key))
	}

	pub fn has(&self, coin: &str, network: &str) -> bool {
		self.instances.has(&Self::key(coin, network))
	}

	pub fn all(&self) -> Vec<(String, Arc<Coin>)> {
		self.instances.all()
	}

	pub fn values(&self) -> Vec<Arc<Coin>> {
		self.instances.values()
	}

	/// Drop every cached instance; the next `set` constructs a fresh one.
	pub fn flush(&mut self) {
		debug!("Flushing {} coin instances", self.instances.count());
		self.instances.flush();
	}

	/// One entry per known network, sorted by display name.
	pub fn available_networks(&self) -> Vec<NetworkManifest> {
		let mut networks = self.container.manifests.all().to_vec();
		networks.sort_by(|a, b| compare_names(&a.name, &b.name));
		networks
	}

	/// Eagerly construct an instance for every known network.
	pub fn register<F>(&mut self, options: F) -> Result<(), CoinError>
	where
		F: Fn(&NetworkManifest) -> CoinOptions,
	{
		for manifest in self.container.manifests.all().to_vec() {
			self.set(&manifest.coin, &manifest.network, &options(&manifest))?;
		}
		Ok(())
	}
}

/// Case-insensitive comparison with a case-sensitive tie-break, approximating a locale compare.
fn compare_names(a: &str, b: &str) -> Ordering {
	a.to_lowercase()
		.cmp(&b.to_lowercase())
		.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::coins::manifest::{ark_devnet, ark_mainnet};
	use crate::testing::container;

	#[test]
	fn set_is_idempotent_per_key() {
		let mut coins = CoinService::new(container());
		let first = coins.set("ARK", "mainnet", &CoinOptions::default()).unwrap();
		let second = coins.set("ARK", "mainnet", &CoinOptions::default()).unwrap();

		assert!(Arc::ptr_eq(&first, &second));
		assert!(Arc::ptr_eq(&first, &coins.get("ARK", "mainnet").unwrap()));
	}

	#[test]
	fn flush_forces_reconstruction() {
		let mut coins = CoinService::new(container());
		let first = coins.set("ARK", "mainnet", &CoinOptions::default()).unwrap();
		coins.flush();
		assert!(!coins.has("ARK", "mainnet"));

		let second = coins.set("ARK", "mainnet", &CoinOptions::default()).unwrap();
		assert!(!Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn get_does_not_construct() {
		let coins = CoinService::new(container());
		assert!(matches!(
			coins.get("ARK", "mainnet"),
			Err(CoinError::NotFound(key)) if key == "ARK.mainnet"
		));
	}

	#[test]
	fn set_fails_without_manifest() {
		let mut coins = CoinService::new(container());
		assert!(matches!(
			coins.set("BTC", "livenet", &CoinOptions::default()),
			Err(CoinError::ManifestNotFound { .. })
		));
	}

	#[test]
	fn available_networks_are_sorted_by_name() {
		let coins = CoinService::new(container());
		let names: Vec<String> = coins
			.available_networks()
			.into_iter()
			.map(|network| network.name)
			.collect();
		assert_eq!(names, vec![ark_mainnet().name, ark_devnet().name]);
	}

	#[test]
	fn register_warms_every_network() {
		let mut coins = CoinService::new(container());
		coins.register(|_| CoinOptions::default()).unwrap();

		assert!(coins.has("ARK", "mainnet"));
		assert!(coins.has("ARK", "devnet"));
		assert_eq!(coins.values().len(), 2);
	}

	#[test]
	fn custom_hosts_are_used_for_construction() {
		let mut coins = CoinService::new(container());
		let options = CoinOptions {
			custom_hosts: vec![crate::coins::Host::full("https://custom.example/api")],
			fallback_to_default: true,
			..CoinOptions::default()
		};
		let coin = coins.set("ARK", "devnet", &options).unwrap();
		assert_eq!(coin.host().url, "https://custom.example/api");
	}
}
