//! Environment configuration.
//!
//! `EnvironmentConfig` holds everything needed to boot an environment. Defaults are usable as-is
//! for a local data directory; `from_env` overlays the `PROFILE_ENV_*` variables on top of them.

use crate::environment::migrations::Version;
use crate::ledger::DiscoveryConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Where persisted environment data is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
	File,
	Memory,
}

/// Configuration for the background synchronizer jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncIntervals {
	/// Wallet balances and nonces
	pub wallets: Duration,
	/// Delegate lists per network
	pub delegates: Duration,
	/// Fee statistics per network
	pub fees: Duration,
	/// Exchange rates for every held ticker
	pub exchange_rates: Duration,
	/// Known wallet lists per network
	pub known_wallets: Duration,
}

impl Default for SyncIntervals {
	fn default() -> Self {
		Self {
			wallets: Duration::from_secs(30),
			delegates: Duration::from_secs(5 * 60),
			fees: Duration::from_secs(5 * 60),
			exchange_rates: Duration::from_secs(60),
			known_wallets: Duration::from_secs(60 * 60),
		}
	}
}

/// Configuration for booting an environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
	/// Directory used by the file blob store
	pub data_dir: PathBuf,
	/// Storage backend
	pub storage: StorageKind,
	/// Key the combined environment blob is stored under
	pub storage_key: String,
	/// Schema version persisted data is migrated to; defaults to the latest built-in migration
	pub schema_version: Option<Version>,
	/// Per-request timeout for network clients
	pub request_timeout: Duration,
	/// Ledger discovery settings
	pub discovery: DiscoveryConfig,
	/// Synchronizer job intervals
	pub sync: SyncIntervals,
	/// Base URL of the market data API
	pub market_url: String,
	/// Currency exchange rates are kept in
	pub exchange_currency: String,
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			data_dir: PathBuf::from("data"),
			storage: StorageKind::File,
			storage_key: "environment".to_string(),
			schema_version: None,
			request_timeout: crate::network::DEFAULT_REQUEST_TIMEOUT,
			discovery: DiscoveryConfig::default(),
			sync: SyncIntervals::default(),
			market_url: "https://min-api.cryptocompare.com".to_string(),
			exchange_currency: "USD".to_string(),
		}
	}
}

impl EnvironmentConfig {
	/// Defaults overlaid with `PROFILE_ENV_*` variables. Unparsable values are ignored with a warning.
	pub fn from_env() -> Self {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
		let mut config = Self::default();

		if let Some(dir) = lookup("PROFILE_ENV_DATA_DIR") {
			config.data_dir = PathBuf::from(dir);
		}

		if let Some(storage) = lookup("PROFILE_ENV_STORAGE") {
			match storage.to_lowercase().as_str() {
				"file" => config.storage = StorageKind::File,
				"memory" => config.storage = StorageKind::Memory,
				other => warn!("Ignoring unknown PROFILE_ENV_STORAGE value {}", other),
			}
		}

		if let Some(secs) = lookup("PROFILE_ENV_REQUEST_TIMEOUT_SECS") {
			match secs.parse::<u64>() {
				Ok(secs) => config.request_timeout = Duration::from_secs(secs),
				Err(e) => warn!("Ignoring PROFILE_ENV_REQUEST_TIMEOUT_SECS={}: {}", secs, e),
			}
		}

		if let Some(pages) = lookup("PROFILE_ENV_MAX_DISCOVERY_PAGES") {
			match pages.parse::<u32>() {
				Ok(pages) => config.discovery.max_pages = pages,
				Err(e) => warn!("Ignoring PROFILE_ENV_MAX_DISCOVERY_PAGES={}: {}", pages, e),
			}
		}

		if let Some(url) = lookup("PROFILE_ENV_MARKET_URL") {
			config.market_url = url;
		}

		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn overlays_variables_on_defaults() {
		let vars: HashMap<&str, &str> = HashMap::from([
			("PROFILE_ENV_DATA_DIR", "/tmp/profiles"),
			("PROFILE_ENV_STORAGE", "Memory"),
			("PROFILE_ENV_REQUEST_TIMEOUT_SECS", "5"),
			("PROFILE_ENV_MAX_DISCOVERY_PAGES", "not-a-number"),
		]);
		let config = EnvironmentConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

		assert_eq!(config.data_dir, PathBuf::from("/tmp/profiles"));
		assert_eq!(config.storage, StorageKind::Memory);
		assert_eq!(config.request_timeout, Duration::from_secs(5));
		assert_eq!(config.discovery.max_pages, 200);
		assert_eq!(config.market_url, EnvironmentConfig::default().market_url);
	}
}
