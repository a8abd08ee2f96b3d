//! Chooses which host a coin instance talks to.
//!
//! Custom hosts configured by the profile win over the manifest's default hosts. When the profile
//! allows falling back to default hosts, a custom host is only eligible while its rolling failure
//! counter stays below [`MAX_HOST_FAILURES`]. Among equally eligible hosts the choice is random so
//! that load spreads across them.

use super::manifest::NetworkManifest;
use super::types::{CoinError, Host, HostKind};

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

/// Custom hosts with this many consecutive failures are skipped when falling back is allowed.
pub const MAX_HOST_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkHostSelector;

impl NetworkHostSelector {
	pub fn new() -> Self {
		Self
	}

	/// Select a host for `manifest` using the thread-local RNG.
	pub fn select(
		&self,
		manifest: &NetworkManifest,
		custom_hosts: &[Host],
		fallback_to_default: bool,
	) -> Result<Host, CoinError> {
		self.select_with(manifest, custom_hosts, fallback_to_default, &mut rand::rng())
	}

	pub fn select_with<R: Rng + ?Sized>(
		&self,
		manifest: &NetworkManifest,
		custom_hosts: &[Host],
		fallback_to_default: bool,
		rng: &mut R,
	) -> Result<Host, CoinError> {
		let custom: Vec<&Host> = custom_hosts
			.iter()
			.filter(|host| host.kind == HostKind::Full)
			.filter(|host| !fallback_to_default || host.failed_count < MAX_HOST_FAILURES)
			.collect();

		if let Some(host) = custom.choose(rng) {
			debug!("Selected custom host {} for {}", host.url, manifest.key());
			return Ok((*host).clone());
		}

		if !custom_hosts.is_empty() {
			warn!(
				"All custom hosts for {} exceeded {} failures, using default hosts",
				manifest.key(),
				MAX_HOST_FAILURES
			);
		}

		manifest
			.default_hosts()
			.choose(rng)
			.map(|host| (*host).clone())
			.ok_or_else(|| CoinError::NoHost(manifest.key()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::coins::manifest::ark_mainnet;

	fn failing(url: &str, failed_count: u32) -> Host {
		Host {
			failed_count,
			..Host::full(url)
		}
	}

	#[test]
	fn uses_default_hosts_without_custom_hosts() {
		let manifest = ark_mainnet();
		let host = NetworkHostSelector::new()
			.select(&manifest, &[], true)
			.unwrap();
		assert_eq!(host.url, "https://ark-live.arkvault.io/api");
	}

	#[test]
	fn prefers_custom_hosts_below_failure_threshold() {
		let manifest = ark_mainnet();
		let custom = vec![failing("https://a.example", 3), failing("https://b.example", 2)];

		for _ in 0..20 {
			let host = NetworkHostSelector::new()
				.select(&manifest, &custom, true)
				.unwrap();
			assert_eq!(host.url, "https://b.example");
		}
	}

	#[test]
	fn falls_back_to_default_hosts_when_custom_hosts_keep_failing() {
		let manifest = ark_mainnet();
		let custom = vec![failing("https://a.example", 3), failing("https://b.example", 7)];

		let host = NetworkHostSelector::new()
			.select(&manifest, &custom, true)
			.unwrap();
		assert_eq!(host.url, "https://ark-live.arkvault.io/api");
	}

	#[test]
	fn ignores_failures_when_fallback_is_disabled() {
		let manifest = ark_mainnet();
		let custom = vec![failing("https://a.example", 10)];

		let host = NetworkHostSelector::new()
			.select(&manifest, &custom, false)
			.unwrap();
		assert_eq!(host.url, "https://a.example");
	}

	#[test]
	fn errors_when_no_host_is_available() {
		let mut manifest = ark_mainnet();
		manifest.hosts.clear();
		assert!(matches!(
			NetworkHostSelector::new().select(&manifest, &[], true),
			Err(CoinError::NoHost(_))
		));
	}
}
