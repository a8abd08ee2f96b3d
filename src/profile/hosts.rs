//! Custom hosts a profile configured per network.
//!
//! Each host carries the rolling failure counter the host selector reads: every failed request
//! increments it, the first successful one resets it.

use crate::coins::Host;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostRepository {
	networks: BTreeMap<String, Vec<Host>>,
}

impl HostRepository {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn all(&self) -> &BTreeMap<String, Vec<Host>> {
		&self.networks
	}

	/// Hosts configured for `network` (a `coin.network` key).
	pub fn all_by_network(&self, network: &str) -> &[Host] {
		self.networks
			.get(network)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Add `host`, replacing a host with the same URL.
	pub fn push(&mut self, network: &str, host: Host) {
		let hosts = self.networks.entry(network.to_string()).or_default();
		hosts.retain(|existing| existing.url != host.url);
		hosts.push(host);
	}

	pub fn forget(&mut self, network: &str, url: &str) -> bool {
		let Some(hosts) = self.networks.get_mut(network) else {
			return false;
		};
		let before = hosts.len();
		hosts.retain(|host| host.url != url);
		let removed = hosts.len() != before;
		if hosts.is_empty() {
			self.networks.remove(network);
		}
		removed
	}

	/// Count a failed request; returns the new counter.
	pub fn record_failure(&mut self, network: &str, url: &str) -> Option<u32> {
		let host = self.find_mut(network, url)?;
		host.failed_count = host.failed_count.saturating_add(1);
		warn!("Host {} for {} failed {} times", url, network, host.failed_count);
		Some(host.failed_count)
	}

	pub fn record_success(&mut self, network: &str, url: &str) {
		if let Some(host) = self.find_mut(network, url) {
			if host.failed_count > 0 {
				debug!("Host {} for {} recovered", url, network);
			}
			host.failed_count = 0;
		}
	}

	fn find_mut(&mut self, network: &str, url: &str) -> Option<&mut Host> {
		self.networks
			.get_mut(network)?
			.iter_mut()
			.find(|host| host.url == url)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracks_failures_per_host() {
		let mut hosts = HostRepository::new();
		hosts.push("ARK.mainnet", Host::full("https://a.example"));
		hosts.push("ARK.mainnet", Host::full("https://b.example"));

		assert_eq!(hosts.record_failure("ARK.mainnet", "https://a.example"), Some(1));
		assert_eq!(hosts.record_failure("ARK.mainnet", "https://a.example"), Some(2));
		assert_eq!(hosts.record_failure("ARK.devnet", "https://a.example"), None);

		hosts.record_success("ARK.mainnet", "https://a.example");
		assert_eq!(hosts.all_by_network("ARK.mainnet")[0].failed_count, 0);
	}

	#[test]
	fn push_replaces_and_forget_removes() {
		let mut hosts = HostRepository::new();
		hosts.push("ARK.mainnet", Host::full("https://a.example"));
		hosts.push("ARK.mainnet", Host::full("https://a.example"));
		assert_eq!(hosts.all_by_network("ARK.mainnet").len(), 1);

		assert!(hosts.forget("ARK.mainnet", "https://a.example"));
		assert!(!hosts.forget("ARK.mainnet", "https://a.example"));
		assert!(hosts.all_by_network("ARK.mainnet").is_empty());
		assert!(hosts.all().is_empty());
	}
}
