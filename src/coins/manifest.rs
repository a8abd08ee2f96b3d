//! Static per-network data: derivation constants, hosts and explorer links.

use super::types::{Host, HostKind};
use serde::{Deserialize, Serialize};

/// Everything the runtime needs to know about one network of one coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkManifest {
	/// Coin ticker used as the first half of cache keys, e.g. `ARK`.
	pub coin: String,
	/// Network id, e.g. `mainnet`.
	pub network: String,
	/// Human readable name used for sorting and display.
	pub name: String,
	/// Ticker of the network's native token.
	pub ticker: String,
	/// SLIP-44 coin type used in BIP44 paths.
	pub slip44: u32,
	/// Version byte prepended to the public key hash when encoding addresses.
	pub pub_key_hash: u8,
	/// Decimal places of the native token.
	pub decimals: u32,
	/// Whether the network API can look wallets up by extended public key.
	pub supports_extended_public_key: bool,
	pub hosts: Vec<Host>,
	pub explorer: String,
	#[serde(default)]
	pub known_wallets_url: Option<String>,
}

impl NetworkManifest {
	/// `coin.network`, the key coin instances are cached under.
	pub fn key(&self) -> String {
		format!("{}.{}", self.coin, self.network)
	}

	pub fn default_hosts(&self) -> Vec<&Host> {
		self.hosts
			.iter()
			.filter(|host| host.kind == HostKind::Full)
			.collect()
	}

	/// Explorer link for a wallet address.
	pub fn explorer_wallet_url(&self, address: &str) -> String {
		format!("{}/wallets/{}", self.explorer.trim_end_matches('/'), address)
	}

	/// Explorer link for a transaction id.
	pub fn explorer_transaction_url(&self, id: &str) -> String {
		format!("{}/transaction/{}", self.explorer.trim_end_matches('/'), id)
	}
}

/// Read-only registry of the manifests known to an environment.
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
	manifests: Vec<NetworkManifest>,
}

impl ManifestRegistry {
	pub fn new(manifests: Vec<NetworkManifest>) -> Self {
		Self { manifests }
	}

	/// Registry holding the ARK mainnet and devnet manifests.
	pub fn builtin() -> Self {
		Self::new(vec![ark_mainnet(), ark_devnet()])
	}

	/// Add or replace the manifest for `manifest.key()`.
	pub fn register(&mut self, manifest: NetworkManifest) {
		self.manifests.retain(|existing| existing.key() != manifest.key());
		self.manifests.push(manifest);
	}

	pub fn find(&self, coin: &str, network: &str) -> Option<&NetworkManifest> {
		self.manifests
			.iter()
			.find(|manifest| manifest.coin == coin && manifest.network == network)
	}

	pub fn all(&self) -> &[NetworkManifest] {
		&self.manifests
	}
}

pub fn ark_mainnet() -> NetworkManifest {
	NetworkManifest {
		coin: "ARK".to_string(),
		network: "mainnet".to_string(),
		name: "ARK".to_string(),
		ticker: "ARK".to_string(),
		slip44: 111,
		pub_key_hash: 0x17,
		decimals: 8,
		supports_extended_public_key: false,
		hosts: vec![
			Host::full("https://ark-live.arkvault.io/api"),
			Host {
				kind: HostKind::Explorer,
				url: "https://live.arkscan.io".to_string(),
				failed_count: 0,
			},
		],
		explorer: "https://live.arkscan.io".to_string(),
		known_wallets_url: Some(
			"https://raw.githubusercontent.com/ArkEcosystem/common/master/mainnet/known-wallets-extended.json"
				.to_string(),
		),
	}
}

pub fn ark_devnet() -> NetworkManifest {
	NetworkManifest {
		coin: "ARK".to_string(),
		network: "devnet".to_string(),
		name: "ARK Devnet".to_string(),
		ticker: "DARK".to_string(),
		slip44: 1,
		pub_key_hash: 0x1e,
		decimals: 8,
		supports_extended_public_key: false,
		hosts: vec![
			Host::full("https://ark-test.arkvault.io/api"),
			Host {
				kind: HostKind::Explorer,
				url: "https://test.arkscan.io".to_string(),
				failed_count: 0,
			},
		],
		explorer: "https://test.arkscan.io".to_string(),
		known_wallets_url: None,
	}
}
