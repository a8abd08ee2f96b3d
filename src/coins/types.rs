use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a host serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
	Full,
	Musig,
	Explorer,
}

/// A network endpoint.
///
/// `failed_count` is the rolling failure counter maintained for custom hosts;
/// it is reset on the first successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
	#[serde(rename = "type")]
	pub kind: HostKind,
	pub url: String,
	#[serde(default)]
	pub failed_count: u32,
}

impl Host {
	pub fn full(url: impl Into<String>) -> Self {
		Self {
			kind: HostKind::Full,
			url: url.into(),
			failed_count: 0,
		}
	}
}

/// Options used when constructing a coin instance.
#[derive(Debug, Clone, Default)]
pub struct CoinOptions {
	/// Per-request timeout forwarded to the network client.
	pub timeout: Option<Duration>,
	/// Custom hosts configured by the profile for this network.
	pub custom_hosts: Vec<Host>,
	/// Whether to fall back to the default hosts once custom hosts keep failing.
	pub fallback_to_default: bool,
}

/// Error types for coin construction and lookup
#[derive(Debug, thiserror::Error)]
pub enum CoinError {
	#[error("An instance for [{0}] does not exist.")]
	NotFound(String),

	#[error("Failed to find a manifest for [{coin}.{network}].")]
	ManifestNotFound { coin: String, network: String },

	#[error("No host available for [{0}].")]
	NoHost(String),
}
