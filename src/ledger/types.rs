use crate::network::{LookupError, WalletData};
use serde::{Deserialize, Serialize};

/// Public key and address the device reports for a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAddress {
	pub public_key: String,
	pub address: String,
}

/// A funded wallet found while scanning, joined back to its derivation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerWallet {
	pub path: String,
	pub address: String,
	pub public_key: String,
	pub data: WalletData,
}

/// Configuration for the address discovery scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
	/// Addresses derived per page; a page without activity ends the scan.
	pub page_size: u32,
	/// Maximum identifiers sent in one lookup request.
	pub chunk_size: usize,
	/// Hard cap on pages scanned, guarding against lookups that never report an empty page.
	pub max_pages: u32,
}

impl Default for DiscoveryConfig {
	fn default() -> Self {
		Self {
			page_size: 5,
			chunk_size: 50,
			max_pages: 200,
		}
	}
}

/// Error types for hardware device access and address discovery
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
	#[error("Transport error: {0}")]
	TransportError(String),

	#[error("Invalid derivation path: {0}")]
	InvalidPath(String),

	#[error("Invalid extended public key: {0}")]
	InvalidKey(String),

	#[error("Key derivation failed: {0}")]
	DerivationError(String),

	#[error("Lookup error: {0}")]
	LookupError(#[from] LookupError),
}
