//! Types for the remote network API integration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::coins::{Host, NetworkManifest};

/// How a wallet is identified when querying the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentifierType {
	Address,
	ExtendedPublicKey,
}

/// Identifier sent to the wallet lookup endpoint.
///
/// Identifiers are always recomputed from a wallet's import method and the
/// network's capabilities; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletIdentifier {
	#[serde(rename = "type")]
	pub kind: IdentifierType,
	pub value: String,
}

impl WalletIdentifier {
	pub fn address(value: impl Into<String>) -> Self {
		Self {
			kind: IdentifierType::Address,
			value: value.into(),
		}
	}

	pub fn extended_public_key(value: impl Into<String>) -> Self {
		Self {
			kind: IdentifierType::ExtendedPublicKey,
			value: value.into(),
		}
	}
}

/// Wallet as returned by the remote API. An empty result for an identifier
/// means the wallet has no on-chain activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
	pub address: String,
	#[serde(default)]
	pub public_key: Option<String>,
	/// Balance in the network's smallest unit, as a decimal string.
	#[serde(default)]
	pub balance: String,
	#[serde(default)]
	pub nonce: Option<String>,
	#[serde(default)]
	pub username: Option<String>,
}

/// A delegate (validator) registered on a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegate {
	pub username: String,
	pub address: String,
	pub public_key: String,
	#[serde(default)]
	pub rank: Option<u32>,
	#[serde(default)]
	pub votes: String,
}

/// Fee statistics for a single transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStatistics {
	pub min: String,
	pub avg: String,
	pub max: String,
}

/// Fee statistics keyed by transaction type (`transfer`, `vote`, ...).
pub type TransactionFees = BTreeMap<String, FeeStatistics>;

/// An address publicly attributed to an exchange, team or other entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownWallet {
	#[serde(rename = "type")]
	pub kind: String,
	pub name: String,
	pub address: String,
}

/// Envelope used by every endpoint of the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	pub data: T,
}

/// Remote collaborator bound to one network host.
#[async_trait::async_trait]
pub trait ClientService: Send + Sync {
	/// Look up the wallets behind `identifiers`. Wallets without activity
	/// are simply absent from the result.
	async fn wallets(&self, identifiers: &[WalletIdentifier]) -> Result<Vec<WalletData>, LookupError>;

	async fn delegates(&self) -> Result<Vec<Delegate>, LookupError>;

	async fn fees(&self) -> Result<TransactionFees, LookupError>;

	async fn known_wallets(&self) -> Result<Vec<KnownWallet>, LookupError>;
}

/// Builds [`ClientService`] instances for a network and selected host.
pub trait ClientFactory: Send + Sync {
	fn make(
		&self,
		manifest: &NetworkManifest,
		host: &Host,
		timeout: Option<Duration>,
	) -> Arc<dyn ClientService>;
}

/// Error types for remote API operations
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("Unexpected status {status} from {url}")]
	StatusError { status: u16, url: String },

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("No data returned")]
	NoData,
}
