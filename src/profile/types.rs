use crate::coins::CoinError;
use crate::exchange::ExchangeError;
use crate::ledger::LedgerError;
use crate::repository::RepositoryError;

use serde::{Deserialize, Serialize};

/// Setting consulted when selecting hosts: fall back to default hosts once custom ones keep failing.
pub const SETTING_FALLBACK_TO_DEFAULT_NODES: &str = "FALLBACK_TO_DEFAULT_NODES";

/// Setting holding the currency exchange rates are shown in.
pub const SETTING_EXCHANGE_CURRENCY: &str = "EXCHANGE_CURRENCY";

/// Attributes every profile may carry besides its settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileAttribute {
	Name,
	Avatar,
	CreatedAt,
}

/// Error types for profile operations
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
	#[error("Failed to find a profile for [{0}].")]
	ProfileNotFound(String),

	#[error("Failed to find a wallet for [{0}].")]
	WalletNotFound(String),

	#[error("The wallet [{0}] already exists.")]
	WalletAlreadyExists(String),

	#[error("Failed to find a contact for [{0}].")]
	ContactNotFound(String),

	#[error("Repository error: {0}")]
	Repository(#[from] RepositoryError),

	#[error("Exchange error: {0}")]
	Exchange(#[from] ExchangeError),

	#[error("Coin error: {0}")]
	Coin(#[from] CoinError),

	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
