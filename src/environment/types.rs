//! Error types for the environment runtime

use crate::coins::CoinError;
use crate::exchange::ExchangeError;
use crate::ledger::LedgerError;
use crate::network::LookupError;
use crate::profile::ProfileError;
use crate::repository::RepositoryError;

/// Error types for blob storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Error types for schema migrations
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
	#[error("Invalid version [{0}].")]
	InvalidVersion(String),

	#[error("Migration {version} failed for profile [{profile}]: {reason}")]
	Failed {
		version: String,
		profile: String,
		reason: String,
	},

	#[error("Malformed environment data: {0}")]
	Malformed(String),
}

/// Aggregate error for environment operations
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),

	#[error("Migration error: {0}")]
	Migration(#[from] MigrationError),

	#[error("Repository error: {0}")]
	Repository(#[from] RepositoryError),

	#[error("Profile error: {0}")]
	Profile(#[from] ProfileError),

	#[error("Coin error: {0}")]
	Coin(#[from] CoinError),

	#[error("Exchange error: {0}")]
	Exchange(#[from] ExchangeError),

	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),

	#[error("Lookup error: {0}")]
	Lookup(#[from] LookupError),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
