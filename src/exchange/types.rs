/// Error types for exchange transaction operations
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
	#[error("Failed to find a transaction for [{0}].")]
	NotFound(String),

	#[error("Invalid exchange status [{0}].")]
	InvalidStatus(u8),

	#[error("Failed to decode exchange transactions: {0}")]
	Serialization(#[from] serde_json::Error),
}
