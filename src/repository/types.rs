//! Types shared by the in-memory repositories.

/// Errors raised by [`DataRepository`](super::DataRepository) and the
/// typed repositories built on top of it.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
	#[error("There is no snapshot to restore.")]
	NoSnapshot,

	#[error("Failed to find a record for [{0}].")]
	NotFound(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
