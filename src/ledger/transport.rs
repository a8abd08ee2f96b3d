//! Hardware signing device transport.
//!
//! The core never talks to a device directly; it goes through [`LedgerTransport`], created per
//! coin instance by the environment's [`LedgerTransportFactory`]. Errors propagate unmodified and
//! no retry happens at this layer.

use super::types::{LedgerAddress, LedgerError};
use std::sync::Arc;

#[async_trait::async_trait]
pub trait LedgerTransport: Send + Sync {
	async fn connect(&self) -> Result<(), LedgerError>;

	async fn disconnect(&self) -> Result<(), LedgerError>;

	/// Compressed public key (hex) for `path`.
	async fn get_public_key(&self, path: &str) -> Result<String, LedgerError>;

	/// Extended public key for `path` as hex: 33-byte compressed key followed by
	/// the 32-byte chain code.
	async fn get_extended_public_key(&self, path: &str) -> Result<String, LedgerError>;

	async fn get_address(&self, path: &str) -> Result<LedgerAddress, LedgerError>;
}

/// Produces transports for coin instances. Shared read-only across the environment.
pub trait LedgerTransportFactory: Send + Sync {
	fn create(&self) -> Result<Arc<dyn LedgerTransport>, LedgerError>;
}

/// Factory used when no device integration is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTransportFactory;

impl LedgerTransportFactory for UnavailableTransportFactory {
	fn create(&self) -> Result<Arc<dyn LedgerTransport>, LedgerError> {
		Err(LedgerError::TransportError(
			"no hardware device transport configured".to_string(),
		))
	}
}
