//! Hardware wallet (Ledger) integration.
//!
//! - `transport`: the device collaborator and its factory.
//! - `hd`: BIP44 paths, public child derivation and address encoding.
//! - `discovery`: the paginated scan that finds funded addresses on a device.
//! - `progress_tracker`: statistics and progress logging for a scan.

/// Paginated address discovery
pub mod discovery;
/// BIP32/BIP44 public derivation
pub mod hd;
/// Scan statistics
pub mod progress_tracker;
/// Device transport traits
pub mod transport;
/// Error and result types
mod types;

pub use discovery::LedgerDiscoveryService;
pub use hd::{DerivationPath, ExtendedPublicKey};
pub use progress_tracker::DiscoveryStats;
pub use transport::{LedgerTransport, LedgerTransportFactory, UnavailableTransportFactory};
pub use types::*;
