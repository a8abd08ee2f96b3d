//! Coin and network layer.
//!
//! This module wires network manifests, host selection and the remote client into per-profile
//! coin instances:
//!
//! - `manifest`: static per-network data and the registry holding it.
//! - `host_selector`: default vs. custom host selection with failure tracking.
//! - `coin`: a constructed network client for one `(coin, network)` pair.
//! - `service`: the per-profile instance cache.

/// A constructed coin instance
mod coin;
/// Host selection
pub mod host_selector;
/// Static network data
pub mod manifest;
/// Per-profile instance cache
mod service;
/// Error and option types
mod types;

pub use coin::Coin;
pub use host_selector::{MAX_HOST_FAILURES, NetworkHostSelector};
pub use manifest::{ManifestRegistry, NetworkManifest};
pub use service::CoinService;
pub use types::*;
