//! Remote network API integration.
//!
//! This module provides the traits the core consumes for remote data (wallet lookup, delegates,
//! fees, known wallets, market prices) together with their reqwest-backed implementations.
//! The core only ever talks to the traits; tests substitute in-memory doubles.

/// HTTP client for a network host
mod client;
/// Market price feed
mod market;
/// Type definitions for remote data structures
mod types;

pub use client::{DEFAULT_REQUEST_TIMEOUT, HttpClientFactory, HttpClientService};
pub use market::{HttpPriceFeed, PriceFeed};
pub use types::*;
