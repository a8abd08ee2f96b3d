//! Profile environment runtime for a multi-network wallet.
//!
//! The crate keeps every profile's settings, contacts, wallets, custom hosts and exchange orders in
//! memory, persists them as one versioned blob, and keeps network-derived caches warm through a
//! background synchronizer. Hardware wallets are imported through a paginated BIP44 address scan.

pub mod coins;
pub mod config;
pub mod environment;
pub mod exchange;
pub mod ledger;
pub mod network;
pub mod profile;
pub mod repository;
pub mod synchronizer;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
