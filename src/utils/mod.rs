//!
//! Utility module for the profile environment.
//!
//! Re-exports formatting helpers used when logging balances.
/// Utility functions for formatting and display
pub mod index;

pub use index::{format_balance, format_token_amount};
