//! Generic in-memory storage primitives used by every profile and by the
//! environment-wide services.
//!
//! - `attributes`: typed key/value holder with default-value semantics.
//! - `data_repository`: ordered map with snapshot/restore and indexed-array mutation.
//! - `value`: the closed set of value types stored in settings repositories.

/// Typed key/value holder
mod attributes;
/// Ordered map with snapshot/restore
mod data_repository;
/// Error types for repository operations
mod types;
/// Stored value variants
mod value;

pub use attributes::AttributeBag;
pub use data_repository::DataRepository;
pub use types::*;
pub use value::{Indexable, Setting};
