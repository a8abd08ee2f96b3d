//! The profile environment runtime.
//!
//! An [`Environment`] owns the shared [`Container`], the environment-wide services and the
//! profiles. It is booted from a blob store, migrated to the current schema version and persisted
//! back as a single blob.

mod container;

mod driver;

pub mod migrations;

pub mod services;

mod storage;

mod types;

pub use container::Container;
pub use driver::Environment;
pub use migrations::{Migration, Migrator, Version};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use types::*;
