//! Blob storage backing environment persistence.
//!
//! The environment writes one combined blob per `persist()`. Where that blob lives is up to the
//! [`BlobStore`]: [`FileBlobStore`] keeps one file per key in a data directory, [`MemoryBlobStore`]
//! keeps everything in process memory and is what tests boot with.

use super::types::StorageError;

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key/value blob store
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
	async fn set(&self, key: &str, blob: &str) -> Result<(), StorageError>;
	async fn forget(&self, key: &str) -> Result<(), StorageError>;
}

/// File-based implementation of BlobStore
pub struct FileBlobStore {
	data_dir: PathBuf,
}

impl FileBlobStore {
	pub fn new(data_dir: PathBuf) -> Self {
		Self { data_dir }
	}

	fn get_blob_filename(&self, key: &str) -> PathBuf {
		self.data_dir.join(format!("{}.json", Self::file_stem(key)))
	}

	fn get_metadata_filename(&self, key: &str) -> PathBuf {
		self.data_dir.join(format!("{}.meta.json", Self::file_stem(key)))
	}

	/// Keys are free-form; only keep characters that are safe in a file name.
	fn file_stem(key: &str) -> String {
		key.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
					c
				} else {
					'_'
				}
			})
			.collect()
	}
}

#[async_trait::async_trait]
impl BlobStore for FileBlobStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let filename = self.get_blob_filename(key);
		match tokio::fs::read_to_string(&filename).await {
			Ok(blob) => {
				debug!("Loaded {} bytes from {:?}", blob.len(), filename);
				Ok(Some(blob))
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(StorageError::Io(e)),
		}
	}

	async fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
		tokio::fs::create_dir_all(&self.data_dir).await?;

		// Create metadata
		let metadata = serde_json::json!({
			"key": key,
			"bytes": blob.len(),
			"timestamp": chrono::Utc::now().to_rfc3339(),
		});

		let metadata_filename = self.get_metadata_filename(key);
		tokio::fs::write(&metadata_filename, serde_json::to_string_pretty(&metadata)?).await?;

		let filename = self.get_blob_filename(key);
		tokio::fs::write(&filename, blob).await?;

		info!("Saved {} bytes to {:?}", blob.len(), filename);
		Ok(())
	}

	async fn forget(&self, key: &str) -> Result<(), StorageError> {
		for filename in [self.get_blob_filename(key), self.get_metadata_filename(key)] {
			match tokio::fs::remove_file(&filename).await {
				Ok(()) => debug!("Removed {:?}", filename),
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
				Err(e) => return Err(StorageError::Io(e)),
			}
		}
		Ok(())
	}
}

/// In-memory implementation of BlobStore
#[derive(Default)]
pub struct MemoryBlobStore {
	blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
	async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.blobs.read().await.get(key).cloned())
	}

	async fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
		self.blobs
			.write()
			.await
			.insert(key.to_string(), blob.to_string());
		Ok(())
	}

	async fn forget(&self, key: &str) -> Result<(), StorageError> {
		self.blobs.write().await.remove(key);
		Ok(())
	}
}
