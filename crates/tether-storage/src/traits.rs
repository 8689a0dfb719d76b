//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use tether_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether retrying the same call can plausibly succeed. Key and
    /// configuration problems are permanent; everything crossing the wire is
    /// treated as transient.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            StorageError::InvalidKey(_)
                | StorageError::ConfigError(_)
                | StorageError::Serialization(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The sync pipeline works against it without coupling to a specific backend.
///
/// **Key format:** destination keys come from the `keys` module; see the
/// crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload raw bytes to a storage key and return the public URL of the
    /// stored object.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Serialize a value as JSON and upload it to a storage key. Returns the
    /// public URL of the stored document.
    async fn upload_json(&self, key: &str, value: &serde_json::Value) -> StorageResult<String> {
        let data = serde_json::to_vec(value)?;
        self.upload(key, data, "application/json").await
    }

    /// Download an object by its storage key.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its storage key. Deleting a missing object is not
    /// an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
