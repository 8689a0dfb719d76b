//! Tether Storage Library
//!
//! This crate provides the blob storage abstraction used by the sync
//! pipeline, with S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! Ingest destinations are namespaced per connection and file:
//!
//! - **Content blob**: `{connection_id}/{file_id}/{file_id}.{extension}`
//! - **Metadata sidecar**: `{connection_id}/{file_id}/{file_id}.json`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{ingest_object_key, ingest_sidecar_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use tether_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
