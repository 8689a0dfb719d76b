//! Sync pipeline errors.
//!
//! `IngestError` tags each failure of a single ingest attempt with whether it
//! is worth retrying; `SyncError` is the terminal contract of the retrying
//! entry point.

use thiserror::Error;

use crate::retry::{RetryClass, RetryError};
use tether_connectors::ConnectorError;
use tether_storage::StorageError;

/// Failure of one ingest attempt, classified at the source.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Provider auth failed: {0}")]
    Auth(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Transient provider error: {0}")]
    Provider(String),

    #[error("Transient upload error: {0}")]
    Upload(String),

    #[error("Staging error: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConnectorError> for IngestError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Auth(m) => IngestError::Auth(m),
            ConnectorError::NotFound(m) => IngestError::NotFound(m),
            ConnectorError::Transient(m) => IngestError::Provider(m),
            ConnectorError::InvalidResponse(m) | ConnectorError::Setup(m) => {
                IngestError::Internal(m)
            }
        }
    }
}

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        if err.is_transient() {
            IngestError::Upload(err.to_string())
        } else {
            IngestError::Internal(err.to_string())
        }
    }
}

impl RetryClass for IngestError {
    fn is_retryable(&self) -> bool {
        matches!(self, IngestError::Provider(_) | IngestError::Upload(_))
    }
}

/// Terminal outcome of [`crate::sync_file`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// Every attempt failed with a transient error.
    #[error("Retries exhausted after {attempts} attempts for file {file_id}")]
    RetryExhausted {
        file_id: String,
        attempts: u32,
        #[source]
        source: IngestError,
    },

    /// A non-retryable failure ended the sync on its first occurrence.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl SyncError {
    pub(crate) fn from_retry(file_id: &str, err: RetryError<IngestError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, source } => SyncError::RetryExhausted {
                file_id: file_id.to_string(),
                attempts,
                source,
            },
            RetryError::Fatal(source) => SyncError::Ingest(source),
        }
    }
}
