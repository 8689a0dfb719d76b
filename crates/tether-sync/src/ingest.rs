//! File ingest: one fetch→stage→upload cycle, plus the retrying entry point.
//!
//! An ingest attempt fetches the file object from Box, stages the content in
//! a temporary directory scoped to the call, uploads the blob and its JSON
//! metadata sidecar under `{connection_id}/{file_id}/`, and returns the
//! resulting references. No partial-success state survives a failure; the
//! staging directory is removed on every exit path.

use std::sync::Arc;
use tracing::Instrument;

use tether_connectors::box_api::{source_url, BoxClient};
use tether_core::constants::BOX_API_BASE_URL;
use tether_core::models::{AuthData, FileProperties, FileRef, IngestRecord};
use tether_storage::{ingest_object_key, ingest_sidecar_key, Storage};

use crate::error::{IngestError, SyncError};
use crate::retry::{retry, RetryPolicy};

/// Extension derived from a display name: the substring after the last `.`.
/// A name without a `.` is used whole, matching the provider's historical
/// key layout.
fn file_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => name,
    }
}

/// File synchronization service: moves single files from Box into blob
/// storage with bounded retries on transient failure.
#[derive(Clone)]
pub struct SyncService {
    storage: Arc<dyn Storage>,
    policy: RetryPolicy,
    box_base_url: String,
}

impl SyncService {
    pub fn new(storage: Arc<dyn Storage>, policy: RetryPolicy) -> Self {
        Self {
            storage,
            policy,
            box_base_url: BOX_API_BASE_URL.to_string(),
        }
    }

    /// Same as [`SyncService::new`] with an overridable Box API base URL
    /// (tests, proxies).
    pub fn with_box_base_url(
        storage: Arc<dyn Storage>,
        policy: RetryPolicy,
        box_base_url: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            policy,
            box_base_url: box_base_url.into(),
        }
    }

    /// Run a single ingest attempt for one file.
    ///
    /// Classified failures let the retry layer distinguish retryable
    /// conditions from dead credentials or a missing file.
    pub async fn ingest_file(
        &self,
        file: &FileRef,
        connection_id: &str,
        auth: &AuthData,
    ) -> Result<IngestRecord, IngestError> {
        let client = BoxClient::with_base_url(auth, self.box_base_url.as_str())?;
        let file_obj = client.get_file(&file.id).await?;

        let folder_path = file_obj.folder_path();
        let property_values = file_obj.property_values();
        let file_name = file_obj.name;
        let extension = file_extension(&file_name).to_string();

        // Stage the download in a directory tied to this call; dropped (and
        // deleted) on every exit path, including the early returns below.
        let staging = tempfile::tempdir()?;
        let staged_path = staging.path().join(format!("{}.{}", file.id, extension));
        client.download_to(&file.id, &staged_path).await?;
        let data = tokio::fs::read(&staged_path).await?;

        let blob_key = ingest_object_key(connection_id, &file.id, &extension);
        let blob = self
            .storage
            .upload(&blob_key, data, "application/octet-stream")
            .await?;

        let properties = FileProperties {
            source_path: source_url(&file.id),
            folder_path,
            name: file_name,
            metadata: property_values,
        };
        let sidecar_key = ingest_sidecar_key(connection_id, &file.id);
        let metadata = self
            .storage
            .upload_json(&sidecar_key, &serde_json::to_value(&properties)?)
            .await?;

        tracing::info!(
            file_id = %file.id,
            blob_key = %blob_key,
            sidecar_key = %sidecar_key,
            "File ingested"
        );

        Ok(IngestRecord {
            file_id: file.id.clone(),
            blob,
            metadata,
            source: "box".to_string(),
            source_ref: properties.source_path,
        })
    }

    /// Ingest a file with bounded exponential backoff on transient failures.
    ///
    /// Auth and not-found failures surface immediately; transient provider
    /// and upload failures are retried per the configured policy, then
    /// reported as [`SyncError::RetryExhausted`] naming the file.
    pub async fn sync_file(
        &self,
        file: &FileRef,
        connection_id: &str,
        auth: &AuthData,
    ) -> Result<IngestRecord, SyncError> {
        let span = tracing::info_span!("sync_file", file_id = %file.id);

        async {
            retry(&self.policy, |_attempt| {
                self.ingest_file(file, connection_id, auth)
            })
            .await
            .map_err(|err| SyncError::from_retry(&file.id, err))
        }
        .instrument(span)
        .await
    }
}
