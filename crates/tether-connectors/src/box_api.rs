//! Box content API client.
//!
//! Wraps the two calls the sync pipeline needs: fetching a file object (name,
//! ancestor folders, custom properties) and streaming its content to a local
//! path. Failures are classified per [`ConnectorError`].

use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tether_core::constants::{BOX_API_BASE_URL, BOX_APP_BASE_URL};
use tether_core::models::AuthData;
use tokio::io::AsyncWriteExt;

use crate::error::ConnectorError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Web URL of a Box file, derived from the id alone.
///
/// Always computed locally so the stored source reference is deterministic
/// and traceable, independent of what the provider response contains.
pub fn source_url(file_id: &str) -> String {
    format!("{}/file/{}", BOX_APP_BASE_URL, file_id)
}

/// File object as returned by `GET /files/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoxFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path_collection: BoxPathCollection,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoxPathCollection {
    #[serde(default)]
    pub entries: Vec<BoxPathEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxPathEntry {
    pub name: String,
}

impl BoxFile {
    /// Ancestor folder names joined into a single path, root first.
    pub fn folder_path(&self) -> String {
        self.path_collection
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Custom properties flattened to strings for the metadata sidecar.
    pub fn property_values(&self) -> HashMap<String, String> {
        self.properties
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }
}

/// Box API client bound to one connection's credentials.
pub struct BoxClient {
    http_client: Client,
    base_url: String,
    access_token: String,
}

impl BoxClient {
    /// Build a client from a connection's credentials. Fails with an auth
    /// error when no usable access token is present.
    pub fn new(auth: &AuthData) -> Result<Self, ConnectorError> {
        Self::with_base_url(auth, BOX_API_BASE_URL)
    }

    /// Same as [`BoxClient::new`] with an overridable API base URL (tests,
    /// proxies).
    pub fn with_base_url(
        auth: &AuthData,
        base_url: impl Into<String>,
    ) -> Result<Self, ConnectorError> {
        let access_token = auth
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ConnectorError::Auth("Connection has no Box access token".to_string())
            })?
            .to_string();

        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ConnectorError::Setup(format!("Failed to create HTTP client for Box: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Fetch the file object for an id.
    pub async fn get_file(&self, file_id: &str) -> Result<BoxFile, ConnectorError> {
        let url = format!("{}/files/{}", self.base_url, file_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectorError::from_status(
                status,
                format!("Box file lookup failed: {} - {}", status, detail),
            ));
        }

        let file: BoxFile = response.json().await.map_err(|e| {
            ConnectorError::InvalidResponse(format!("Failed to parse Box file object: {}", e))
        })?;

        Ok(file)
    }

    /// Stream a file's content to a local path.
    pub async fn download_to(&self, file_id: &str, target: &Path) -> Result<u64, ConnectorError> {
        let url = format!("{}/files/{}/content", self.base_url, file_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectorError::from_status(
                status,
                format!("Box download failed: {} - {}", status, detail),
            ));
        }

        let mut file = tokio::fs::File::create(target).await.map_err(|e| {
            ConnectorError::Setup(format!(
                "Failed to create download target {}: {}",
                target.display(),
                e
            ))
        })?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| ConnectorError::Transient(format!("Box download stream: {}", e)))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ConnectorError::Setup(format!("Failed to write download: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| ConnectorError::Setup(format!("Failed to flush download: {}", e)))?;

        tracing::debug!(file_id = %file_id, size_bytes = written, "Box download complete");

        Ok(written)
    }
}
