use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque identifier addressing a file at the remote provider. Supplied by an
/// upstream caller; the ingest pipeline never interprets it beyond URL and
/// key construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
}

/// Metadata sidecar written next to every ingested blob.
///
/// `source_path` is always derived as `<app base URL>/file/<file id>` so the
/// reference stays stable and traceable regardless of what the provider
/// returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProperties {
    pub source_path: String,
    pub folder_path: String,
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Result of a successful ingest of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRecord {
    pub file_id: String,
    /// Reference to the uploaded content blob.
    pub blob: String,
    /// Reference to the uploaded metadata sidecar.
    pub metadata: String,
    /// Provider tag, currently always "box".
    pub source: String,
    /// Provider-facing URL of the source file.
    pub source_ref: String,
}
