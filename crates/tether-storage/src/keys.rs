//! Shared key generation for storage backends.
//!
//! Every ingest destination lives under `{connection_id}/{file_id}/`; the
//! object and its metadata sidecar differ only in extension.

/// Storage key for an ingested content blob:
/// `{connection_id}/{file_id}/{file_id}.{extension}`.
pub fn ingest_object_key(connection_id: &str, file_id: &str, extension: &str) -> String {
    format!("{}/{}/{}.{}", connection_id, file_id, file_id, extension)
}

/// Storage key for the JSON metadata sidecar of an ingested file:
/// `{connection_id}/{file_id}/{file_id}.json`.
pub fn ingest_sidecar_key(connection_id: &str, file_id: &str) -> String {
    format!("{}/{}/{}.json", connection_id, file_id, file_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_layout() {
        assert_eq!(ingest_object_key("ws1", "42", "pdf"), "ws1/42/42.pdf");
    }

    #[test]
    fn test_sidecar_key_layout() {
        assert_eq!(ingest_sidecar_key("ws1", "42"), "ws1/42/42.json");
    }

    #[test]
    fn test_keys_share_prefix() {
        let object = ingest_object_key("c0ffee", "f1", "tar.gz");
        let sidecar = ingest_sidecar_key("c0ffee", "f1");
        assert!(object.starts_with("c0ffee/f1/"));
        assert!(sidecar.starts_with("c0ffee/f1/"));
    }
}
