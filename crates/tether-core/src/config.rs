//! Configuration module
//!
//! Environment-driven configuration for database access, storage backend
//! selection, OAuth client settings, and sync tuning. Call
//! [`Config::from_env`] once at startup; `.env` files are honored via
//! dotenvy.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_SYNC_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_SYNC_BASE_DELAY_SECS: u64 = 3;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // OAuth configuration
    pub google_oauth_client_id: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    // Sync tuning
    pub sync_max_attempts: u32,
    pub sync_base_delay_secs: u64,
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Load .env if present; ignore when absent (production sets real env vars).
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is required but not set"))?;

        let storage_backend = match optional_env("STORAGE_BACKEND") {
            Some(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|e| anyhow::anyhow!("Invalid STORAGE_BACKEND: {}", e))?,
            None => StorageBackend::S3,
        };

        let sync_max_attempts = match optional_env("SYNC_MAX_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| anyhow::anyhow!("Invalid SYNC_MAX_ATTEMPTS: {}", e))?,
            None => DEFAULT_SYNC_MAX_ATTEMPTS,
        };

        let sync_base_delay_secs = match optional_env("SYNC_BASE_DELAY_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| anyhow::anyhow!("Invalid SYNC_BASE_DELAY_SECS: {}", e))?,
            None => DEFAULT_SYNC_BASE_DELAY_SECS,
        };

        let config = Config {
            database_url,
            storage_backend,
            s3_bucket: optional_env("S3_BUCKET"),
            s3_region: optional_env("S3_REGION").or_else(|| optional_env("AWS_REGION")),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            local_storage_path: optional_env("LOCAL_STORAGE_PATH"),
            local_storage_base_url: optional_env("LOCAL_STORAGE_BASE_URL"),
            google_oauth_client_id: optional_env("GOOGLE_OAUTH_CLIENT_ID"),
            github_client_id: optional_env("GITHUB_CLIENT_ID"),
            github_client_secret: optional_env("GITHUB_CLIENT_SECRET"),
            sync_max_attempts,
            sync_base_delay_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot construct their selected backend.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET is required when STORAGE_BACKEND=s3");
                }
                if self.s3_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION is required when STORAGE_BACKEND=s3");
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH is required when STORAGE_BACKEND=local");
                }
                if self.local_storage_base_url.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_BASE_URL is required when STORAGE_BACKEND=local");
                }
            }
        }

        if self.sync_max_attempts == 0 {
            anyhow::bail!("SYNC_MAX_ATTEMPTS must be at least 1");
        }

        Ok(())
    }
}
