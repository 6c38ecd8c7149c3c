//! Server configuration from environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Data directory; version files live in its `blobs` subdirectory
    pub storage_path: PathBuf,
    pub database_url: String,
    /// URL prefix under which files in `blob_path()` are served
    pub public_base_url: String,
    /// Largest accepted PDF, after base64 decoding
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or blank keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(p) => p.trim().parse().with_context(|| format!("Invalid PORT: {}", p))?,
            None => DEFAULT_PORT,
        };

        let storage_path = PathBuf::from(get("STORAGE_PATH").unwrap_or_else(|| "./storage".to_string()));

        let database_url = get("DATABASE_URL").unwrap_or_else(|| {
            format!("sqlite:{}/docedit.db?mode=rwc", storage_path.display())
        });

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}/files", port));

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid MAX_UPLOAD_BYTES: {}", v))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            port,
            storage_path,
            database_url,
            public_base_url,
            max_upload_bytes,
        })
    }

    /// Directory of committed version files, the only one served under `/files`
    pub fn blob_path(&self) -> PathBuf {
        self.storage_path.join("blobs")
    }

    /// Request body limit that still admits a base64-encoded upload of
    /// `max_upload_bytes` plus its JSON envelope
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes / 3 * 4 + 64 * 1024
    }
}
