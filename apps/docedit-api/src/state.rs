//! Application state for the DocEdit API

use anyhow::Result;
use docedit_core::{DocumentService, LocalBlobStore};
use std::sync::Arc;

use crate::config::Config;
use crate::db::{self, SqliteAuditStore, SqliteDocumentStore};

pub struct AppState {
    pub service: DocumentService,
    pub config: Config,
}

impl AppState {
    /// Open the blob directory and the database, then wire the service
    pub async fn new(config: Config) -> Result<Self> {
        let blob_path = config.blob_path();
        let blobs = LocalBlobStore::new(&blob_path, config.public_base_url.clone())?;
        tracing::info!("Storing documents in {}", blob_path.display());

        let pool = db::connect(&config.database_url).await?;

        let service = DocumentService::new(
            Arc::new(blobs),
            Arc::new(SqliteDocumentStore::new(pool.clone())),
            Arc::new(SqliteAuditStore::new(pool)),
        );

        Ok(Self { service, config })
    }
}
