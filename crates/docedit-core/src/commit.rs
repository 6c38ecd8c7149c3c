//! Promotion of edited bytes to a document's next version
//!
//! The new version is written under a name no earlier version used, and only
//! then is the record repointed with a compare-and-swap on the version number.
//! If the swap fails the freshly written file is removed, so the record keeps
//! naming the previous version and no orphan is left behind.

use pdfedit_core::PipelineStage;
use shared_types::{hash_document, Document, VersionPointer};
use tracing::{info, warn};

use crate::error::DocumentError;
use crate::storage::BlobStore;
use crate::store::DocumentStore;

/// Commit `bytes` as version `current.version + 1` of the document
pub async fn commit_version(
    blobs: &dyn BlobStore,
    documents: &dyn DocumentStore,
    current: &Document,
    bytes: &[u8],
    page_count: u32,
) -> Result<Document, DocumentError> {
    let next_version = current.version + 1;
    let name = current.version_file_name(next_version);
    let file_path = blobs.save(&name, bytes)?;

    let pointer = VersionPointer {
        file_path: file_path.clone(),
        checksum: hash_document(bytes),
        page_count,
    };

    match documents
        .increment_version(current.id, current.version, pointer)
        .await
    {
        Ok(updated) => {
            info!(
                stage = ?PipelineStage::Committed,
                document_id = %updated.id,
                version = updated.version,
                file_path = %updated.file_path,
                "Committed document version"
            );
            Ok(updated)
        }
        Err(err) => {
            warn!(
                stage = ?PipelineStage::Aborted,
                document_id = %current.id,
                expected_version = current.version,
                error = %err,
                "Version commit rejected"
            );
            if let Err(cleanup) = blobs.delete(&file_path) {
                warn!(
                    document_id = %current.id,
                    file_path = %file_path,
                    error = %cleanup,
                    "Failed to remove uncommitted version file"
                );
            }
            Err(err.into())
        }
    }
}
