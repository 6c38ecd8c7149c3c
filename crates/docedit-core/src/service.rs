//! Document lifecycle: upload, edit into new versions, delete, audit

use std::sync::Arc;

use pdfedit_core::{extract_pages, load_pdf, EditInstructionRequest, EditPipeline, ImageSource};
use serde::Serialize;
use serde_json::json;
use shared_types::{
    hash_document, version_file_name, AuditAction, AuditLogEntry, Document, Page,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commit::commit_version;
use crate::error::DocumentError;
use crate::locks::DocumentLocks;
use crate::storage::BlobStore;
use crate::store::{AuditStore, DocumentStore, PageRequest};

/// One page of a caller's documents
#[derive(Debug, Clone, Serialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// One page of a document's audit trail
#[derive(Debug, Clone, Serialize)]
pub struct AuditList {
    pub entries: Vec<AuditLogEntry>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Resolves image references in edit instructions against the blob store
struct BlobImageSource {
    blobs: Arc<dyn BlobStore>,
}

impl ImageSource for BlobImageSource {
    fn load(&self, reference: &str) -> Result<Vec<u8>, String> {
        self.blobs.read(reference).map_err(|e| e.to_string())
    }
}

/// Entry point for everything that reads or changes documents
pub struct DocumentService {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
    audit: Arc<dyn AuditStore>,
    locks: DocumentLocks,
}

impl DocumentService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        audit: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            blobs,
            documents,
            audit,
            locks: DocumentLocks::new(),
        }
    }

    /// Store an uploaded PDF as version 1 of a new document
    pub async fn upload_and_index(
        &self,
        owner_id: Uuid,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<Document, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Validation("file is empty".into()));
        }

        let (bytes, page_count) = tokio::task::spawn_blocking(move || {
            let doc = load_pdf(&bytes)?;
            let page_count = match extract_pages(&doc) {
                Ok(pages) => pages.len() as u32,
                Err(e) => {
                    warn!(error = %e, "Failed to extract page metadata, recording 0 pages");
                    0
                }
            };
            Ok::<_, DocumentError>((bytes, page_count))
        })
        .await
        .map_err(|e| DocumentError::Internal(e.to_string()))??;

        let id = Uuid::new_v4();
        let checksum = hash_document(&bytes);
        let file_path = self.blobs.save(&version_file_name(id, 1), &bytes)?;

        let document = Document::new(id, owner_id, file_path, checksum, page_count);
        if let Err(err) = self.documents.create(&document).await {
            self.remove_blob(id, &document.file_path);
            return Err(err.into());
        }

        info!(
            document_id = %id,
            owner_id = %owner_id,
            pages = page_count,
            size = bytes.len(),
            "Uploaded document"
        );
        self.record(AuditLogEntry::new(
            id,
            owner_id,
            AuditAction::Upload,
            Some(json!({ "filename": filename, "size": bytes.len() })),
        ))
        .await;

        Ok(document)
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, DocumentError> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or(DocumentError::NotFound(id))
    }

    pub async fn list(&self, owner_id: Uuid, page: PageRequest) -> Result<DocumentList, DocumentError> {
        let (documents, total) = self.documents.find_by_owner(owner_id, page).await?;
        Ok(DocumentList {
            documents,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Page dimensions of the current version
    pub async fn pages(&self, id: Uuid) -> Result<Vec<Page>, DocumentError> {
        let document = self.get(id).await?;
        let bytes = self.blobs.read(&document.file_path)?;
        let pages =
            tokio::task::spawn_blocking(move || load_pdf(&bytes).and_then(|doc| extract_pages(&doc)))
                .await
                .map_err(|e| DocumentError::Internal(e.to_string()))??;
        Ok(pages)
    }

    /// Apply an instruction list and commit the result as the next version.
    ///
    /// Either the document moves to exactly one new version or nothing about
    /// it changes.
    pub async fn process(
        &self,
        id: Uuid,
        user_id: Uuid,
        instructions: Vec<EditInstructionRequest>,
    ) -> Result<Document, DocumentError> {
        let _guard = self.locks.lock(id).await;

        let current = self.get(id).await?;
        let source = self.blobs.read(&current.file_path)?;
        let instructions_count = instructions.len();
        debug!(
            document_id = %id,
            version = current.version,
            instructions = instructions_count,
            "Processing edit instructions"
        );

        let images = BlobImageSource {
            blobs: self.blobs.clone(),
        };
        let outcome = tokio::task::spawn_blocking(move || {
            EditPipeline::new(&images).run(&source, &instructions)
        })
        .await
        .map_err(|e| DocumentError::Internal(e.to_string()))??;

        self.discard_orphaned_version(&current)?;
        let updated = commit_version(
            self.blobs.as_ref(),
            self.documents.as_ref(),
            &current,
            &outcome.bytes,
            outcome.page_count,
        )
        .await?;

        self.record(AuditLogEntry::new(
            id,
            user_id,
            AuditAction::Process,
            Some(json!({
                "instructions_count": instructions_count,
                "new_version": updated.version,
            })),
        ))
        .await;

        Ok(updated)
    }

    /// Remove the record, then every version file, then audit the deletion
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DocumentError> {
        let _guard = self.locks.lock(id).await;

        let document = self.get(id).await?;
        self.documents.delete(id).await?;

        // One past the current version catches a file left by an interrupted commit
        for version in 1..=document.version + 1 {
            self.remove_blob(id, &document.version_file_name(version));
        }

        info!(document_id = %id, versions = document.version, "Deleted document");
        self.record(AuditLogEntry::new(id, user_id, AuditAction::Delete, None))
            .await;
        Ok(())
    }

    pub async fn audit_log(&self, id: Uuid, page: PageRequest) -> Result<AuditList, DocumentError> {
        let (entries, total) = self.audit.find_by_document(id, page).await?;
        Ok(AuditList {
            entries,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Public URL of the document's current version
    pub fn file_url(&self, document: &Document) -> String {
        self.blobs.url_for(&document.file_path)
    }

    /// Remove a next-version file the record does not point at.
    ///
    /// Saves never overwrite, so such a file can only be left by a commit that
    /// stopped between writing it and moving the record. Callers hold the
    /// document's lock and have just read the record at `current.version`.
    fn discard_orphaned_version(&self, current: &Document) -> Result<(), DocumentError> {
        let next = current.version_file_name(current.version + 1);
        if next != current.file_path && self.blobs.exists(&next)? {
            warn!(
                document_id = %current.id,
                version = current.version,
                file_path = %next,
                "Removing version file left by an interrupted commit"
            );
            self.blobs.delete(&next)?;
        }
        Ok(())
    }

    async fn record(&self, entry: AuditLogEntry) {
        if let Err(e) = self.audit.append(&entry).await {
            warn!(
                document_id = %entry.document_id,
                action = %entry.action,
                error = %e,
                "Failed to write audit log entry"
            );
        }
    }

    fn remove_blob(&self, id: Uuid, path: &str) {
        if let Err(e) = self.blobs.delete(path) {
            warn!(document_id = %id, file_path = %path, error = %e, "Failed to delete file");
        }
    }
}
