//! Document and audit record stores

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use shared_types::{AuditLogEntry, Document, VersionPointer};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Normalized `limit`/`offset` for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    /// Missing or non-positive limits become the default; large ones are capped
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => (l as u64).min(MAX_PAGE_LIMIT as u64) as u32,
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = offset
            .filter(|o| *o > 0)
            .map(|o| o.min(u32::MAX as i64) as u32)
            .unwrap_or(0);
        Self { limit, offset }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Metadata store for document records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, document: &Document) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn update(&self, document: &Document) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Point the record at a newly committed version.
    ///
    /// Compare-and-swap: succeeds only while the stored version equals
    /// `expected_version`, and then sets it to `expected_version + 1`
    /// together with the new path, checksum, page count and `updated_at`.
    async fn increment_version(
        &self,
        id: Uuid,
        expected_version: u32,
        pointer: VersionPointer,
    ) -> Result<Document, StoreError>;

    /// Documents of one owner, newest first, plus the owner's total count
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Document>, u64), StoreError>;
}

/// Append-only audit trail
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError>;

    /// Entries of one document, oldest first, plus the total count
    async fn find_by_document(
        &self,
        document_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), StoreError>;
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, document: &Document) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(StoreError::Duplicate(document.id));
        }
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn update(&self, document: &Document) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let stored = documents
            .get_mut(&document.id)
            .ok_or(StoreError::NotFound(document.id))?;
        *stored = Document {
            updated_at: Utc::now(),
            ..document.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn increment_version(
        &self,
        id: Uuid,
        expected_version: u32,
        pointer: VersionPointer,
    ) -> Result<Document, StoreError> {
        let mut documents = self.documents.write().await;
        let stored = documents.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        stored.version = expected_version + 1;
        stored.file_path = pointer.file_path;
        stored.checksum = pointer.checksum;
        stored.page_count = pointer.page_count;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Document>, u64), StoreError> {
        let documents = self.documents.read().await;
        let mut owned: Vec<Document> = documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = owned.len() as u64;
        Ok((paginate(&owned, page), total))
    }
}

#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn find_by_document(
        &self,
        document_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, u64), StoreError> {
        let entries = self.entries.read().await;
        // Appends arrive in commit order, so insertion order is oldest first
        let matching: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| e.document_id == document_id)
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok((paginate(&matching, page), total))
    }
}
