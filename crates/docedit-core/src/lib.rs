//! Versioned documents around the PDF edit engine
//!
//! Each successful edit produces a new immutable version file and moves the
//! document record to it with a compare-and-swap; every state change leaves an
//! audit entry. Storage is reached only through the [`BlobStore`],
//! [`DocumentStore`] and [`AuditStore`] traits.

pub mod commit;
pub mod error;
pub mod locks;
pub mod service;
pub mod storage;
pub mod store;

pub use commit::commit_version;
pub use error::{DocumentError, StorageError, StoreError};
pub use service::{AuditList, DocumentList, DocumentService};
pub use storage::{BlobStore, LocalBlobStore};
pub use store::{
    AuditStore, DocumentStore, MemoryAuditStore, MemoryDocumentStore, PageRequest,
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
