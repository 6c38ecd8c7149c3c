use pdfedit_core::{EditError, ErrorKind};
use thiserror::Error;
use uuid::Uuid;

/// Failures of the blob store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the document and audit stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document {0} not found")]
    NotFound(Uuid),

    #[error("Document {0} already exists")]
    Duplicate(Uuid),

    #[error("Document {id} is at version {actual}, expected {expected}")]
    VersionConflict { id: Uuid, expected: u32, actual: u32 },

    #[error("Store backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Version conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for DocumentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(path) => {
                DocumentError::Conflict(format!("version file {} already exists", path))
            }
            other => DocumentError::Storage(other),
        }
    }
}

impl From<StoreError> for DocumentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => DocumentError::NotFound(id),
            StoreError::VersionConflict { .. } | StoreError::Duplicate(_) => {
                DocumentError::Conflict(err.to_string())
            }
            other => DocumentError::Store(other),
        }
    }
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::Validation(_) => ErrorKind::Validation,
            DocumentError::NotFound(_) => ErrorKind::NotFound,
            DocumentError::Conflict(_) => ErrorKind::Conflict,
            DocumentError::Edit(e) => e.kind(),
            DocumentError::Storage(_) | DocumentError::Store(_) => ErrorKind::Resource,
            DocumentError::Internal(_) => ErrorKind::Internal,
        }
    }
}
