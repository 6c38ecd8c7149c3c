//! Types shared by the edit engine, the versioning service and the API

pub mod audit;
pub mod document;

pub use audit::{AuditAction, AuditLogEntry};
pub use document::{
    hash_document, version_file_name, Document, DocumentStatus, Page, VersionPointer,
};
