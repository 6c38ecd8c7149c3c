//! Document records and derived page metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Lifecycle status of a document record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Error,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Processing => write!(f, "PROCESSING"),
            DocumentStatus::Ready => write!(f, "READY"),
            DocumentStatus::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(DocumentStatus::Processing),
            "READY" => Ok(DocumentStatus::Ready),
            "ERROR" => Ok(DocumentStatus::Error),
            other => Err(format!("unknown document status '{}'", other)),
        }
    }
}

/// The single source of truth for which bytes are current.
///
/// `file_path` always names one committed, readable blob. It is only ever
/// repointed at a brand-new path together with a version bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_path: String,
    pub checksum: String,
    pub version: u32,
    pub status: DocumentStatus,
    pub page_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a version-1 record for freshly uploaded bytes
    pub fn new(id: Uuid, owner_id: Uuid, file_path: String, checksum: String, page_count: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            file_path,
            checksum,
            version: 1,
            status: DocumentStatus::Ready,
            page_count,
            created_at: now,
            updated_at: now,
        }
    }

    /// Blob name of the given version of this document
    pub fn version_file_name(&self, version: u32) -> String {
        version_file_name(self.id, version)
    }
}

/// Blob name for a document version: `{id}.pdf` for v1, `{id}_v{n}.pdf` after
pub fn version_file_name(id: Uuid, version: u32) -> String {
    if version <= 1 {
        format!("{}.pdf", id)
    } else {
        format!("{}_v{}.pdf", id, version)
    }
}

/// Where a committed version lives, applied atomically with a version bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPointer {
    pub file_path: String,
    pub checksum: String,
    pub page_count: u32,
}

/// Page dimensions in PDF points (1/72 inch). Always derived from the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub width: f64,
    pub height: f64,
}

/// Compute the content-addressed checksum (SHA-256, lowercase hex) of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_starts_at_version_one() {
        let doc = Document::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a.pdf".to_string(),
            hash_document(b"%PDF-1.7"),
            3,
        );
        assert_eq!(doc.version, 1);
        assert_eq!(doc.status, DocumentStatus::Ready);
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_version_file_names() {
        let id = Uuid::parse_str("6f1c1c5e-8d3b-4f57-9a44-1d2f0c9b7e11").unwrap();
        assert_eq!(
            version_file_name(id, 1),
            "6f1c1c5e-8d3b-4f57-9a44-1d2f0c9b7e11.pdf"
        );
        assert_eq!(
            version_file_name(id, 4),
            "6f1c1c5e-8d3b-4f57-9a44-1d2f0c9b7e11_v4.pdf"
        );
    }

    #[test]
    fn test_hash_document_is_sha256_hex() {
        let hash = hash_document(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&DocumentStatus::Ready).unwrap();
        assert_eq!(json, "\"READY\"");
        assert_eq!("READY".parse::<DocumentStatus>(), Ok(DocumentStatus::Ready));
        assert!("ready".parse::<DocumentStatus>().is_err());
    }
}
