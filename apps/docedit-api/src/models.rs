//! Request and response bodies for the DocEdit API

use docedit_core::PageRequest;
use serde::{Deserialize, Serialize};
use shared_types::{Document, Page};
use uuid::Uuid;

/// Upload body: the PDF travels base64-encoded
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub pdf_base64: String,
}

/// Instructions stay raw JSON until the engine decodes them one by one, so a
/// malformed entry is reported with its position
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub instructions: Vec<serde_json::Value>,
}

/// A document record plus the public URL of its current version
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    #[serde(flatten)]
    pub document: Document,
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagesResponse {
    pub document_id: Uuid,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListQuery> for PageRequest {
    fn from(query: ListQuery) -> Self {
        PageRequest::new(query.limit, query.offset)
    }
}
