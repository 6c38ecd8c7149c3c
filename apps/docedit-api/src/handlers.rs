//! HTTP handlers for the DocEdit API

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use docedit_core::{AuditList, DocumentError, DocumentService, PageRequest};
use pdfedit_core::decode_instructions;
use shared_types::Document;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Header carrying the caller's id, set by a trusted upstream
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller, taken from the `x-user-id` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

pub fn parse_user_id(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::InvalidRequest(format!("Invalid {} header: {}", USER_ID_HEADER, value)))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::InvalidRequest(format!("Missing {} header", USER_ID_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::InvalidRequest(format!("Invalid {} header", USER_ID_HEADER)))?;
        parse_user_id(value).map(CallerId)
    }
}

fn respond(service: &DocumentService, document: Document) -> DocumentResponse {
    DocumentResponse {
        file_url: service.file_url(&document),
        document,
    }
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Upload a PDF as version 1 of a new document
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let Json(req) = payload?;
    let filename = req.filename.trim();
    if filename.is_empty() {
        return Err(ApiError::InvalidRequest("filename is required".to_string()));
    }

    let pdf_data = BASE64
        .decode(req.pdf_base64.trim())
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))?;

    if pdf_data.len() > state.config.max_upload_bytes {
        return Err(ApiError::InvalidRequest(format!(
            "File is {} bytes, limit is {}",
            pdf_data.len(),
            state.config.max_upload_bytes
        )));
    }

    let document = state
        .service
        .upload_and_index(user_id, pdf_data, filename)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(respond(&state.service, document)),
    ))
}

/// List the caller's documents, newest first
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    Query(query): Query<ListQuery>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let list = state.service.list(user_id, query.into()).await?;

    Ok(Json(DocumentListResponse {
        documents: list
            .documents
            .into_iter()
            .map(|d| respond(&state.service, d))
            .collect(),
        total: list.total,
        limit: list.limit,
        offset: list.offset,
    }))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state.service.get(id).await?;
    Ok(Json(respond(&state.service, document)))
}

/// Page dimensions of the current version
pub async fn get_pages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PagesResponse>, ApiError> {
    let pages = state.service.pages(id).await?;
    Ok(Json(PagesResponse {
        document_id: id,
        pages,
    }))
}

/// Apply edit instructions and commit the result as a new version
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let Json(req) = payload?;
    let instructions = decode_instructions(req.instructions).map_err(DocumentError::from)?;
    let document = state.service.process(id, user_id, instructions).await?;
    Ok(Json(respond(&state.service, document)))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    CallerId(user_id): CallerId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.service.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Audit history of a document, oldest first
pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AuditList>, ApiError> {
    let page: PageRequest = query.into();
    Ok(Json(state.service.audit_log(id, page).await?))
}
