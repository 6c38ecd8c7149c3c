//! Error types for the DocEdit API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docedit_core::DocumentError;
use pdfedit_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Document(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Resource | ErrorKind::Consistency | ErrorKind::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::Document(DocumentError::Internal(e)) => {
                tracing::error!("Internal error: {}", e);
                "Internal error".to_string()
            }
            ApiError::Document(e) => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", e);
                }
                e.to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docedit_core::StoreError;
    use pdfedit_core::EditError;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ApiError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (
                DocumentError::from(EditError::NoInstructions).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                DocumentError::NotFound(Uuid::nil()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                DocumentError::from(StoreError::VersionConflict {
                    id: Uuid::nil(),
                    expected: 1,
                    actual: 2,
                })
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                DocumentError::from(EditError::PageCountMismatch {
                    expected: 3,
                    actual: 2,
                })
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DocumentError::Internal("join failed".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{}", err);
        }
    }

    #[test]
    fn test_response_status_matches() {
        let response = ApiError::InvalidRequest("missing x-user-id header".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
