//! DocEdit API - versioned PDF editing over HTTP
//!
//! Provides REST endpoints for:
//! - Uploading PDFs and listing a caller's documents
//! - Applying text and image edits, each committed as a new version
//! - Page metadata, deletion and the audit trail
//!
//! Committed version files are served read-only under `/files`.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Build the router over shared state
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Only version files are public; the data directory may also hold the database
    let files = ServeDir::new(state.config.blob_path());
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/documents",
            post(handlers::upload_document).get(handlers::list_documents),
        )
        .route(
            "/api/documents/:id",
            get(handlers::get_document).delete(handlers::delete_document),
        )
        .route("/api/documents/:id/pages", get(handlers::get_pages))
        .route("/api/documents/:id/process", post(handlers::process_document))
        .route("/api/documents/:id/audit", get(handlers::get_audit_log))
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
