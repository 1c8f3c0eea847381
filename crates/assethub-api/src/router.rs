//! Route definitions for the AssetHub HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to every handler via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Headroom on top of the file size for multipart framing and text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the router with all routes and the request-logging middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .merge(file_routes(max_upload))
        .merge(project_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Upload, download, content proxy, versions, rollback, delete
fn file_routes(max_upload: usize) -> Router<AppState> {
    Router::new()
        .route("/files/pre-upload", post(handlers::file::pre_upload))
        .route(
            "/files/upload",
            post(handlers::file::upload).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/files/{id}", delete(handlers::file::delete_file))
        .route("/files/{id}/download", get(handlers::file::download))
        .route("/files/{id}/content", get(handlers::file::content))
        .route("/files/{id}/versions", get(handlers::file::list_versions))
        .route("/files/{id}/rollback", post(handlers::file::rollback))
}

/// Project-scoped listings
fn project_routes() -> Router<AppState> {
    Router::new().route("/projects/{id}/files", get(handlers::project::list_files))
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
