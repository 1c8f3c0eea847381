//! # assethub-api
//!
//! HTTP API layer for AssetHub built on Axum.
//!
//! Provides the file and project endpoints, bearer-token extraction,
//! request logging, CORS, and the mapping from `AppError` to HTTP statuses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
