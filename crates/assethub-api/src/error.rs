//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use assethub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler-facing error: an [`AppError`] that knows how to render itself.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// HTTP status and error code for an error kind.
    pub fn status_and_code(kind: ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::ExternalService => (StatusCode::BAD_GATEWAY, "STORAGE_BACKEND_ERROR"),
            ErrorKind::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::Configuration => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_NOT_CONFIGURED")
            }
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = Self::status_and_code(err.kind);

        let message = match err.kind {
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Serialization => {
                tracing::error!(
                    kind = %err.kind,
                    error = %err.message,
                    source = ?err.source,
                    "Internal server error"
                );
                "Internal server error".to_string()
            }
            ErrorKind::Configuration | ErrorKind::ExternalService => {
                tracing::error!(kind = %err.kind, error = %err.message, "Storage backend failure");
                err.message
            }
            _ => err.message,
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
