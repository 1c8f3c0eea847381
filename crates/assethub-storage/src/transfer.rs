//! Byte transfer against signed URLs and backend failure diagnostics.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::info;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

/// Maximum number of error-body bytes kept for diagnostics.
pub const MAX_ERROR_BODY: usize = 4096;

const REQUEST_ID_HEADERS: [&str; 2] = ["x-oss-request-id", "x-amz-request-id"];

/// HTTP client for transfers the gateway performs itself.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    client: reqwest::Client,
}

impl SignedTransfer {
    /// Create a transfer client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// PUT `body` to a signed `url` with the signed `content_type`.
    ///
    /// Returns the number of bytes sent.
    pub async fn put(&self, url: &str, content_type: &str, body: Bytes) -> AppResult<u64> {
        let size = body.len() as u64;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Storage upload request failed", e)
            })?;

        if !response.status().is_success() {
            return Err(backend_failure("storage upload", response).await);
        }

        info!(bytes = size, content_type, "Uploaded object through signed URL");
        Ok(size)
    }
}

/// Turn a non-2xx backend response into an error carrying the status, the
/// backend request id, and at most [`MAX_ERROR_BODY`] bytes of its body.
///
/// A 404 becomes `NotFound`; everything else is `ExternalService`.
pub async fn backend_failure(operation: &str, mut response: reqwest::Response) -> AppError {
    let status = response.status();
    let request_id = REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| response.headers().get(*name))
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(MAX_ERROR_BODY);
    let detail = String::from_utf8_lossy(&body);

    let message = format!(
        "{operation} failed: {status}, requestId={request_id}, detail={}",
        detail.trim()
    );
    if status == reqwest::StatusCode::NOT_FOUND {
        AppError::not_found(message)
    } else {
        AppError::external_service(message)
    }
}
