//! Response DTOs.

use serde::{Deserialize, Serialize};

use assethub_core::types::{FileId, FileVersionId};
use assethub_service::FileDeletion;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of a rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackResponse {
    /// The file.
    pub file_id: FileId,
    /// Id of the version now current.
    pub current_version_id: FileVersionId,
    /// Its number.
    pub current_version_number: i32,
}

/// Result of a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// The deleted file.
    pub file_id: FileId,
    /// Version rows removed.
    pub versions_removed: u64,
    /// Storage objects that could not be removed.
    pub objects_failed: usize,
}

impl From<FileDeletion> for DeleteResponse {
    fn from(deletion: FileDeletion) -> Self {
        Self {
            file_id: deletion.file_id,
            versions_removed: deletion.versions_removed,
            objects_failed: deletion.objects_failed,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `"connected"`, `"unreachable"`, or `"memory"`.
    pub database: String,
    /// `"configured"` or `"not_configured"`.
    pub storage: String,
    /// Active provider name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_provider: Option<String>,
}
