//! Request DTOs with validation.

use serde::Deserialize;
use validator::Validate;

use assethub_core::error::AppError;
use assethub_core::types::{FileVersionId, ProjectId};
use assethub_service::{PreUploadRequest, VersionSelector};

/// `POST /api/files/pre-upload` body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreUploadBody {
    /// Owning project; 0 is reserved to privileged callers.
    #[validate(range(min = 0, message = "projectId must not be negative"))]
    pub project_id: i64,
    /// Logical file name.
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    /// File category.
    #[validate(length(min = 1, message = "fileCategory is required"))]
    pub file_category: String,
    /// File format, usually the extension.
    #[validate(length(min = 1, max = 32, message = "fileFormat is required"))]
    pub file_format: String,
    /// Declared size in bytes.
    #[serde(default)]
    #[validate(range(min = 0, message = "sizeBytes must not be negative"))]
    pub size_bytes: i64,
    /// Client-computed content hash.
    #[serde(default)]
    #[validate(length(max = 128, message = "hash must be at most 128 characters"))]
    pub hash: String,
    /// Explicit content type for the PUT.
    #[serde(default, alias = "mimeType")]
    pub content_type: Option<String>,
}

impl From<PreUploadBody> for PreUploadRequest {
    fn from(body: PreUploadBody) -> Self {
        Self {
            project_id: ProjectId::new(body.project_id),
            name: body.name,
            category: body.file_category,
            format: body.file_format,
            size_bytes: body.size_bytes,
            hash: body.hash,
            content_type: body.content_type,
            declared_content_type: None,
        }
    }
}

/// `POST /api/files/{id}/rollback` body.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RollbackBody {
    /// Target version number.
    #[validate(range(min = 1, message = "versionNumber must be positive"))]
    pub version_number: i32,
}

/// `GET /api/files/{id}/download` query.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    /// Explicit version id.
    pub version_id: Option<i64>,
    /// Explicit version number.
    pub version_number: Option<i32>,
}

impl From<DownloadQuery> for VersionSelector {
    fn from(query: DownloadQuery) -> Self {
        Self {
            version_id: query.version_id.map(FileVersionId::new),
            version_number: query.version_number,
        }
    }
}

/// Runs `validator` rules and folds failures into one validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|errors| AppError::validation(errors.to_string()))
}
