//! Logical file entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assethub_core::types::{FileId, FileVersionId, ProjectId};

use super::format::FileCategory;

/// The stable identity a (scope, name) pair maps to.
///
/// `current_version_id`, once set, always names a version of this file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogicalFile {
    /// Unique file identifier.
    pub id: FileId,
    /// Owning scope, taken from the scope association row.
    pub project_id: ProjectId,
    /// Display name, unique among live files of the scope.
    pub name: String,
    /// Coarse content kind.
    pub category: FileCategory,
    /// Extension-derived format token, lowercase.
    pub format: String,
    /// Version designated as authoritative for reads.
    pub current_version_id: Option<FileVersionId>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file row last changed.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl LogicalFile {
    /// Check whether this file has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a logical file and its scope association.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLogicalFile {
    /// Owning scope.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Coarse content kind.
    pub category: FileCategory,
    /// Format token.
    pub format: String,
}
