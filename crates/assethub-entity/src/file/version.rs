//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assethub_core::types::{FileId, FileVersionId, UserId};

use super::address::ContentAddress;

/// One immutable upload event of a logical file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: FileVersionId,
    /// The file this version belongs to.
    pub file_id: FileId,
    /// Sequence number, 1-based and gap-free per file.
    pub version_number: i32,
    /// Size declared by the uploader.
    pub size_bytes: i64,
    /// Client-supplied digest. Advisory only.
    pub hash: String,
    /// Backend object locator.
    pub storage_key: String,
    /// User who requested the upload.
    pub created_by: UserId,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

/// Everything needed to append a version except its number.
///
/// The catalog assigns the number and derives the storage key from
/// `address` inside the allocation transaction.
#[derive(Debug, Clone)]
pub struct VersionDraft {
    /// Declared size in bytes.
    pub size_bytes: i64,
    /// Addressing inputs for the storage key.
    pub address: ContentAddress,
}

impl VersionDraft {
    /// The file this draft will be appended to.
    pub fn file_id(&self) -> FileId {
        self.address.file_id
    }

    /// The creator recorded on the version row.
    pub fn created_by(&self) -> UserId {
        self.address.actor
    }
}
