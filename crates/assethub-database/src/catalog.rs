//! Catalog seams consumed by the gateway services.
//!
//! [`VersionCatalog`] is the authoritative record of logical files and
//! their append-only versions. [`MembershipOracle`] answers which tier, if
//! any, a user holds in a project. Both are implemented over PostgreSQL in
//! [`crate::repositories`] and in memory in [`crate::memory`].

use async_trait::async_trait;
use serde::Serialize;

use assethub_core::result::AppResult;
use assethub_core::types::{FileId, FileVersionId, PageRequest, PageResponse, ProjectId, UserId};
use assethub_entity::file::{FileVersion, LogicalFile, NewLogicalFile, VersionDraft};
use assethub_entity::project::ProjectRole;

/// A live file together with the version reads should resolve to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    /// The logical file.
    pub file: LogicalFile,
    /// Current version, or the newest one when the pointer is dangling.
    pub version: Option<FileVersion>,
}

/// Authoritative store of logical files and their versions.
#[async_trait]
pub trait VersionCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Find a live (not soft-deleted) file by id.
    async fn find_file(&self, id: FileId) -> AppResult<Option<LogicalFile>>;

    /// Find the live file named `name` in `project`.
    async fn find_file_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> AppResult<Option<LogicalFile>>;

    /// Create a file and its scope association.
    ///
    /// When a concurrent request created the same (scope, name) first, the
    /// existing file is returned instead.
    async fn create_file(&self, data: &NewLogicalFile) -> AppResult<LogicalFile>;

    /// Highest version number of `file`, or 0 when it has none. The next
    /// version is this plus one.
    ///
    /// Outside [`VersionCatalog::append_version`] the value is a snapshot;
    /// only the append computes it under the file lock.
    async fn max_version_number(&self, file: FileId) -> AppResult<i32>;

    /// Insert a version row with an explicit number.
    ///
    /// A duplicate (file, number) pair is a conflict.
    async fn insert_version(
        &self,
        file: FileId,
        version_number: i32,
        size_bytes: i64,
        hash: &str,
        storage_key: &str,
        created_by: UserId,
    ) -> AppResult<FileVersion>;

    /// Allocate the next number, derive the key, insert the version and
    /// make it current, all in one transaction.
    async fn append_version(&self, draft: &VersionDraft) -> AppResult<FileVersion>;

    /// Find a version by (file, number).
    async fn find_version(&self, file: FileId, version_number: i32)
    -> AppResult<Option<FileVersion>>;

    /// Find a version by id.
    async fn find_version_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>>;

    /// Point `file` at `version`. The version must belong to the file.
    async fn set_current_version(&self, file: FileId, version: FileVersionId) -> AppResult<()>;

    /// Page through versions of `file`, newest number first.
    async fn list_versions(
        &self,
        file: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileVersion>>;

    /// Every version of `file`, newest number first.
    async fn versions_of(&self, file: FileId) -> AppResult<Vec<FileVersion>>;

    /// Remove every version row of `file` and clear its pointer.
    /// Returns the number of rows removed.
    async fn delete_all_versions(&self, file: FileId) -> AppResult<u64>;

    /// Mark `file` deleted.
    async fn soft_delete_file(&self, file: FileId) -> AppResult<()>;

    /// Page through the live files of `project`, newest first.
    async fn list_project_files(
        &self,
        project: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileListing>>;
}

/// Read-only view of project membership facts.
#[async_trait]
pub trait MembershipOracle: Send + Sync + std::fmt::Debug + 'static {
    /// Tier `user` holds in `project`, or `None` for non-members.
    async fn role_of(&self, project: ProjectId, user: UserId) -> AppResult<Option<ProjectRole>>;
}
