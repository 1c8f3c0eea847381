//! File-level operations: project listing and cascading deletion.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use assethub_auth::AccessGuard;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::{FileId, PageRequest, PageResponse, ProjectId};
use assethub_database::{FileListing, VersionCatalog};
use assethub_storage::StorageManager;

use super::load_file;
use crate::context::RequestContext;

/// Outcome of a file deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDeletion {
    /// The deleted file.
    pub file_id: FileId,
    /// Version rows removed from the catalog.
    pub versions_removed: u64,
    /// Storage objects whose deletion was attempted.
    pub objects_attempted: usize,
    /// Storage deletions that failed and were skipped.
    pub objects_failed: usize,
}

/// Lists and deletes logical files.
#[derive(Debug, Clone)]
pub struct FileService {
    catalog: Arc<dyn VersionCatalog>,
    guard: AccessGuard,
    storage: Arc<StorageManager>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        catalog: Arc<dyn VersionCatalog>,
        guard: AccessGuard,
        storage: Arc<StorageManager>,
    ) -> Self {
        Self {
            catalog,
            guard,
            storage,
        }
    }

    /// Lists live files of a project, each with the version reads resolve to.
    pub async fn list_project_files(
        &self,
        ctx: &RequestContext,
        project: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileListing>> {
        if project.get() < 0 {
            return Err(AppError::validation(format!("Invalid project id {project}")));
        }
        self.guard.require_member(&ctx.principal, project).await?;
        self.catalog
            .list_project_files(project, &page.normalized())
            .await
    }

    /// Deletes a file: storage objects first (best effort), then every
    /// version row, then the file row itself.
    ///
    /// Only owners and admins of the project may delete.
    pub async fn delete(&self, ctx: &RequestContext, file_id: FileId) -> AppResult<FileDeletion> {
        let file = load_file(self.catalog.as_ref(), file_id).await?;
        self.guard
            .require_owner_or_admin(&ctx.principal, file.project_id)
            .await?;

        let versions = self.catalog.versions_of(file.id).await?;
        let store = self.storage.store();
        let mut attempted = 0;
        let mut failed = 0;
        for version in versions.iter().filter(|v| !v.storage_key.is_empty()) {
            attempted += 1;
            let result = match &store {
                Ok(store) => store.delete(&version.storage_key).await,
                Err(e) => Err(e.clone()),
            };
            if let Err(e) = result {
                failed += 1;
                warn!(
                    file_id = %file.id,
                    version_id = %version.id,
                    key = %version.storage_key,
                    error = %e,
                    "Failed to delete storage object; continuing"
                );
            }
        }

        let removed = self.catalog.delete_all_versions(file.id).await?;
        self.catalog.soft_delete_file(file.id).await?;

        info!(
            principal = %ctx.principal,
            file_id = %file.id,
            name = %file.name,
            versions_removed = removed,
            objects_failed = failed,
            "File deleted"
        );
        Ok(FileDeletion {
            file_id: file.id,
            versions_removed: removed,
            objects_attempted: attempted,
            objects_failed: failed,
        })
    }
}
