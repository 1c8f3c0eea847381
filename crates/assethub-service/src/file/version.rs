//! Version lifecycle: rollback and history listing.

use std::sync::Arc;

use tracing::info;

use assethub_auth::AccessGuard;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::{FileId, PageRequest, PageResponse};
use assethub_database::VersionCatalog;
use assethub_entity::file::FileVersion;
use assethub_entity::project::ProjectRole;

use super::load_file;
use crate::context::RequestContext;

/// Moves the current-version pointer and lists history.
#[derive(Debug, Clone)]
pub struct VersionService {
    catalog: Arc<dyn VersionCatalog>,
    guard: AccessGuard,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(catalog: Arc<dyn VersionCatalog>, guard: AccessGuard) -> Self {
        Self { catalog, guard }
    }

    /// Points the file at an earlier (or any other) version.
    ///
    /// Viewers may not roll back. Targeting the version that is already
    /// current is a conflict, and no new version is ever created.
    pub async fn rollback(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        version_number: i32,
    ) -> AppResult<FileVersion> {
        if version_number <= 0 {
            return Err(AppError::validation(format!(
                "Invalid version number {version_number}"
            )));
        }
        let file = load_file(self.catalog.as_ref(), file_id).await?;
        self.guard
            .require_role_at_least(&ctx.principal, file.project_id, ProjectRole::Developer)
            .await?;

        let target = self
            .catalog
            .find_version(file.id, version_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {version_number} of file {file_id} not found"
                ))
            })?;

        if file.current_version_id == Some(target.id) {
            return Err(AppError::conflict(format!(
                "Version {version_number} is already the current version"
            )));
        }

        self.catalog.set_current_version(file.id, target.id).await?;
        info!(
            principal = %ctx.principal,
            file_id = %file.id,
            from = ?file.current_version_id,
            to = %target.id,
            version_number,
            "Rolled back file"
        );
        Ok(target)
    }

    /// Pages through a file's versions, newest number first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileVersion>> {
        let file = load_file(self.catalog.as_ref(), file_id).await?;
        self.guard
            .require_member(&ctx.principal, file.project_id)
            .await?;
        self.catalog.list_versions(file.id, &page.normalized()).await
    }
}
