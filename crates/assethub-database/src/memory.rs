//! In-memory catalog and membership oracle using a Tokio mutex.
//!
//! Suitable for single-node development and tests. Every operation holds
//! the state lock for its whole duration, which gives the same atomicity
//! as the PostgreSQL transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::{FileId, FileVersionId, PageRequest, PageResponse, ProjectId, UserId};
use assethub_entity::file::{FileVersion, LogicalFile, NewLogicalFile, VersionDraft};
use assethub_entity::project::ProjectRole;

use crate::catalog::{FileListing, MembershipOracle, VersionCatalog};

#[derive(Debug, Default)]
struct CatalogState {
    last_file_id: i64,
    last_version_id: i64,
    files: BTreeMap<FileId, LogicalFile>,
    versions: BTreeMap<FileVersionId, FileVersion>,
}

impl CatalogState {
    fn live_file(&self, id: FileId) -> Option<&LogicalFile> {
        self.files.get(&id).filter(|f| !f.is_deleted())
    }

    fn live_file_by_name(&self, project: ProjectId, name: &str) -> Option<&LogicalFile> {
        self.files
            .values()
            .find(|f| f.project_id == project && f.name == name && !f.is_deleted())
    }

    /// Versions of `file`, newest number first.
    fn versions_desc(&self, file: FileId) -> Vec<FileVersion> {
        let mut versions: Vec<FileVersion> = self
            .versions
            .values()
            .filter(|v| v.file_id == file)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        versions
    }

    fn max_version_number(&self, file: FileId) -> i32 {
        self.versions
            .values()
            .filter(|v| v.file_id == file)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
    }

    fn insert(
        &mut self,
        file: FileId,
        version_number: i32,
        size_bytes: i64,
        hash: &str,
        storage_key: String,
        created_by: UserId,
    ) -> AppResult<FileVersion> {
        if self
            .versions
            .values()
            .any(|v| v.file_id == file && v.version_number == version_number)
        {
            return Err(AppError::conflict(format!(
                "Version {version_number} of file {file} already exists"
            )));
        }
        self.last_version_id += 1;
        let version = FileVersion {
            id: FileVersionId::new(self.last_version_id),
            file_id: file,
            version_number,
            size_bytes,
            hash: hash.to_string(),
            storage_key,
            created_by,
            created_at: Utc::now(),
        };
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }
}

/// In-memory [`VersionCatalog`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a file including soft-deleted ones.
    pub async fn find_file_any(&self, id: FileId) -> Option<LogicalFile> {
        self.state.lock().await.files.get(&id).cloned()
    }

    /// Number of version rows stored for `file`.
    pub async fn version_count(&self, file: FileId) -> usize {
        let state = self.state.lock().await;
        state.versions.values().filter(|v| v.file_id == file).count()
    }
}

#[async_trait]
impl VersionCatalog for MemoryCatalog {
    async fn find_file(&self, id: FileId) -> AppResult<Option<LogicalFile>> {
        Ok(self.state.lock().await.live_file(id).cloned())
    }

    async fn find_file_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> AppResult<Option<LogicalFile>> {
        Ok(self
            .state
            .lock()
            .await
            .live_file_by_name(project, name)
            .cloned())
    }

    async fn create_file(&self, data: &NewLogicalFile) -> AppResult<LogicalFile> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.live_file_by_name(data.project_id, &data.name) {
            return Ok(existing.clone());
        }

        state.last_file_id += 1;
        let now = Utc::now();
        let file = LogicalFile {
            id: FileId::new(state.last_file_id),
            project_id: data.project_id,
            name: data.name.clone(),
            category: data.category,
            format: data.format.clone(),
            current_version_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.files.insert(file.id, file.clone());
        info!(file_id = %file.id, project_id = %file.project_id, name = %file.name, "File created");
        Ok(file)
    }

    async fn max_version_number(&self, file: FileId) -> AppResult<i32> {
        Ok(self.state.lock().await.max_version_number(file))
    }

    async fn insert_version(
        &self,
        file: FileId,
        version_number: i32,
        size_bytes: i64,
        hash: &str,
        storage_key: &str,
        created_by: UserId,
    ) -> AppResult<FileVersion> {
        let mut state = self.state.lock().await;
        if !state.files.contains_key(&file) {
            return Err(AppError::not_found(format!("File {file} not found")));
        }
        state.insert(
            file,
            version_number,
            size_bytes,
            hash,
            storage_key.to_string(),
            created_by,
        )
    }

    async fn append_version(&self, draft: &VersionDraft) -> AppResult<FileVersion> {
        let file = draft.file_id();
        let mut state = self.state.lock().await;
        if state.live_file(file).is_none() {
            return Err(AppError::not_found(format!("File {file} not found")));
        }

        let version_number = state.max_version_number(file) + 1;
        let version = state.insert(
            file,
            version_number,
            draft.size_bytes,
            &draft.address.hash,
            draft.address.storage_key(version_number),
            draft.created_by(),
        )?;

        if let Some(row) = state.files.get_mut(&file) {
            row.current_version_id = Some(version.id);
            row.updated_at = Utc::now();
        }
        info!(
            file_id = %file,
            version_id = %version.id,
            version_number,
            storage_key = %version.storage_key,
            "Version appended"
        );
        Ok(version)
    }

    async fn find_version(
        &self,
        file: FileId,
        version_number: i32,
    ) -> AppResult<Option<FileVersion>> {
        let state = self.state.lock().await;
        Ok(state
            .versions
            .values()
            .find(|v| v.file_id == file && v.version_number == version_number)
            .cloned())
    }

    async fn find_version_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>> {
        Ok(self.state.lock().await.versions.get(&id).cloned())
    }

    async fn set_current_version(&self, file: FileId, version: FileVersionId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.live_file(file).is_none() {
            return Err(AppError::not_found(format!("File {file} not found")));
        }
        let belongs = state
            .versions
            .get(&version)
            .is_some_and(|v| v.file_id == file);
        if !belongs {
            return Err(AppError::not_found(format!(
                "Version {version} does not belong to file {file}"
            )));
        }
        if let Some(row) = state.files.get_mut(&file) {
            row.current_version_id = Some(version);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_versions(
        &self,
        file: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileVersion>> {
        let (limit, offset) = page.window();
        let all = self.state.lock().await.versions_desc(file);
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn versions_of(&self, file: FileId) -> AppResult<Vec<FileVersion>> {
        Ok(self.state.lock().await.versions_desc(file))
    }

    async fn delete_all_versions(&self, file: FileId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        if let Some(row) = state.files.get_mut(&file) {
            row.current_version_id = None;
            row.updated_at = Utc::now();
        }
        let before = state.versions.len();
        state.versions.retain(|_, v| v.file_id != file);
        Ok((before - state.versions.len()) as u64)
    }

    async fn soft_delete_file(&self, file: FileId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        match state.files.get_mut(&file) {
            Some(row) if !row.is_deleted() => {
                let now = Utc::now();
                row.deleted_at = Some(now);
                row.updated_at = now;
                Ok(())
            }
            _ => Err(AppError::not_found(format!("File {file} not found"))),
        }
    }

    async fn list_project_files(
        &self,
        project: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileListing>> {
        let (limit, offset) = page.window();
        let state = self.state.lock().await;
        let mut files: Vec<&LogicalFile> = state
            .files
            .values()
            .filter(|f| f.project_id == project && !f.is_deleted())
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = files.len() as u64;

        let items = files
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|file| {
                let version = file
                    .current_version_id
                    .and_then(|id| state.versions.get(&id).cloned())
                    .or_else(|| state.versions_desc(file.id).into_iter().next());
                FileListing {
                    file: file.clone(),
                    version,
                }
            })
            .collect();

        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

/// In-memory [`MembershipOracle`] seeded by the caller.
#[derive(Debug, Clone, Default)]
pub struct MemoryMembership {
    roles: Arc<Mutex<HashMap<(ProjectId, UserId), ProjectRole>>>,
}

impl MemoryMembership {
    /// Creates an oracle with no memberships.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` to `user` in `project`, replacing any previous tier.
    pub async fn grant(&self, project: ProjectId, user: UserId, role: ProjectRole) {
        self.roles.lock().await.insert((project, user), role);
    }
}

#[async_trait]
impl MembershipOracle for MemoryMembership {
    async fn role_of(&self, project: ProjectId, user: UserId) -> AppResult<Option<ProjectRole>> {
        Ok(self.roles.lock().await.get(&(project, user)).copied())
    }
}
