//! PostgreSQL version catalog.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::types::{FileId, FileVersionId, PageRequest, PageResponse, ProjectId, UserId};
use assethub_entity::file::{FileVersion, LogicalFile, NewLogicalFile, VersionDraft};

use crate::catalog::{FileListing, VersionCatalog};

const LIVE_NAME_KEY: &str = "files_project_name_live_key";
const VERSION_NUMBER_KEY: &str = "file_versions_file_id_version_number_key";

/// Repository for logical files and their versions.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest version of a file regardless of the current pointer.
    async fn latest_version(&self, file: FileId) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(file)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find latest version", e))
    }

    async fn acquire(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })
    }
}

/// `MAX(version_number)` of `file`, 0 when it has none.
///
/// Inside [`VersionCatalog::append_version`] this runs after the file row
/// is locked, so the value stays valid until commit.
async fn max_version_number(conn: &mut PgConnection, file: FileId) -> AppResult<i32> {
    sqlx::query_scalar(
        "SELECT COALESCE(MAX(version_number), 0) FROM file_versions WHERE file_id = $1",
    )
    .bind(file)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read version number", e))
}

async fn insert_version_row(
    conn: &mut PgConnection,
    file: FileId,
    version_number: i32,
    size_bytes: i64,
    hash: &str,
    storage_key: &str,
    created_by: UserId,
) -> AppResult<FileVersion> {
    sqlx::query_as::<_, FileVersion>(
        "INSERT INTO file_versions (file_id, version_number, size_bytes, hash, storage_key, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(file)
    .bind(version_number)
    .bind(size_bytes)
    .bind(hash)
    .bind(storage_key)
    .bind(created_by)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(VERSION_NUMBER_KEY) => {
            AppError::conflict(format!("Version {version_number} of file {file} already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to insert version", e),
    })
}

#[async_trait]
impl VersionCatalog for FileRepository {
    async fn find_file(&self, id: FileId) -> AppResult<Option<LogicalFile>> {
        sqlx::query_as::<_, LogicalFile>("SELECT * FROM files WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_file_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> AppResult<Option<LogicalFile>> {
        sqlx::query_as::<_, LogicalFile>(
            "SELECT * FROM files WHERE project_id = $1 AND name = $2 AND deleted_at IS NULL",
        )
        .bind(project)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by name", e))
    }

    async fn create_file(&self, data: &NewLogicalFile) -> AppResult<LogicalFile> {
        let inserted = sqlx::query_as::<_, LogicalFile>(
            "INSERT INTO files (project_id, name, category, format) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.project_id)
        .bind(&data.name)
        .bind(data.category)
        .bind(&data.format)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(file) => {
                info!(file_id = %file.id, project_id = %file.project_id, name = %file.name, "File created");
                Ok(file)
            }
            Err(sqlx::Error::Database(ref db_err)) if db_err.constraint() == Some(LIVE_NAME_KEY) => {
                debug!(project_id = %data.project_id, name = %data.name, "Lost file creation race, re-fetching");
                self.find_file_by_name(data.project_id, &data.name)
                    .await?
                    .ok_or_else(|| {
                        AppError::conflict(format!(
                            "File '{}' was created and removed concurrently",
                            data.name
                        ))
                    })
            }
            Err(e) => Err(AppError::with_source(ErrorKind::Database, "Failed to create file", e)),
        }
    }

    async fn max_version_number(&self, file: FileId) -> AppResult<i32> {
        let mut conn = self.acquire().await?;
        max_version_number(&mut conn, file).await
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
        let mut conn = self.acquire().await?;
        insert_version_row(
            &mut conn,
            file,
            version_number,
            size_bytes,
            hash,
            storage_key,
            created_by,
        )
        .await
    }

    async fn append_version(&self, draft: &VersionDraft) -> AppResult<FileVersion> {
        let file = draft.file_id();
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin version transaction", e)
        })?;

        // Serializes concurrent appends to the same file.
        let locked: Option<FileId> = sqlx::query_scalar(
            "SELECT id FROM files WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(file)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock file", e))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("File {file} not found")));
        }

        let version_number = max_version_number(&mut tx, file).await? + 1;
        let storage_key = draft.address.storage_key(version_number);
        let version = insert_version_row(
            &mut tx,
            file,
            version_number,
            draft.size_bytes,
            &draft.address.hash,
            &storage_key,
            draft.created_by(),
        )
        .await?;

        sqlx::query("UPDATE files SET current_version_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(file)
            .bind(version.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to promote version", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version transaction", e)
        })?;

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
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn find_version_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>("SELECT * FROM file_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn set_current_version(&self, file: FileId, version: FileVersionId) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin pointer transaction", e)
        })?;

        let locked: Option<FileId> = sqlx::query_scalar(
            "SELECT id FROM files WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(file)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock file", e))?;
        if locked.is_none() {
            return Err(AppError::not_found(format!("File {file} not found")));
        }

        let result = sqlx::query(
            "UPDATE files SET current_version_id = $2, updated_at = NOW() \
             WHERE id = $1 AND EXISTS (SELECT 1 FROM file_versions WHERE id = $2 AND file_id = $1)",
        )
        .bind(file)
        .bind(version)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move pointer", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Version {version} does not belong to file {file}"
            )));
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit pointer move", e)
        })
    }

    async fn list_versions(
        &self,
        file: FileId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileVersion>> {
        let (limit, offset) = page.sql_bounds()?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_versions WHERE file_id = $1")
            .bind(file)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count versions", e)
            })?;

        let versions = sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 \
             ORDER BY version_number DESC LIMIT $2 OFFSET $3",
        )
        .bind(file)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))?;

        Ok(PageResponse::new(
            versions,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn versions_of(&self, file: FileId) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn delete_all_versions(&self, file: FileId) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin delete transaction", e)
        })?;

        sqlx::query("UPDATE files SET current_version_id = NULL, updated_at = NOW() WHERE id = $1")
            .bind(file)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear pointer", e))?;

        let removed = sqlx::query("DELETE FROM file_versions WHERE file_id = $1")
            .bind(file)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete versions", e))?
            .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version deletion", e)
        })?;
        Ok(removed)
    }

    async fn soft_delete_file(&self, file: FileId) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE files SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(file)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {file} not found")));
        }
        Ok(())
    }

    async fn list_project_files(
        &self,
        project: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileListing>> {
        let (limit, offset) = page.sql_bounds()?;
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE project_id = $1 AND deleted_at IS NULL",
        )
        .bind(project)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;

        let files = sqlx::query_as::<_, LogicalFile>(
            "SELECT * FROM files WHERE project_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(project)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))?;

        let mut items = Vec::with_capacity(files.len());
        for file in files {
            let current = match file.current_version_id {
                Some(id) => self.find_version_by_id(id).await?,
                None => None,
            };
            let version = match current {
                Some(v) => Some(v),
                None => self.latest_version(file.id).await?,
            };
            items.push(FileListing { file, version });
        }

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }
}
