//! Retrieval: signed download links and the streaming content proxy.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use assethub_auth::AccessGuard;
use assethub_core::config::storage::StorageConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::ByteStream;
use assethub_core::types::{FileId, FileVersionId};
use assethub_database::VersionCatalog;
use assethub_entity::file::{FileVersion, LogicalFile, content_type_for_format};
use assethub_storage::{RelayStream, StorageManager};

use super::load_file;
use crate::context::RequestContext;

/// Which version a read addresses. Empty means the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionSelector {
    /// Explicit version id.
    pub version_id: Option<FileVersionId>,
    /// Explicit version number.
    pub version_number: Option<i32>,
}

impl VersionSelector {
    /// The file's current version.
    pub fn current() -> Self {
        Self::default()
    }
}

/// A signed, time-limited download URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    /// Signed GET URL.
    pub url: String,
    /// When the URL stops working.
    pub expires_at: DateTime<Utc>,
    /// Version the URL points at.
    pub version_id: FileVersionId,
    /// Its number.
    pub version_number: i32,
}

/// An open relay of object bytes for the content proxy.
pub struct FileContent {
    /// Object bytes; releases the backend handle when dropped.
    pub stream: RelayStream<ByteStream>,
    /// Content type derived from the file format.
    pub content_type: String,
    /// Cache directive for the response.
    pub cache_control: String,
    /// Length reported by the backend.
    pub content_length: Option<u64>,
    /// Display name of the file.
    pub file_name: String,
}

impl std::fmt::Debug for FileContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContent")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Serves both read paths.
#[derive(Debug, Clone)]
pub struct DownloadService {
    catalog: Arc<dyn VersionCatalog>,
    guard: AccessGuard,
    storage: Arc<StorageManager>,
    config: StorageConfig,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        catalog: Arc<dyn VersionCatalog>,
        guard: AccessGuard,
        storage: Arc<StorageManager>,
        config: StorageConfig,
    ) -> Self {
        Self {
            catalog,
            guard,
            storage,
            config,
        }
    }

    /// Signs a GET URL for the selected version.
    ///
    /// The object is not checked for existence before signing.
    pub async fn download_url(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        selector: VersionSelector,
    ) -> AppResult<DownloadLink> {
        let (file, version) = self.authorize(ctx, file_id, selector).await?;
        let store = self.storage.store()?;

        let ttl = Duration::from_secs(self.config.expire_seconds);
        let signed = store.presign_get(&version.storage_key, ttl).await?;

        info!(
            principal = %ctx.principal,
            file_id = %file.id,
            version_id = %version.id,
            expires_at = %signed.expires_at,
            "Issued download URL"
        );
        Ok(DownloadLink {
            url: signed.url,
            expires_at: signed.expires_at,
            version_id: version.id,
            version_number: version.version_number,
        })
    }

    /// Opens a streaming read of the selected version.
    ///
    /// A missing backend object surfaces as `NotFound`.
    pub async fn open_content(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        selector: VersionSelector,
    ) -> AppResult<FileContent> {
        let (file, version) = self.authorize(ctx, file_id, selector).await?;
        let store = self.storage.store()?;

        let body = store.get(&version.storage_key).await?;
        let content_type = content_type_for_format(&file.format).to_string();

        info!(
            principal = %ctx.principal,
            file_id = %file.id,
            version_id = %version.id,
            %content_type,
            "Serving file content"
        );
        Ok(FileContent {
            stream: RelayStream::new(body.stream, version.storage_key),
            content_type,
            cache_control: self.config.proxy_cache_control.clone(),
            content_length: body.content_length,
            file_name: file.name,
        })
    }

    async fn authorize(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        selector: VersionSelector,
    ) -> AppResult<(LogicalFile, FileVersion)> {
        let file = load_file(self.catalog.as_ref(), file_id).await?;
        self.guard
            .require_member(&ctx.principal, file.project_id)
            .await?;
        let version = resolve_version(self.catalog.as_ref(), &file, selector).await?;
        Ok((file, version))
    }
}

/// Resolve `selector` against `file`. A version of another file is `NotFound`.
async fn resolve_version(
    catalog: &dyn VersionCatalog,
    file: &LogicalFile,
    selector: VersionSelector,
) -> AppResult<FileVersion> {
    let version = match (selector.version_id, selector.version_number) {
        (Some(id), number) => {
            let version = catalog
                .find_version_by_id(id)
                .await?
                .filter(|v| v.file_id == file.id)
                .ok_or_else(|| AppError::not_found(format!("Version {id} of file {} not found", file.id)))?;
            if number.is_some_and(|n| n != version.version_number) {
                return Err(AppError::validation(
                    "versionId and versionNumber refer to different versions",
                ));
            }
            version
        }
        (None, Some(number)) => catalog.find_version(file.id, number).await?.ok_or_else(|| {
            AppError::not_found(format!("Version {number} of file {} not found", file.id))
        })?,
        (None, None) => {
            let current = file.current_version_id.ok_or_else(|| {
                AppError::not_found(format!("File {} has no current version", file.id))
            })?;
            catalog
                .find_version_by_id(current)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Version {current} not found")))?
        }
    };
    Ok(version)
}
