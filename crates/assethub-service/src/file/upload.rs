//! Upload handshake: validate, resolve the logical file, allocate a version,
//! and hand back a signed PUT URL. Also the upload-through variant where the
//! gateway relays the bytes itself.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use assethub_auth::AccessGuard;
use assethub_core::config::storage::StorageConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::{FileId, FileVersionId, ProjectId};
use assethub_database::VersionCatalog;
use assethub_entity::file::{
    ContentAddress, FileCategory, LogicalFile, NewLogicalFile, VersionDraft,
    content_type_for_format, format_from_name, guess_category,
};
use assethub_storage::StorageManager;

use crate::context::RequestContext;

/// Column widths of the catalog, in characters.
const MAX_NAME_CHARS: usize = 255;
const MAX_FORMAT_CHARS: usize = 32;
const MAX_HASH_CHARS: usize = 128;

/// Upload intent as declared by the client.
#[derive(Debug, Clone, Default)]
pub struct PreUploadRequest {
    /// Owning project; 0 means "no project" and is reserved to privileged callers.
    pub project_id: ProjectId,
    /// Logical file name, unique among live files of the project.
    pub name: String,
    /// Coarse kind, one of the [`FileCategory`] names.
    pub category: String,
    /// Format token, usually the extension.
    pub format: String,
    /// Declared size in bytes.
    pub size_bytes: i64,
    /// Client-supplied digest. Recorded, never verified.
    pub hash: String,
    /// Explicit content type chosen by the caller.
    pub content_type: Option<String>,
    /// Content type carried by the uploaded part itself, if any.
    pub declared_content_type: Option<String>,
}

/// What the client needs to perform the PUT.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreUploadResponse {
    /// Signed PUT URL.
    pub upload_url: String,
    /// Logical file the version belongs to.
    pub file_id: FileId,
    /// The new version.
    pub version_id: FileVersionId,
    /// Its number within the file.
    pub version_number: i32,
    /// Content type the PUT must carry.
    pub content_type: String,
    /// When the upload URL stops working.
    pub expires_at: DateTime<Utc>,
}

/// Bytes received by the gateway plus optional metadata overrides.
#[derive(Debug, Clone, Default)]
pub struct UploadThroughRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Name override; defaults to the part's file name.
    pub name: Option<String>,
    /// Category override; guessed from the format when absent.
    pub category: Option<String>,
    /// Format override; taken from the name's extension when absent.
    pub format: Option<String>,
    /// Caller-chosen content type.
    pub content_type: Option<String>,
    /// File name attached to the uploaded part.
    pub part_file_name: Option<String>,
    /// Content type attached to the uploaded part.
    pub part_content_type: Option<String>,
    /// The payload.
    pub data: Bytes,
}

/// Coordinates the upload handshake.
#[derive(Debug, Clone)]
pub struct UploadService {
    catalog: Arc<dyn VersionCatalog>,
    guard: AccessGuard,
    storage: Arc<StorageManager>,
    config: StorageConfig,
}

impl UploadService {
    /// Creates a new upload service.
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

    /// Runs the pre-upload handshake.
    ///
    /// The version row is created and made current before any byte reaches
    /// storage. Catalog writes are not undone if signing fails afterwards.
    pub async fn pre_upload(
        &self,
        ctx: &RequestContext,
        req: PreUploadRequest,
    ) -> AppResult<PreUploadResponse> {
        let category = validate(ctx, &req)?;

        self.guard
            .require_member(&ctx.principal, req.project_id)
            .await?;
        let store = self.storage.store()?;

        let file = self.resolve_file(&req, category).await?;
        let version = self
            .catalog
            .append_version(&VersionDraft {
                size_bytes: req.size_bytes,
                address: ContentAddress {
                    owner: req.project_id,
                    actor: ctx.user_id(),
                    file_id: file.id,
                    hash: req.hash.trim().to_string(),
                    file_name: req.name.trim().to_string(),
                },
            })
            .await?;

        let content_type = resolve_content_type(
            req.content_type.as_deref(),
            req.declared_content_type.as_deref(),
            &req.format,
        );
        let signed = store
            .presign_put(&version.storage_key, &content_type, self.url_ttl())
            .await?;
        debug!(key = %version.storage_key, %content_type, "Signed upload URL");

        info!(
            principal = %ctx.principal,
            project_id = %req.project_id,
            file_id = %file.id,
            version_id = %version.id,
            version_number = version.version_number,
            storage_key = %version.storage_key,
            "Version created"
        );

        Ok(PreUploadResponse {
            upload_url: signed.url,
            file_id: file.id,
            version_id: version.id,
            version_number: version.version_number,
            content_type,
            expires_at: signed.expires_at,
        })
    }

    /// Receives the bytes, hashes them, runs the handshake, and PUTs them to
    /// the signed URL on the caller's behalf.
    pub async fn upload_through(
        &self,
        ctx: &RequestContext,
        req: UploadThroughRequest,
    ) -> AppResult<PreUploadResponse> {
        let size = req.data.len() as u64;
        if size > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let name = non_blank(req.name.as_deref())
            .or_else(|| non_blank(req.part_file_name.as_deref()))
            .ok_or_else(|| AppError::validation("name is required"))?
            .to_string();
        let format = non_blank(req.format.as_deref())
            .map(str::to_lowercase)
            .unwrap_or_else(|| format_from_name(&name));
        if format.is_empty() {
            return Err(AppError::validation("fileFormat is required"));
        }
        let category = non_blank(req.category.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| guess_category(&format).as_str().to_string());

        let hash = format!("{:x}", Sha256::digest(&req.data));
        let size_bytes = i64::try_from(size)
            .map_err(|_| AppError::validation("File size does not fit the catalog"))?;

        let response = self
            .pre_upload(
                ctx,
                PreUploadRequest {
                    project_id: req.project_id,
                    name,
                    category,
                    format,
                    size_bytes,
                    hash,
                    content_type: req.content_type,
                    declared_content_type: req.part_content_type,
                },
            )
            .await?;

        let store = self.storage.store()?;
        let written = store
            .put_signed(&response.upload_url, &response.content_type, req.data)
            .await?;
        info!(
            file_id = %response.file_id,
            version_number = response.version_number,
            bytes = written,
            "Relayed upload to storage"
        );

        Ok(response)
    }

    async fn resolve_file(
        &self,
        req: &PreUploadRequest,
        category: FileCategory,
    ) -> AppResult<LogicalFile> {
        let name = req.name.trim();
        if let Some(file) = self.catalog.find_file_by_name(req.project_id, name).await? {
            return Ok(file);
        }
        let file = self
            .catalog
            .create_file(&NewLogicalFile {
                project_id: req.project_id,
                name: name.to_string(),
                category,
                format: req.format.trim().to_lowercase(),
            })
            .await?;
        info!(project_id = %req.project_id, file_id = %file.id, name, "Logical file created");
        Ok(file)
    }

    fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.config.expire_seconds)
    }
}

/// Reject blank fields and out-of-range scopes before any I/O.
fn validate(ctx: &RequestContext, req: &PreUploadRequest) -> AppResult<FileCategory> {
    for (field, value) in [
        ("name", &req.name),
        ("fileCategory", &req.category),
        ("fileFormat", &req.format),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} is required")));
        }
    }
    for (field, value, max) in [
        ("name", &req.name, MAX_NAME_CHARS),
        ("fileFormat", &req.format, MAX_FORMAT_CHARS),
        ("hash", &req.hash, MAX_HASH_CHARS),
    ] {
        if value.trim().chars().count() > max {
            return Err(AppError::validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    if req.size_bytes < 0 {
        return Err(AppError::validation("sizeBytes must not be negative"));
    }

    let project = req.project_id.get();
    if project < 0 || (!ctx.is_privileged() && project == 0) {
        return Err(AppError::validation(format!("Invalid project id {project}")));
    }

    req.category.parse()
}

/// Caller override, then the declared type, then inference from the format.
fn resolve_content_type(explicit: Option<&str>, declared: Option<&str>, format: &str) -> String {
    non_blank(explicit)
        .or_else(|| non_blank(declared))
        .map(str::to_string)
        .unwrap_or_else(|| content_type_for_format(format).to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
