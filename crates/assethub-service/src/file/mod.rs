//! File services: upload handshake, retrieval, version lifecycle, deletion.

pub mod download;
pub mod service;
pub mod upload;
pub mod version;

pub use download::{DownloadLink, DownloadService, FileContent, VersionSelector};
pub use service::{FileDeletion, FileService};
pub use upload::{PreUploadRequest, PreUploadResponse, UploadService, UploadThroughRequest};
pub use version::VersionService;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::FileId;
use assethub_database::VersionCatalog;
use assethub_entity::file::LogicalFile;

/// Load a live file or fail with `NotFound`.
pub(crate) async fn load_file(catalog: &dyn VersionCatalog, id: FileId) -> AppResult<LogicalFile> {
    if !id.is_positive() {
        return Err(AppError::validation(format!("Invalid file id {id}")));
    }
    catalog
        .find_file(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
}
