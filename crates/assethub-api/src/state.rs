//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use assethub_auth::{AccessGuard, JwtDecoder};
use assethub_core::config::AppConfig;
use assethub_database::{DatabasePool, MembershipOracle, VersionCatalog};
use assethub_service::{DownloadService, FileService, UploadService, VersionService};
use assethub_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool; `None` when the catalog is held in memory
    pub db_pool: Option<DatabasePool>,
    /// Object store manager
    pub storage_manager: Arc<StorageManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Pre-upload handshake and upload-through
    pub upload_service: Arc<UploadService>,
    /// Signed downloads and the content proxy
    pub download_service: Arc<DownloadService>,
    /// Rollback and version history
    pub version_service: Arc<VersionService>,
    /// Project listing and deletion
    pub file_service: Arc<FileService>,
}

impl AppState {
    /// Wires every service over one catalog, one membership oracle and one
    /// storage manager.
    pub fn new(
        config: AppConfig,
        catalog: Arc<dyn VersionCatalog>,
        members: Arc<dyn MembershipOracle>,
        storage_manager: StorageManager,
        db_pool: Option<DatabasePool>,
    ) -> Self {
        let storage_manager = Arc::new(storage_manager);
        let guard = AccessGuard::new(members);

        let upload_service = UploadService::new(
            catalog.clone(),
            guard.clone(),
            storage_manager.clone(),
            config.storage.clone(),
        );
        let download_service = DownloadService::new(
            catalog.clone(),
            guard.clone(),
            storage_manager.clone(),
            config.storage.clone(),
        );
        let version_service = VersionService::new(catalog.clone(), guard.clone());
        let file_service = FileService::new(catalog, guard, storage_manager.clone());

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            db_pool,
            storage_manager,
            upload_service: Arc::new(upload_service),
            download_service: Arc::new(download_service),
            version_service: Arc::new(version_service),
            file_service: Arc::new(file_service),
        }
    }
}
