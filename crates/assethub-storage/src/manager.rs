//! Storage manager: builds the configured object store and hands it out.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use assethub_core::config::storage::StorageConfig;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::traits::storage::ObjectStore;

use crate::providers::memory::MemoryObjectStore;
use crate::providers::oss::OssObjectStore;
use crate::signer::RequestSigner;

/// Time allowed to open a connection to the OSS backend.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest pause between two reads from the OSS backend. Proxied bodies
/// carry no total deadline.
const READ_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// Longest signed URL lifetime accepted from configuration (seven days).
pub const MAX_EXPIRE_SECONDS: u64 = 7 * 24 * 3600;

/// Holds the single object store the gateway talks to, if one is configured.
///
/// An incomplete storage section is not a startup failure: the manager is
/// created empty and every storage-dependent call reports a configuration
/// error instead.
#[derive(Debug, Clone)]
pub struct StorageManager {
    store: Option<Arc<dyn ObjectStore>>,
}

impl StorageManager {
    /// Build the provider named by `config.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        if config.expire_seconds == 0 || config.expire_seconds > MAX_EXPIRE_SECONDS {
            return Err(AppError::configuration(format!(
                "storage.expire_seconds must be between 1 and {MAX_EXPIRE_SECONDS}, got {}",
                config.expire_seconds
            )));
        }

        if !config.is_configured() {
            warn!(
                provider = %config.provider,
                "Object storage settings are incomplete; storage operations will be rejected"
            );
            return Ok(Self::unconfigured());
        }

        let store: Arc<dyn ObjectStore> = match config.provider.as_str() {
            "memory" => {
                info!("Using in-memory object store");
                Arc::new(MemoryObjectStore::new())
            }
            "oss" => {
                let signer = RequestSigner::from_config(config)?;
                let client = backend_client(CONNECT_TIMEOUT, READ_IDLE_TIMEOUT)?;
                Arc::new(OssObjectStore::new(signer, client))
            }
            #[cfg(feature = "s3")]
            "s3" => Arc::new(crate::providers::s3::S3ObjectStore::new(config).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider '{other}'"
                )));
            }
        };

        Ok(Self::with_store(store))
    }

    /// Wrap an already-built store.
    pub fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A manager with no backend.
    pub fn unconfigured() -> Self {
        Self { store: None }
    }

    /// The active store, or a configuration error if none is set up.
    pub fn store(&self) -> AppResult<Arc<dyn ObjectStore>> {
        self.store
            .clone()
            .ok_or_else(|| AppError::configuration("Object storage is not configured"))
    }

    /// Whether a backend is available.
    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Provider name of the active store.
    pub fn provider_type(&self) -> Option<&str> {
        self.store.as_deref().map(|store| store.provider_type())
    }
}

/// HTTP client for the OSS backend: bounded connect and idle reads, no
/// overall deadline.
fn backend_client(connect: Duration, idle: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect)
        .read_timeout(idle)
        .build()
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to build storage HTTP client", e)
        })
}
