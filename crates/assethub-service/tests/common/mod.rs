//! Shared fixtures for service tests: in-memory catalog, membership and
//! object store, plus a store wrapper that fails selected deletes.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use assethub_auth::AccessGuard;
use assethub_core::config::storage::StorageConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::{ObjectBody, ObjectStore, SignedUrl};
use assethub_core::types::{ProjectId, UserId};
use assethub_database::{MemoryCatalog, MemoryMembership};
use assethub_entity::project::ProjectRole;
use assethub_service::file::PreUploadRequest;
use assethub_service::{DownloadService, FileService, RequestContext, UploadService, VersionService};
use assethub_storage::StorageManager;
use assethub_storage::providers::memory::MemoryObjectStore;

pub const PROJECT: ProjectId = ProjectId::new(1);
pub const OTHER_PROJECT: ProjectId = ProjectId::new(2);
pub const OWNER: UserId = UserId::new(10);
pub const ADMIN: UserId = UserId::new(11);
pub const DEVELOPER: UserId = UserId::new(12);
pub const VIEWER: UserId = UserId::new(13);
pub const OUTSIDER: UserId = UserId::new(99);
pub const PLATFORM_ADMIN: UserId = UserId::new(1000);

/// Every service wired against in-memory collaborators.
pub struct Harness {
    pub catalog: MemoryCatalog,
    pub members: MemoryMembership,
    pub upload: UploadService,
    pub download: DownloadService,
    pub versions: VersionService,
    pub files: FileService,
}

impl Harness {
    /// Services backed by `store`, with the default project's members seeded.
    pub async fn with_store(store: Option<Arc<dyn ObjectStore>>) -> Self {
        let catalog = MemoryCatalog::new();
        let members = MemoryMembership::new();
        members.grant(PROJECT, OWNER, ProjectRole::Owner).await;
        members.grant(PROJECT, ADMIN, ProjectRole::Admin).await;
        members.grant(PROJECT, DEVELOPER, ProjectRole::Developer).await;
        members.grant(PROJECT, VIEWER, ProjectRole::Viewer).await;

        let storage = Arc::new(match store {
            Some(store) => StorageManager::with_store(store),
            None => StorageManager::unconfigured(),
        });
        let config = StorageConfig {
            provider: "memory".to_string(),
            ..Default::default()
        };
        let guard = AccessGuard::new(Arc::new(members.clone()));
        let shared = Arc::new(catalog.clone());

        Self {
            upload: UploadService::new(
                shared.clone(),
                guard.clone(),
                storage.clone(),
                config.clone(),
            ),
            download: DownloadService::new(
                shared.clone(),
                guard.clone(),
                storage.clone(),
                config,
            ),
            versions: VersionService::new(shared.clone(), guard.clone()),
            files: FileService::new(shared, guard, storage),
            catalog,
            members,
        }
    }

    /// Services backed by a fresh in-memory store, returned alongside.
    pub async fn in_memory() -> (Self, MemoryObjectStore) {
        let store = MemoryObjectStore::new();
        let harness = Self::with_store(Some(Arc::new(store.clone()))).await;
        (harness, store)
    }
}

/// A pre-upload request for `name` in the default project.
pub fn pre_upload(name: &str, hash: &str) -> PreUploadRequest {
    PreUploadRequest {
        project_id: PROJECT,
        name: name.to_string(),
        category: "text".to_string(),
        format: "txt".to_string(),
        size_bytes: 11,
        hash: hash.to_string(),
        ..Default::default()
    }
}

pub fn member(user: UserId) -> RequestContext {
    RequestContext::member(user)
}

/// Wraps a memory store, counts delete attempts and fails the ones whose
/// attempt index (0-based) is listed.
#[derive(Debug)]
pub struct FlakyDeleteStore {
    inner: MemoryObjectStore,
    failing_attempts: HashSet<usize>,
    attempts: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl FlakyDeleteStore {
    pub fn new(inner: MemoryObjectStore, failing_attempts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            inner,
            failing_attempts: failing_attempts.into_iter().collect(),
            attempts: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FlakyDeleteStore {
    fn provider_type(&self) -> &str {
        "flaky"
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> AppResult<SignedUrl> {
        self.inner.presign_put(key, content_type, ttl).await
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<SignedUrl> {
        self.inner.presign_get(key, ttl).await
    }

    async fn put_signed(&self, url: &str, content_type: &str, body: Bytes) -> AppResult<u64> {
        self.inner.put_signed(url, content_type, body).await
    }

    async fn get(&self, key: &str) -> AppResult<ObjectBody> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_attempts.contains(&attempt) {
            return Err(AppError::external_service(format!(
                "storage delete failed: 503 Service Unavailable, requestId=test-{attempt}, detail="
            )));
        }
        self.deleted.lock().unwrap().push(key.to_string());
        self.inner.delete(key).await
    }
}
