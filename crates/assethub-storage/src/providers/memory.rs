//! In-memory object store for development and tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use percent_encoding::percent_decode_str;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::{ObjectBody, ObjectStore, SignedUrl};

use crate::signer::{escape_key_path, expires_after};

/// Object store keeping every object in a concurrent map.
///
/// Signed URLs use the `memory://` scheme and are only meaningful to
/// [`MemoryObjectStore::key_from_url`].
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `key`, standing in for a client-side PUT.
    pub fn put(&self, key: &str, data: impl Into<Bytes>) {
        self.objects.insert(key.to_string(), data.into());
    }

    /// Whether `key` currently holds an object.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Recover the (escaped) object path from a URL this store signed.
    pub fn key_from_url(url: &str) -> Option<&str> {
        url.strip_prefix("memory://")
            .and_then(|rest| rest.split_once('?'))
            .map(|(path, _)| path)
    }

    fn sign(&self, method: &str, key: &str, ttl: Duration) -> AppResult<SignedUrl> {
        let expires_at = expires_after(ttl)?;
        Ok(SignedUrl {
            url: format!(
                "memory://{}?method={}&expires={}",
                escape_key_path(key),
                method,
                expires_at.timestamp()
            ),
            expires_at,
        })
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        ttl: Duration,
    ) -> AppResult<SignedUrl> {
        self.sign("PUT", key, ttl)
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<SignedUrl> {
        self.sign("GET", key, ttl)
    }

    async fn put_signed(&self, url: &str, _content_type: &str, body: Bytes) -> AppResult<u64> {
        let key = Self::key_from_url(url)
            .filter(|_| url.contains("method=PUT"))
            .ok_or_else(|| AppError::validation(format!("'{url}' is not a signed PUT URL")))?;
        let key = percent_decode_str(key)
            .decode_utf8()
            .map_err(|_| AppError::validation("Signed URL path is not valid UTF-8"))?;
        let size = body.len() as u64;
        self.put(&key, body);
        Ok(size)
    }

    async fn get(&self, key: &str) -> AppResult<ObjectBody> {
        let data = self
            .objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Object '{key}' does not exist")))?;
        let content_length = Some(data.len() as u64);
        Ok(ObjectBody {
            stream: Box::pin(futures::stream::iter([Ok(data)])),
            content_length,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryObjectStore::new();
        store.put("a/b.txt", "hello");

        let body = store.get("a/b.txt").await.unwrap();
        assert_eq!(body.content_length, Some(5));
        let chunks: Vec<Bytes> = body.stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");

        store.delete("a/b.txt").await.unwrap();
        assert!(store.get("a/b.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_put_signed_decodes_key() {
        let store = MemoryObjectStore::new();
        let signed = store
            .presign_put("7/1/assets/3/v1_a b.txt", "text/plain", Duration::from_secs(60))
            .await
            .unwrap();
        let written = store
            .put_signed(&signed.url, "text/plain", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert!(store.contains("7/1/assets/3/v1_a b.txt"));

        let get = store.presign_get("k", Duration::from_secs(60)).await.unwrap();
        assert!(store.put_signed(&get.url, "", Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_signed_url_round_trips_key() {
        let store = MemoryObjectStore::new();
        let signed = store
            .presign_get("7/1/assets/3/v1_h.txt", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            MemoryObjectStore::key_from_url(&signed.url),
            Some("7/1/assets/3/v1_h.txt")
        );
    }
}
