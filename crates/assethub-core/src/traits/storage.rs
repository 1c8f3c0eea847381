//! Object store trait for the storage backend behind the gateway.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A time-limited URL authorizing exactly one storage operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignedUrl {
    /// The fully assembled URL.
    pub url: String,
    /// The instant after which the backend rejects the URL.
    pub expires_at: DateTime<Utc>,
}

/// An open read handle on a stored object.
pub struct ObjectBody {
    /// Object bytes, pulled lazily from the backend.
    pub stream: ByteStream,
    /// Length reported by the backend, if any.
    pub content_length: Option<u64>,
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for object storage backends.
///
/// Clients normally write bytes themselves through
/// [`ObjectStore::presign_put`]; the gateway reads, deletes and signs, and
/// only writes through [`ObjectStore::put_signed`] when it relays an upload.
/// Implementations live in `assethub-storage`.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "oss", "s3").
    fn provider_type(&self) -> &str;

    /// Sign a PUT for `key` that must be sent with `content_type`.
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration)
    -> AppResult<SignedUrl>;

    /// Sign a GET for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<SignedUrl>;

    /// PUT `body` to a URL previously returned by [`ObjectStore::presign_put`].
    ///
    /// `content_type` must be the one the URL was signed with. Returns the
    /// number of bytes written.
    async fn put_signed(&self, url: &str, content_type: &str, body: Bytes) -> AppResult<u64>;

    /// Open a streaming read of `key`. A missing object is `NotFound`.
    async fn get(&self, key: &str) -> AppResult<ObjectBody>;

    /// Delete `key`. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;
}
