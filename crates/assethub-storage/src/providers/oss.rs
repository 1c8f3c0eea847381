//! OSS-compatible object store driven by self-signed query-string URLs.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use tracing::{debug, info};

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::traits::storage::{ObjectBody, ObjectStore, SignedUrl};

use crate::signer::{RequestSigner, SignedMethod};
use crate::transfer::{SignedTransfer, backend_failure};

/// Lifetime of the URLs the store signs for its own GET/DELETE calls.
const INTERNAL_URL_TTL: Duration = Duration::from_secs(300);

/// Object store speaking the OSS V1 query-string protocol over HTTP.
#[derive(Debug, Clone)]
pub struct OssObjectStore {
    signer: RequestSigner,
    client: reqwest::Client,
    transfer: SignedTransfer,
}

impl OssObjectStore {
    /// Create a store that signs with `signer` and talks through `client`.
    pub fn new(signer: RequestSigner, client: reqwest::Client) -> Self {
        info!(bucket = signer.bucket(), base_url = %signer.base_url(), "Initializing OSS object store");
        let transfer = SignedTransfer::with_client(client.clone());
        Self {
            signer,
            client,
            transfer,
        }
    }

    /// The signer used for every URL this store produces.
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }
}

#[async_trait]
impl ObjectStore for OssObjectStore {
    fn provider_type(&self) -> &str {
        "oss"
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> AppResult<SignedUrl> {
        self.signer.sign(SignedMethod::Put, key, content_type, ttl)
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<SignedUrl> {
        self.signer.sign(SignedMethod::Get, key, "", ttl)
    }

    async fn put_signed(&self, url: &str, content_type: &str, body: Bytes) -> AppResult<u64> {
        self.transfer.put(url, content_type, body).await
    }

    async fn get(&self, key: &str) -> AppResult<ObjectBody> {
        let signed = self.signer.sign(SignedMethod::Get, key, "", INTERNAL_URL_TTL)?;
        let response = self.client.get(&signed.url).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Storage read request for '{key}' failed"),
                e,
            )
        })?;

        if !response.status().is_success() {
            return Err(backend_failure("storage read", response).await);
        }

        let content_length = response.content_length();
        debug!(key, content_length, "Opened backend read");
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(ObjectBody {
            stream: Box::pin(stream),
            content_length,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let signed = self
            .signer
            .sign(SignedMethod::Delete, key, "", INTERNAL_URL_TTL)?;
        let response = self.client.delete(&signed.url).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Storage delete request for '{key}' failed"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            debug!(key, status = status.as_u16(), "Deleted object");
            return Ok(());
        }
        Err(backend_failure("storage delete", response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> OssObjectStore {
        let signer = RequestSigner::new("https://oss.example.com", "assets", "AKID", "secret")
            .expect("signer");
        OssObjectStore::new(signer, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_presign_put_targets_virtual_host() {
        let signed = store()
            .presign_put("1/2/assets/3/v1_h.txt", "text/plain", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(
            signed
                .url
                .starts_with("https://assets.oss.example.com/1/2/assets/3/v1_h.txt?Expires=")
        );
    }

    #[tokio::test]
    async fn test_presign_get_differs_from_put() {
        let s = store();
        let ttl = Duration::from_secs(60);
        let put = s.presign_put("k", "", ttl).await.unwrap();
        let get = s.presign_get("k", ttl).await.unwrap();
        assert_ne!(put.url, get.url);
    }
}
