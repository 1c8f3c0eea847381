//! S3-compatible object store using the AWS SDK (requires `s3` feature).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use tokio_util::io::ReaderStream;
use tracing::info;

use assethub_core::config::storage::StorageConfig;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::traits::storage::{ObjectBody, ObjectStore, SignedUrl};

use crate::signer::expires_after;
use crate::transfer::SignedTransfer;

/// Timeout for uploads relayed through presigned URLs.
const RELAY_TIMEOUT: Duration = Duration::from_secs(300);

/// Object store backed by the managed AWS SDK client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    transfer: SignedTransfer,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    ///
    /// Explicit credentials win; otherwise the default AWS provider chain
    /// (environment, profile, instance metadata) is used.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::configuration(
                "Object storage is not configured: bucket is empty",
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.access_key_id.trim().is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key_id.trim(),
                config.access_key_secret.trim(),
                None,
                None,
                "assethub-config",
            ));
        }
        let endpoint = config.endpoint.trim();
        if !endpoint.is_empty() {
            let endpoint = if endpoint.contains("://") {
                endpoint.to_string()
            } else {
                format!("https://{endpoint}")
            };
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = %config.endpoint,
            "Initializing S3 object store"
        );
        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.trim().to_string(),
            transfer: SignedTransfer::new(RELAY_TIMEOUT)?,
        })
    }

    fn presigning(ttl: Duration) -> AppResult<PresigningConfig> {
        PresigningConfig::expires_in(ttl).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid presign expiry", e)
        })
    }
}

fn sdk_failure<E>(operation: &str, key: &str, err: SdkError<E, HttpResponse>) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(ref service_err) = err {
        let raw = service_err.raw();
        if raw.status().as_u16() == 404 {
            return AppError::not_found(format!("Object '{key}' does not exist"));
        }
    }
    let message = format!("{operation} of '{key}' failed: {}", DisplayErrorContext(&err));
    AppError::with_source(ErrorKind::ExternalService, message, err)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> AppResult<SignedUrl> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(|e| sdk_failure("Presign PUT", key, e))?;
        Ok(SignedUrl {
            url: request.uri().to_string(),
            expires_at: expires_after(ttl)?,
        })
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<SignedUrl> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(Self::presigning(ttl)?)
            .await
            .map_err(|e| sdk_failure("Presign GET", key, e))?;
        Ok(SignedUrl {
            url: request.uri().to_string(),
            expires_at: expires_after(ttl)?,
        })
    }

    async fn put_signed(&self, url: &str, content_type: &str, body: Bytes) -> AppResult<u64> {
        self.transfer.put(url, content_type, body).await
    }

    async fn get(&self, key: &str) -> AppResult<ObjectBody> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_failure("Read", key, e))?;

        let content_length = output.content_length().and_then(|n| u64::try_from(n).ok());
        let stream = ReaderStream::new(output.body.into_async_read());
        Ok(ObjectBody {
            stream: Box::pin(stream),
            content_length,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_failure("Delete", key, e))?;
        Ok(())
    }
}
