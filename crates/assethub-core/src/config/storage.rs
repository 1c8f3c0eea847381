//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Object storage backend configuration.
///
/// The gateway starts even when this section is incomplete; every
/// operation that needs the backend then fails with a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend flavour: `"oss"` (signed HTTP), `"s3"` (AWS SDK), or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Service endpoint, with or without scheme.
    #[serde(default)]
    pub endpoint: String,
    /// Region, used by the S3 SDK only.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket holding every asset object.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: String,
    /// Access key secret.
    #[serde(default)]
    pub access_key_secret: String,
    /// Use path-style addressing with the S3 SDK (MinIO and friends).
    #[serde(default)]
    pub force_path_style: bool,
    /// Validity window of signed URLs, in seconds.
    #[serde(default = "default_expire_seconds")]
    pub expire_seconds: u64,
    /// Largest body accepted by the upload-through endpoint.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// `Cache-Control` value sent with proxied content.
    #[serde(default = "default_proxy_cache_control")]
    pub proxy_cache_control: String,
}

impl StorageConfig {
    /// Whether enough settings are present to reach the backend.
    ///
    /// The S3 provider may fall back to the SDK credential chain, so only
    /// the bucket is mandatory there.
    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "memory" => return true,
            "s3" => return !self.bucket.trim().is_empty(),
            _ => {}
        }
        ![
            &self.endpoint,
            &self.bucket,
            &self.access_key_id,
            &self.access_key_secret,
        ]
        .iter()
        .any(|value| value.trim().is_empty())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            force_path_style: false,
            expire_seconds: default_expire_seconds(),
            max_upload_size_bytes: default_max_upload(),
            proxy_cache_control: default_proxy_cache_control(),
        }
    }
}

fn default_provider() -> String {
    "oss".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_expire_seconds() -> u64 {
    3600
}

fn default_max_upload() -> u64 {
    524_288_000 // 500 MB
}

fn default_proxy_cache_control() -> String {
    "private, max-age=3600".to_string()
}
