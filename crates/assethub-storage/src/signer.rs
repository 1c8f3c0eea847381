//! Query-string request signing for OSS-compatible backends.
//!
//! Produces version-1 signed URLs:
//!
//! ```text
//! {scheme}://{bucket}.{host}/{escaped key}?Expires={unix}&OSSAccessKeyId={id}&Signature={sig}
//! ```
//!
//! where `sig` is `base64(HMAC-SHA1(secret, string_to_sign))` and the
//! string to sign is
//! `"{METHOD}\n\n{content type}\n{expires}\n/{bucket}/{key}"`. The blank
//! line is the unused Content-MD5 field. The canonical resource uses the
//! unescaped key; the URL path escapes each `/`-separated segment on its own.

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Url;
use sha1::Sha1;
use tracing::debug;

use assethub_core::config::storage::StorageConfig;
use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::traits::storage::SignedUrl;

type HmacSha1 = Hmac<Sha1>;

/// Characters escaped inside one path segment. Unreserved characters and
/// `$ & + : = @` pass through; `/ ; , ?` and everything else are escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Characters escaped in a query value. Spaces are written as `+` separately.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP verbs the gateway signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedMethod {
    /// Client upload of a new version's bytes.
    Put,
    /// Direct download or server-side proxy read.
    Get,
    /// Best-effort removal during file deletion.
    Delete,
}

impl SignedMethod {
    /// The verb as it appears in the string to sign.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "PUT",
            Self::Get => "GET",
            Self::Delete => "DELETE",
        }
    }
}

/// Signs backend URLs for one bucket with one credential pair.
#[derive(Clone)]
pub struct RequestSigner {
    scheme: String,
    host: String,
    bucket: String,
    access_key_id: String,
    access_key_secret: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Validate credentials and normalize `endpoint`.
    pub fn new(
        endpoint: &str,
        bucket: &str,
        access_key_id: &str,
        access_key_secret: &str,
    ) -> AppResult<Self> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(AppError::configuration(
                "Object storage is not configured: bucket is empty",
            ));
        }
        if access_key_id.trim().is_empty() || access_key_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "Object storage is not configured: access key id/secret is empty",
            ));
        }
        let (scheme, host) = normalize_endpoint(endpoint, bucket)?;

        Ok(Self {
            scheme,
            host,
            bucket: bucket.to_string(),
            access_key_id: access_key_id.trim().to_string(),
            access_key_secret: access_key_secret.trim().to_string(),
        })
    }

    /// Build a signer from the storage section of the configuration.
    pub fn from_config(config: &StorageConfig) -> AppResult<Self> {
        Self::new(
            &config.endpoint,
            &config.bucket,
            &config.access_key_id,
            &config.access_key_secret,
        )
    }

    /// Bucket the signer addresses.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Virtual-hosted base URL, `{scheme}://{bucket}.{host}`.
    pub fn base_url(&self) -> String {
        format!("{}://{}.{}", self.scheme, self.bucket, self.host)
    }

    /// Canonical string covered by the signature.
    pub fn string_to_sign(
        &self,
        method: SignedMethod,
        key: &str,
        content_type: &str,
        expires: i64,
    ) -> String {
        format!(
            "{}\n\n{}\n{}\n/{}/{}",
            method.as_str(),
            content_type,
            expires,
            self.bucket,
            key
        )
    }

    /// `base64(HMAC-SHA1(secret, string_to_sign))`.
    pub fn signature(&self, string_to_sign: &str) -> AppResult<String> {
        let mut mac = HmacSha1::new_from_slice(self.access_key_secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Failed to key HMAC-SHA1: {e}")))?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Sign `key` for `method`, valid until the absolute unix time `expires`.
    ///
    /// Deterministic for fixed inputs.
    pub fn sign_until(
        &self,
        method: SignedMethod,
        key: &str,
        content_type: &str,
        expires: i64,
    ) -> AppResult<String> {
        let signature = self.signature(&self.string_to_sign(method, key, content_type, expires))?;
        Ok(format!(
            "{}/{}?Expires={}&OSSAccessKeyId={}&Signature={}",
            self.base_url(),
            escape_key_path(key),
            expires,
            query_escape(&self.access_key_id),
            query_escape(&signature)
        ))
    }

    /// Sign `key` for `method`, valid for `ttl` from now.
    pub fn sign(
        &self,
        method: SignedMethod,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> AppResult<SignedUrl> {
        let expires_at = expires_after(ttl)?;
        let expires = expires_at.timestamp();
        let url = self.sign_until(method, key, content_type, expires)?;

        debug!(method = method.as_str(), key, expires, "Signed storage URL");
        Ok(SignedUrl { url, expires_at })
    }
}

/// Absolute expiry of a URL signed now for `ttl`, truncated to whole seconds.
pub fn expires_after(ttl: Duration) -> AppResult<DateTime<Utc>> {
    let out_of_range =
        || AppError::internal(format!("Signed URL lifetime {ttl:?} is out of range"));
    let ttl = chrono::Duration::from_std(ttl).map_err(|_| out_of_range())?;
    let now = Utc::now();
    now.checked_add_signed(ttl)
        .and_then(|t| DateTime::from_timestamp(t.timestamp(), 0))
        .ok_or_else(out_of_range)
}

/// Reduce a configured endpoint to `(scheme, host)`.
///
/// Accepts bare hosts, `host:port`, and full URLs. Leading `{bucket}.`
/// labels are stripped so the bucket is not repeated when the virtual-hosted
/// URL is assembled.
pub fn normalize_endpoint(raw: &str, bucket: &str) -> AppResult<(String, String)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::configuration(
            "Object storage is not configured: endpoint is empty",
        ));
    }

    let parsed = match Url::parse(raw) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => url,
        _ => Url::parse(&format!("https://{raw}"))
            .ok()
            .filter(|url| url.host_str().is_some_and(|h| !h.is_empty()))
            .ok_or_else(|| AppError::configuration(format!("Invalid storage endpoint: '{raw}'")))?,
    };

    let mut host = parsed.host_str().unwrap_or_default().to_string();
    if let Some(port) = parsed.port() {
        host = format!("{host}:{port}");
    }

    let prefix = format!("{bucket}.");
    while !bucket.is_empty() && host.starts_with(&prefix) {
        host = host[prefix.len()..].to_string();
    }
    if host.is_empty() {
        return Err(AppError::configuration(format!(
            "Invalid storage endpoint: '{raw}' has no host"
        )));
    }

    let scheme = match parsed.scheme() {
        "" => "https".to_string(),
        other => other.to_string(),
    };
    Ok((scheme, host))
}

/// Percent-escape every `/`-separated segment of `key` independently.
pub fn escape_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Form-style escaping for a query value.
fn query_escape(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE)
        .to_string()
        .replace("%20", "+")
}
