//! Access token creation.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use assethub_core::config::auth::AuthConfig;
use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

use super::claims::Claims;
use crate::principal::Principal;

/// Signs HS256 access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates an encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: i64::try_from(config.jwt_access_ttl_minutes)
                .ok()
                .and_then(Duration::try_minutes)
                .unwrap_or_else(|| Duration::days(365)),
        }
    }

    /// Issues an access token for `principal` with the configured lifetime.
    pub fn issue(&self, principal: Principal) -> AppResult<String> {
        self.issue_with_ttl(principal, self.access_ttl)
    }

    /// Issues an access token with an explicit lifetime.
    pub fn issue_with_ttl(&self, principal: Principal, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.user_id().get(),
            kind: principal.kind(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode access token", e)
        })
    }
}
