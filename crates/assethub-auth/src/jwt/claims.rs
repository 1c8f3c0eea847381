//! JWT claims carried by every access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assethub_core::types::UserId;

use crate::principal::{Principal, PrincipalKind};

/// Access token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user id.
    pub sub: i64,
    /// Whether the subject is an ordinary user or an administrator.
    pub kind: PrincipalKind,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// The subject as a typed id.
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }

    /// The principal these claims authenticate.
    pub fn principal(&self) -> Principal {
        Principal::from_parts(self.user_id(), self.kind)
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
