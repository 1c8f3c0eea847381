//! Request context carrying the authenticated principal.

use chrono::{DateTime, Utc};

use assethub_core::types::UserId;

pub use assethub_auth::principal::Principal;

/// Context for the current authenticated request.
///
/// Built once by the HTTP layer from the bearer token and passed into every
/// service method, so each operation knows who is acting.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated caller.
    pub principal: Principal,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `principal`.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_time: Utc::now(),
        }
    }

    /// Context for an ordinary member.
    pub fn member(user: UserId) -> Self {
        Self::new(Principal::Member(user))
    }

    /// Context for a privileged caller.
    pub fn privileged(user: UserId) -> Self {
        Self::new(Principal::Privileged(user))
    }

    /// The acting user.
    pub fn user_id(&self) -> UserId {
        self.principal.user_id()
    }

    /// Returns whether membership checks are bypassed.
    pub fn is_privileged(&self) -> bool {
        self.principal.is_privileged()
    }
}
