//! Caller identity resolved once per request.

use std::fmt;

use serde::{Deserialize, Serialize};

use assethub_core::types::UserId;

/// Kind of principal a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    /// Ordinary account, subject to project membership.
    User,
    /// Platform administrator.
    Admin,
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Must hold a membership in a project to act on it.
    Member(UserId),
    /// Bypasses membership checks and may upload outside any project.
    Privileged(UserId),
}

impl Principal {
    /// Build a principal from token contents.
    pub fn from_parts(user: UserId, kind: PrincipalKind) -> Self {
        match kind {
            PrincipalKind::User => Self::Member(user),
            PrincipalKind::Admin => Self::Privileged(user),
        }
    }

    /// The acting user, whatever the kind.
    pub fn user_id(&self) -> UserId {
        match *self {
            Self::Member(id) | Self::Privileged(id) => id,
        }
    }

    /// Whether membership checks are skipped for this caller.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Privileged(_))
    }

    /// Token kind corresponding to this principal.
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::Member(_) => PrincipalKind::User,
            Self::Privileged(_) => PrincipalKind::Admin,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => write!(f, "user:{id}"),
            Self::Privileged(id) => write!(f, "admin:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let p = Principal::from_parts(UserId::new(5), PrincipalKind::Admin);
        assert!(p.is_privileged());
        assert_eq!(p.user_id(), UserId::new(5));
        assert_eq!(p.kind(), PrincipalKind::Admin);
        assert_eq!(p.to_string(), "admin:5");

        let m = Principal::from_parts(UserId::new(6), PrincipalKind::User);
        assert!(!m.is_privileged());
        assert_eq!(m.to_string(), "user:6");
    }
}
