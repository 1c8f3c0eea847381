//! Project access checks.
//!
//! Privileged principals pass every check without a membership lookup.

use std::sync::Arc;

use tracing::debug;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;
use assethub_core::types::ProjectId;
use assethub_database::MembershipOracle;
use assethub_entity::project::ProjectRole;

use crate::principal::Principal;

/// Enforces membership and role tiers through a [`MembershipOracle`].
#[derive(Debug, Clone)]
pub struct AccessGuard {
    oracle: Arc<dyn MembershipOracle>,
}

impl AccessGuard {
    /// Creates a guard over `oracle`.
    pub fn new(oracle: Arc<dyn MembershipOracle>) -> Self {
        Self { oracle }
    }

    /// Requires any membership in `project`.
    ///
    /// Returns the member's role, or `None` for a privileged caller.
    pub async fn require_member(
        &self,
        principal: &Principal,
        project: ProjectId,
    ) -> AppResult<Option<ProjectRole>> {
        let Principal::Member(user) = *principal else {
            return Ok(None);
        };
        match self.oracle.role_of(project, user).await? {
            Some(role) => {
                debug!(%project, %user, %role, "Membership verified");
                Ok(Some(role))
            }
            None => Err(AppError::authorization(format!(
                "User {user} is not a member of project {project}"
            ))),
        }
    }

    /// Requires a role of at least `minimum` in `project`.
    pub async fn require_role_at_least(
        &self,
        principal: &Principal,
        project: ProjectId,
        minimum: ProjectRole,
    ) -> AppResult<()> {
        match self.require_member(principal, project).await? {
            None => Ok(()),
            Some(role) if role.has_at_least(&minimum) => Ok(()),
            Some(role) => Err(AppError::authorization(format!(
                "Role '{role}' is insufficient; minimum required: '{minimum}'"
            ))),
        }
    }

    /// Requires the owner or admin tier in `project`.
    pub async fn require_owner_or_admin(
        &self,
        principal: &Principal,
        project: ProjectId,
    ) -> AppResult<()> {
        self.require_role_at_least(principal, project, ProjectRole::Admin)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assethub_core::error::ErrorKind;
    use assethub_core::types::UserId;
    use assethub_database::MemoryMembership;

    const PROJECT: ProjectId = ProjectId::new(1);

    async fn guard() -> AccessGuard {
        let members = MemoryMembership::new();
        members.grant(PROJECT, UserId::new(10), ProjectRole::Owner).await;
        members.grant(PROJECT, UserId::new(11), ProjectRole::Developer).await;
        members.grant(PROJECT, UserId::new(12), ProjectRole::Viewer).await;
        AccessGuard::new(Arc::new(members))
    }

    #[tokio::test]
    async fn test_non_member_is_rejected() {
        let g = guard().await;
        let err = g
            .require_member(&Principal::Member(UserId::new(99)), PROJECT)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_role_tiers() {
        let g = guard().await;
        let viewer = Principal::Member(UserId::new(12));
        let developer = Principal::Member(UserId::new(11));
        let owner = Principal::Member(UserId::new(10));

        assert_eq!(
            g.require_member(&viewer, PROJECT).await.unwrap(),
            Some(ProjectRole::Viewer)
        );
        assert!(
            g.require_role_at_least(&viewer, PROJECT, ProjectRole::Developer)
                .await
                .is_err()
        );
        assert!(
            g.require_role_at_least(&developer, PROJECT, ProjectRole::Developer)
                .await
                .is_ok()
        );
        assert!(g.require_owner_or_admin(&developer, PROJECT).await.is_err());
        assert!(g.require_owner_or_admin(&owner, PROJECT).await.is_ok());
    }

    #[tokio::test]
    async fn test_privileged_bypasses_membership() {
        let g = guard().await;
        let admin = Principal::Privileged(UserId::new(500));
        assert_eq!(g.require_member(&admin, ProjectId::new(0)).await.unwrap(), None);
        assert!(g.require_owner_or_admin(&admin, PROJECT).await.is_ok());
    }
}
