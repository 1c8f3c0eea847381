//! Project membership lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;
use assethub_core::types::{ProjectId, UserId};
use assethub_entity::project::{ProjectMember, ProjectRole};

use crate::catalog::MembershipOracle;

/// Read-only repository over `project_members`.
#[derive(Debug, Clone)]
pub struct ProjectMemberRepository {
    pool: PgPool,
}

impl ProjectMemberRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the membership row for (project, user).
    pub async fn find(&self, project: ProjectId, user: UserId) -> AppResult<Option<ProjectMember>> {
        sqlx::query_as::<_, ProjectMember>(
            "SELECT * FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }
}

#[async_trait]
impl MembershipOracle for ProjectMemberRepository {
    async fn role_of(&self, project: ProjectId, user: UserId) -> AppResult<Option<ProjectRole>> {
        Ok(self.find(project, user).await?.map(|m| m.role))
    }
}
