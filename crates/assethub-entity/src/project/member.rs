//! Project membership fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assethub_core::types::{ProjectId, UserId};

use super::role::ProjectRole;

/// A (project, user, role) triple. Read-only for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// Project the membership belongs to.
    pub project_id: ProjectId,
    /// Member user.
    pub user_id: UserId,
    /// Permission tier inside the project.
    pub role: ProjectRole,
    /// When the membership was granted.
    pub created_at: DateTime<Utc>,
}
