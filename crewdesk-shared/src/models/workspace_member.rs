/// Workspace membership model and role hierarchy
///
/// This module links users to workspaces with role-based access control.
/// The role order is defined exactly once, here, as `WorkspaceRole::rank`;
/// every comparison in the system goes through `has_at_least`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE workspace_role AS ENUM ('owner', 'member', 'viewer');
///
/// CREATE TABLE workspace_members (
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role workspace_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (workspace_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: manage members and roles, create projects, full access
/// - **member**: create projects, contribute
/// - **viewer**: read-only access
///
/// Workspace membership is never auto-provisioned — a user without a row
/// here has no workspace access, full stop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Workspace-level role, ordered OWNER > MEMBER > VIEWER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_role", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    /// Full control of the workspace and its members
    Owner,

    /// Can create projects and contribute
    Member,

    /// Read-only access
    Viewer,
}

impl WorkspaceRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Owner => "owner",
            WorkspaceRole::Member => "member",
            WorkspaceRole::Viewer => "viewer",
        }
    }

    /// Numeric rank of the fixed role order
    fn rank(&self) -> u8 {
        match self {
            WorkspaceRole::Owner => 3,
            WorkspaceRole::Member => 2,
            WorkspaceRole::Viewer => 1,
        }
    }

    /// Whether this role satisfies `minimum`
    ///
    /// Succeeds iff `rank(self) >= rank(minimum)`, so any role satisfies
    /// VIEWER and only OWNER satisfies OWNER.
    pub fn has_at_least(&self, minimum: WorkspaceRole) -> bool {
        self.rank() >= minimum.rank()
    }
}

/// Workspace membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkspaceMember {
    /// Workspace ID
    pub workspace_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the workspace
    pub role: WorkspaceRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl WorkspaceMember {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate (workspace, user) pairs or when the
    /// workspace/user does not exist.
    pub async fn create(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceMember>(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING workspace_id, user_id, role, created_at
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// Finds the membership for a (workspace, user) pair
    pub async fn find(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceMember>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Gets just the role for a (workspace, user) pair
    pub async fn get_role(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceRole>, sqlx::Error> {
        sqlx::query_scalar::<_, WorkspaceRole>(
            "SELECT role FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Updates the role on an existing membership row
    pub async fn update_role(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceMember>(
            r#"
            UPDATE workspace_members
            SET role = $3
            WHERE workspace_id = $1 AND user_id = $2
            RETURNING workspace_id, user_id, role, created_at
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(db)
        .await
    }

    /// Deletes a membership row
    pub async fn delete(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
                .bind(workspace_id)
                .bind(user_id)
                .execute(db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts holders of a role in a workspace, excluding one user
    ///
    /// The role-update guard uses this to detect "requester is the only
    /// holder of the top role".
    pub async fn count_role_holders_excluding(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        role: WorkspaceRole,
        excluding_user: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM workspace_members
            WHERE workspace_id = $1 AND role = $2 AND user_id <> $3
            "#,
        )
        .bind(workspace_id)
        .bind(role)
        .bind(excluding_user)
        .fetch_one(db)
        .await
    }

    /// Lists all members of a workspace
    pub async fn list_by_workspace(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceMember>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM workspace_members
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(WorkspaceRole::Owner.as_str(), "owner");
        assert_eq!(WorkspaceRole::Member.as_str(), "member");
        assert_eq!(WorkspaceRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_rank_monotonicity() {
        // OWNER satisfies every minimum.
        assert!(WorkspaceRole::Owner.has_at_least(WorkspaceRole::Owner));
        assert!(WorkspaceRole::Owner.has_at_least(WorkspaceRole::Member));
        assert!(WorkspaceRole::Owner.has_at_least(WorkspaceRole::Viewer));

        // MEMBER satisfies MEMBER and VIEWER but not OWNER.
        assert!(!WorkspaceRole::Member.has_at_least(WorkspaceRole::Owner));
        assert!(WorkspaceRole::Member.has_at_least(WorkspaceRole::Member));
        assert!(WorkspaceRole::Member.has_at_least(WorkspaceRole::Viewer));

        // VIEWER satisfies only VIEWER.
        assert!(!WorkspaceRole::Viewer.has_at_least(WorkspaceRole::Owner));
        assert!(!WorkspaceRole::Viewer.has_at_least(WorkspaceRole::Member));
        assert!(WorkspaceRole::Viewer.has_at_least(WorkspaceRole::Viewer));
    }

    #[test]
    fn test_role_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Owner).unwrap(),
            "\"OWNER\""
        );
        assert_eq!(
            serde_json::to_string(&WorkspaceRole::Viewer).unwrap(),
            "\"VIEWER\""
        );
    }
}
