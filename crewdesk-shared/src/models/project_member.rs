/// Project membership model and role hierarchy
///
/// Links users to projects with the second of the two role families.
/// As with workspace roles, the total order is defined exactly once and
/// every comparison goes through `has_at_least`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_role AS ENUM ('project_lead', 'contributor', 'viewer');
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role project_role NOT NULL DEFAULT 'viewer',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **project_lead**: manage project members, full task access
/// - **contributor**: create and update tasks
/// - **viewer**: read-only; also the role auto-provisioned for workspace
///   members exercising inherited access for the first time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project-level role, ordered PROJECT_LEAD > CONTRIBUTOR > VIEWER
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_role", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    /// Manages the project and its members
    ProjectLead,

    /// Creates and updates tasks
    Contributor,

    /// Read-only access
    Viewer,
}

impl ProjectRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::ProjectLead => "project_lead",
            ProjectRole::Contributor => "contributor",
            ProjectRole::Viewer => "viewer",
        }
    }

    /// Numeric rank of the fixed role order
    fn rank(&self) -> u8 {
        match self {
            ProjectRole::ProjectLead => 3,
            ProjectRole::Contributor => 2,
            ProjectRole::Viewer => 1,
        }
    }

    /// Whether this role satisfies `minimum`
    pub fn has_at_least(&self, minimum: ProjectRole) -> bool {
        self.rank() >= minimum.rank()
    }
}

/// Project membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the project
    pub role: ProjectRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Inserts a membership row
    pub async fn create(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(db)
        .await
    }

    /// Inserts a membership row unless one already exists
    ///
    /// The RBAC resolver materializes inherited VIEWER access through
    /// this; ON CONFLICT keeps a concurrent explicit grant intact.
    pub async fn create_if_absent(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Finds the membership for a (project, user) pair
    pub async fn find(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1 AND user_id = $2
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Gets just the role for a (project, user) pair
    pub async fn get_role(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        sqlx::query_scalar::<_, ProjectRole>(
            "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Updates the role on an existing membership row
    pub async fn update_role(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET role = $3
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, role, created_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(db)
        .await
    }

    /// Counts holders of a role in a project, excluding one user
    pub async fn count_role_holders_excluding(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
        role: ProjectRole,
        excluding_user: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM project_members
            WHERE project_id = $1 AND role = $2 AND user_id <> $3
            "#,
        )
        .bind(project_id)
        .bind(role)
        .bind(excluding_user)
        .fetch_one(db)
        .await
    }

    /// Lists all members of a project
    pub async fn list_by_project(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, role, created_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await
    }
}
