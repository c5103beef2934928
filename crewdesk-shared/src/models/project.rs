/// Project model and database operations
///
/// Projects live inside a workspace; their membership table is separate
/// from the workspace's and carries its own role family. The only cross
/// edge is downward: workspace access implies inheritable project VIEWER
/// access (materialized by the RBAC resolver), never the other way.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Workspace this project belongs to
    pub workspace_id: Uuid,

    /// Project display name
    pub name: String,

    /// User who created the project (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Inserts a project row
    ///
    /// Runs inside the same transaction as the creator's PROJECT_LEAD
    /// membership insert; `ProjectService` is the only production caller.
    pub async fn create(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
        name: &str,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (workspace_id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, workspace_id, name, created_by, created_at, updated_at
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .bind(created_by)
        .fetch_one(db)
        .await
    }

    /// Finds a project by ID
    pub async fn find(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, workspace_id, name, created_by, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Gets just the owning workspace ID for a project
    ///
    /// The RBAC resolver's inheritance fallback needs only this edge.
    pub async fn workspace_id_of(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT workspace_id FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(db)
            .await
    }

    /// Lists projects in a workspace
    pub async fn list_by_workspace(
        db: impl PgExecutor<'_>,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, workspace_id, name, created_by, created_at, updated_at
            FROM projects
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(db)
        .await
    }
}
