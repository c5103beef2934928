/// Workspace model and database operations
///
/// Workspaces are the top of the Workspace → Project → Task hierarchy.
/// Authorization flows downward from here and never upward: project
/// access never grants workspace rights.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workspaces (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A workspace row is only ever inserted together with its creator's
/// OWNER membership inside one transaction, so no workspace exists with
/// zero OWNER memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Workspace model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    /// Unique workspace ID
    pub id: Uuid,

    /// Workspace display name
    pub name: String,

    /// User who created the workspace (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the workspace was created
    pub created_at: DateTime<Utc>,

    /// When the workspace was last updated
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Inserts a workspace row
    ///
    /// Callers are expected to run this inside the same transaction as
    /// the creator's OWNER membership insert; `WorkspaceService` is the
    /// only production caller.
    pub async fn create(
        db: impl PgExecutor<'_>,
        name: &str,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, created_by)
            VALUES ($1, $2)
            RETURNING id, name, created_by, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(created_by)
        .fetch_one(db)
        .await
    }

    /// Finds a workspace by ID
    pub async fn find(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, name, created_by, created_at, updated_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Lists workspaces a user is a member of
    pub async fn list_for_user(
        db: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            r#"
            SELECT w.id, w.name, w.created_by, w.created_at, w.updated_at
            FROM workspaces w
            JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY w.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
