/// Task model, status enum, and the assignment join
///
/// Tasks belong to exactly one project. Assignments are a many-to-many
/// join replaced wholesale on every create/update; the service layer
/// reads the old assignee set before replacing so it can notify only the
/// net-new assignees.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(500) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_assignments (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Current status
    pub status: TaskStatus,

    /// User who created the task (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a task row
#[derive(Debug, Clone)]
pub struct CreateTaskRow {
    /// Project ID
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Creating user
    pub created_by: Uuid,
}

impl Task {
    /// Inserts a task row
    pub async fn create(
        db: impl PgExecutor<'_>,
        data: CreateTaskRow,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, project_id, title, description, status, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(db)
        .await
    }

    /// Finds a task by ID
    pub async fn find(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, created_by,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Updates the mutable fields of a task row
    pub async fn update(
        db: impl PgExecutor<'_>,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, title, description, status, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(status)
        .fetch_optional(db)
        .await
    }

    /// Lists tasks in a project
    pub async fn list_by_project(
        db: impl PgExecutor<'_>,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, created_by,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await
    }
}

/// Operations on the task-assignment join
///
/// The join has no identity of its own, so this is a namespace struct
/// rather than a FromRow model.
pub struct TaskAssignment;

impl TaskAssignment {
    /// Lists the user IDs currently assigned to a task
    ///
    /// The update flow calls this before `replace_all` — the diff against
    /// the pre-replace set decides who gets an assignment notification.
    pub async fn list_user_ids(
        db: impl PgExecutor<'_>,
        task_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM task_assignments WHERE task_id = $1 ORDER BY user_id",
        )
        .bind(task_id)
        .fetch_all(db)
        .await
    }

    /// Deletes all assignment rows for a task
    pub async fn delete_all(db: impl PgExecutor<'_>, task_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignments WHERE task_id = $1")
            .bind(task_id)
            .execute(db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Inserts one assignment row
    pub async fn create(
        db: impl PgExecutor<'_>,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO task_assignments (task_id, user_id) VALUES ($1, $2)")
            .bind(task_id)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }
}

/// Computes which assignees are new relative to the previous set
///
/// Only net-new assignees receive a notification; users kept across the
/// update and users removed by it get nothing.
pub fn added_assignees(old: &[Uuid], new: &[Uuid]) -> Vec<Uuid> {
    new.iter()
        .filter(|id| !old.contains(id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_added_assignees_basic_diff() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let z = Uuid::new_v4();

        // {X, Y} -> {Y, Z}: only Z is net-new.
        let added = added_assignees(&[x, y], &[y, z]);
        assert_eq!(added, vec![z]);
    }

    #[test]
    fn test_added_assignees_empty_old_set() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();

        // On create the old set is empty, so everyone is net-new.
        let added = added_assignees(&[], &[x, y]);
        assert_eq!(added, vec![x, y]);
    }

    #[test]
    fn test_added_assignees_no_changes() {
        let x = Uuid::new_v4();

        assert!(added_assignees(&[x], &[x]).is_empty());
        assert!(added_assignees(&[x], &[]).is_empty());
        assert!(added_assignees(&[], &[]).is_empty());
    }
}
