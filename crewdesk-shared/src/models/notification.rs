/// Notification request model
///
/// A notification row is a *request* for delivery, not the delivery
/// itself — channels (email, push, in-app) consume these rows outside
/// this repository. The row is written on the same transaction connection
/// as the task write that caused it, so a rolled-back task mutation never
/// leaves a dangling notification.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_kind AS ENUM ('task_assigned');
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     kind notification_kind NOT NULL,
///     task_id UUID REFERENCES tasks(id) ON DELETE CASCADE,
///     actor_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Kind of notification requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// The user was added to a task's assignee set
    TaskAssigned,
}

/// Notification request row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient
    pub user_id: Uuid,

    /// What happened
    pub kind: NotificationKind,

    /// Task the notification refers to
    pub task_id: Option<Uuid>,

    /// User whose action triggered it
    pub actor_id: Option<Uuid>,

    /// When the request was recorded
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Inserts a notification request row
    pub async fn create(
        db: impl PgExecutor<'_>,
        user_id: Uuid,
        kind: NotificationKind,
        task_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, task_id, actor_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, kind, task_id, actor_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(task_id)
        .bind(actor_id)
        .fetch_one(db)
        .await
    }

    /// Lists notification requests for a user, newest first
    pub async fn list_for_user(
        db: impl PgExecutor<'_>,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, task_id, actor_id, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::TaskAssigned).unwrap(),
            "\"TASK_ASSIGNED\""
        );
    }
}
