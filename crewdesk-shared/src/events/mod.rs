/// Interfaces to the notification and real-time collaborators
///
/// The mutation flows emit two kinds of side effects through seams
/// defined here:
///
/// - [`Notifier`] records a notification *request* on the caller's
///   transaction connection, so the request lands with the task write or
///   not at all. Delivery channels consume the persisted rows elsewhere.
/// - [`RealtimePublisher`] announces a task status change *after* commit.
///   Transport (websocket fanout, pubsub) is outside this repository;
///   [`NoopPublisher`] ships as the inert default.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::notification::{Notification, NotificationKind};
use crate::models::task::{Task, TaskStatus};

/// Records notification requests inside a mutation's transaction
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Requests a task-assignment notification for one net-new assignee
    ///
    /// Runs on the caller's transaction connection: if the surrounding
    /// task write rolls back, so does the notification request.
    async fn notify_task_assigned(
        &self,
        conn: &mut PgConnection,
        task: &Task,
        assignee_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(), sqlx::Error>;
}

/// Publishes task status changes after commit
#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    /// Announces that a task's status changed from `previous`
    ///
    /// Called only when the status actually differs from the prior
    /// value, and only after the transaction committed. Implementations
    /// must not fail the request — delivery is best-effort.
    async fn publish_status_changed(&self, task: &Task, previous: TaskStatus);
}

/// The shipped notifier: persists requests to the notifications table
pub struct PgNotifier;

#[async_trait]
impl Notifier for PgNotifier {
    async fn notify_task_assigned(
        &self,
        conn: &mut PgConnection,
        task: &Task,
        assignee_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        Notification::create(
            &mut *conn,
            assignee_id,
            NotificationKind::TaskAssigned,
            task.id,
            actor_id,
        )
        .await?;

        Ok(())
    }
}

/// A publisher that drops every event
///
/// Used when no real-time transport is wired up.
pub struct NoopPublisher;

#[async_trait]
impl RealtimePublisher for NoopPublisher {
    async fn publish_status_changed(&self, task: &Task, previous: TaskStatus) {
        tracing::debug!(
            task_id = %task.id,
            from = previous.as_str(),
            to = task.status.as_str(),
            "Dropping status-changed event (no realtime transport configured)"
        );
    }
}
