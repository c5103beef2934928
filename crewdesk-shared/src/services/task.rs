/// Task flows with assignment diffing
///
/// Task create/update composes three things inside one transaction: the
/// task row write, the wholesale replacement of the assignment join, and
/// the notification requests for net-new assignees. Replacement is
/// delete-all/re-insert-all; correctness of the notification diff rests
/// on reading the old assignee set *before* the replace. The status-change
/// event goes out only after commit, and only when the status actually
/// changed.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::rbac::AccessControl;
use crate::error::{ServiceError, ServiceResult};
use crate::events::{Notifier, RealtimePublisher};
use crate::models::project_member::ProjectRole;
use crate::models::task::{added_assignees, CreateTaskRow, Task, TaskAssignment, TaskStatus};

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Users to assign
    pub assignee_ids: Vec<Uuid>,
}

/// Input for updating a task
#[derive(Debug, Clone)]
pub struct UpdateTaskInput {
    /// New title
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: TaskStatus,

    /// The full replacement assignee set
    pub assignee_ids: Vec<Uuid>,
}

/// Task service
#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
    access: AccessControl,
    notifier: Arc<dyn Notifier>,
    realtime: Arc<dyn RealtimePublisher>,
}

impl TaskService {
    /// Creates the service with its dependencies injected
    pub fn new(
        pool: PgPool,
        access: AccessControl,
        notifier: Arc<dyn Notifier>,
        realtime: Arc<dyn RealtimePublisher>,
    ) -> Self {
        Self {
            pool,
            access,
            notifier,
            realtime,
        }
    }

    /// Creates a task with its initial assignee set
    ///
    /// The actor needs project CONTRIBUTOR; every proposed assignee must
    /// independently hold at least project VIEWER (workspace members
    /// without an explicit project row pass via the inherited grant,
    /// which this check materializes). On create the previous assignee
    /// set is empty, so every assignee gets a notification request.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when the actor lacks CONTRIBUTOR
    /// - `InvalidInput` naming the first assignee without project access
    pub async fn create_task(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        input: CreateTaskInput,
    ) -> ServiceResult<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Task title is required".to_string(),
            ));
        }

        if !self
            .access
            .has_project_access(project_id, actor_id, ProjectRole::Contributor)
            .await?
        {
            return Err(ServiceError::forbidden_project(ProjectRole::Contributor));
        }

        let assignees = dedupe(&input.assignee_ids);
        self.require_assignees_have_access(project_id, &assignees)
            .await?;

        let mut tx = self.pool.begin().await?;

        let task = Task::create(
            &mut *tx,
            CreateTaskRow {
                project_id,
                title: title.to_string(),
                description: input.description,
                status: input.status,
                created_by: actor_id,
            },
        )
        .await?;

        for assignee_id in &assignees {
            TaskAssignment::create(&mut *tx, task.id, *assignee_id).await?;
            self.notifier
                .notify_task_assigned(&mut *tx, &task, *assignee_id, actor_id)
                .await?;
        }

        tx.commit().await?;

        info!(
            task_id = %task.id,
            project_id = %project_id,
            assignees = assignees.len(),
            "Created task"
        );

        Ok(task)
    }

    /// Updates a task, replacing its assignee set
    ///
    /// The join rows are replaced wholesale (delete-all, re-insert-all);
    /// the old set is read before the replace and only `new − old`
    /// assignees get notification requests. Users removed from the task
    /// are not notified. After commit, a status-changed event is
    /// published iff the status differs from the prior value.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the task does not exist
    /// - `Forbidden` when the actor lacks CONTRIBUTOR
    /// - `InvalidInput` naming the first assignee without project access
    pub async fn update_task(
        &self,
        actor_id: Uuid,
        task_id: Uuid,
        input: UpdateTaskInput,
    ) -> ServiceResult<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Task title is required".to_string(),
            ));
        }

        let existing = Task::find(&self.pool, task_id)
            .await?
            .ok_or(ServiceError::NotFound("task"))?;
        let previous_status = existing.status;

        if !self
            .access
            .has_project_access(existing.project_id, actor_id, ProjectRole::Contributor)
            .await?
        {
            return Err(ServiceError::forbidden_project(ProjectRole::Contributor));
        }

        let assignees = dedupe(&input.assignee_ids);
        self.require_assignees_have_access(existing.project_id, &assignees)
            .await?;

        let mut tx = self.pool.begin().await?;

        // The old set must come from before the replace; the diff below
        // depends on it.
        let old_assignees = TaskAssignment::list_user_ids(&mut *tx, task_id).await?;

        let task = Task::update(
            &mut *tx,
            task_id,
            title,
            input.description.as_deref(),
            input.status,
        )
        .await?
        .ok_or(ServiceError::NotFound("task"))?;

        TaskAssignment::delete_all(&mut *tx, task_id).await?;
        for assignee_id in &assignees {
            TaskAssignment::create(&mut *tx, task_id, *assignee_id).await?;
        }

        let added = added_assignees(&old_assignees, &assignees);
        for assignee_id in &added {
            self.notifier
                .notify_task_assigned(&mut *tx, &task, *assignee_id, actor_id)
                .await?;
        }

        tx.commit().await?;

        info!(
            task_id = %task_id,
            added = added.len(),
            "Updated task"
        );

        if task.status != previous_status {
            self.realtime
                .publish_status_changed(&task, previous_status)
                .await;
        }

        Ok(task)
    }

    /// Checks every proposed assignee for project access
    ///
    /// Fails with a user-input error naming the offending user, so the
    /// caller can fix the request rather than guess.
    async fn require_assignees_have_access(
        &self,
        project_id: Uuid,
        assignee_ids: &[Uuid],
    ) -> ServiceResult<()> {
        for assignee_id in assignee_ids {
            let ok = self
                .access
                .has_project_access(project_id, *assignee_id, ProjectRole::Viewer)
                .await?;

            if !ok {
                return Err(ServiceError::InvalidInput(format!(
                    "User {} is not a member of this project",
                    assignee_id
                )));
            }
        }

        Ok(())
    }
}

/// Removes duplicate IDs while preserving order
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
