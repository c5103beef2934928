/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/projects/:id/tasks` — create a task with assignees
/// - `GET  /v1/projects/:id/tasks` — list a project's tasks
/// - `PUT  /v1/tasks/:id` — update a task, replacing its assignee set

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::auth::middleware::CurrentUser;
use crewdesk_shared::models::project_member::ProjectRole;
use crewdesk_shared::models::task::{Task, TaskStatus};
use crewdesk_shared::services::task::{CreateTaskInput, UpdateTaskInput};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create-task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status (defaults to TODO)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Users to assign; every one must have project access
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
}

/// Update-task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 500, message = "Title must be 1-500 characters"))]
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New status
    pub status: TaskStatus,

    /// The full replacement assignee set
    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

/// `POST /v1/projects/:id/tasks`
///
/// # Errors
///
/// - `403`: caller is below project CONTRIBUTOR
/// - `400`: an assignee lacks project access (the message names them)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_details)?;

    let task = state
        .tasks
        .create_task(
            user.user_id,
            project_id,
            CreateTaskInput {
                title: req.title,
                description: req.description,
                status: req.status,
                assignee_ids: req.assignee_ids,
            },
        )
        .await?;

    Ok(Json(task))
}

/// `GET /v1/projects/:id/tasks`
///
/// Requires project VIEWER. A workspace member without an explicit
/// project row passes via the inherited grant, which this check
/// materializes as a VIEWER membership.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let allowed = state
        .access
        .has_project_access(project_id, user.user_id, ProjectRole::Viewer)
        .await?;

    if !allowed {
        return Err(ApiError::Forbidden(
            "Requires at least project viewer access".to_string(),
        ));
    }

    let tasks = Task::list_by_project(&state.db, project_id).await?;

    Ok(Json(tasks))
}

/// `PUT /v1/tasks/:id`
///
/// Replaces the assignee set wholesale; only net-new assignees get a
/// notification. A status change publishes a real-time event after
/// commit.
///
/// # Errors
///
/// - `404`: task does not exist
/// - `403`: caller is below project CONTRIBUTOR
/// - `400`: an assignee lacks project access
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(validation_details)?;

    let task = state
        .tasks
        .update_task(
            user.user_id,
            task_id,
            UpdateTaskInput {
                title: req.title,
                description: req.description,
                status: req.status,
                assignee_ids: req.assignee_ids,
            },
        )
        .await?;

    Ok(Json(task))
}
