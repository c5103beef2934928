/// Project endpoints
///
/// # Endpoints
///
/// - `POST /v1/workspaces/:id/projects` — create a project (workspace MEMBER+)
/// - `GET  /v1/workspaces/:id/projects` — list projects (workspace VIEWER+)
/// - `POST /v1/projects/:id/members` — add a member (lead or workspace OWNER)
/// - `PUT  /v1/projects/:id/members/:user_id` — update a member's role

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::auth::middleware::CurrentUser;
use crewdesk_shared::models::project::Project;
use crewdesk_shared::models::project_member::{ProjectMember, ProjectRole};
use crewdesk_shared::models::user::PublicUser;
use crewdesk_shared::models::workspace_member::WorkspaceRole;
use crewdesk_shared::services::project::{
    AddProjectMemberInput, CreateProjectInput, UpdateProjectMemberRoleInput,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create-project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Add-member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Role to grant
    pub role: ProjectRole,
}

/// Update-member-role request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role
    pub role: ProjectRole,
}

/// Role-update response: the new role plus who it applies to
#[derive(Debug, Serialize)]
pub struct MemberRoleResponse {
    /// The member's public identity
    pub user: PublicUser,

    /// The role now in effect
    pub role: ProjectRole,
}

/// `POST /v1/workspaces/:id/projects`
///
/// # Errors
///
/// - `403`: caller is below workspace MEMBER
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_details)?;

    let project = state
        .projects
        .create_project(user.user_id, workspace_id, CreateProjectInput { name: req.name })
        .await?;

    Ok(Json(project))
}

/// `GET /v1/workspaces/:id/projects`
///
/// Requires workspace VIEWER; listing does not auto-provision project
/// memberships — only exercising a specific project does.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Project>>> {
    let allowed = state
        .access
        .has_workspace_access(workspace_id, user.user_id, WorkspaceRole::Viewer)
        .await?;

    if !allowed {
        return Err(ApiError::Forbidden(
            "Requires at least workspace viewer access".to_string(),
        ));
    }

    let projects = Project::list_by_workspace(&state.db, workspace_id).await?;

    Ok(Json(projects))
}

/// `POST /v1/projects/:id/members`
///
/// # Errors
///
/// - `403`: caller is neither a PROJECT_LEAD nor the workspace OWNER
/// - `400`: target is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<ProjectMember>> {
    let member = state
        .projects
        .add_member(
            user.user_id,
            project_id,
            AddProjectMemberInput {
                user_id: req.user_id,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(member))
}

/// `PUT /v1/projects/:id/members/:user_id`
///
/// # Errors
///
/// - `403`: caller is neither a PROJECT_LEAD nor the workspace OWNER
/// - `400`: target is not a member, or the caller is the sole lead
///   changing their own role
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((project_id, target_user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<MemberRoleResponse>> {
    let update = state
        .projects
        .update_member_role(
            user.user_id,
            project_id,
            UpdateProjectMemberRoleInput {
                user_id: target_user_id,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(MemberRoleResponse {
        user: update.user,
        role: update.role,
    }))
}
