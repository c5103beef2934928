/// Workspace endpoints
///
/// # Endpoints
///
/// - `POST   /v1/workspaces` — create a workspace (caller becomes OWNER)
/// - `GET    /v1/workspaces` — list the caller's workspaces
/// - `POST   /v1/workspaces/:id/members` — add a member (OWNER only)
/// - `PUT    /v1/workspaces/:id/members/:user_id` — update a member's role
/// - `DELETE /v1/workspaces/:id/members/:user_id` — remove a member

use crate::{
    app::AppState,
    error::{validation_details, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::auth::middleware::CurrentUser;
use crewdesk_shared::models::user::PublicUser;
use crewdesk_shared::models::workspace::Workspace;
use crewdesk_shared::models::workspace_member::{WorkspaceMember, WorkspaceRole};
use crewdesk_shared::services::workspace::{
    AddWorkspaceMemberInput, CreateWorkspaceInput, UpdateWorkspaceMemberRoleInput,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create-workspace request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    /// Workspace name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Add-member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Role to grant
    pub role: WorkspaceRole,
}

/// Update-member-role request
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role
    pub role: WorkspaceRole,
}

/// Role-update response: the new role plus who it applies to
#[derive(Debug, Serialize)]
pub struct MemberRoleResponse {
    /// The member's public identity
    pub user: PublicUser,

    /// The role now in effect
    pub role: WorkspaceRole,
}

/// `POST /v1/workspaces`
///
/// Any authenticated, non-banned user may create a workspace; the
/// creator's OWNER membership commits in the same transaction.
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<Json<Workspace>> {
    req.validate().map_err(validation_details)?;

    let workspace = state
        .workspaces
        .create_workspace(user.user_id, CreateWorkspaceInput { name: req.name })
        .await?;

    Ok(Json(workspace))
}

/// `GET /v1/workspaces`
pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Workspace>>> {
    let workspaces = Workspace::list_for_user(&state.db, user.user_id).await?;

    Ok(Json(workspaces))
}

/// `POST /v1/workspaces/:id/members`
///
/// # Errors
///
/// - `403`: caller is not the workspace OWNER
/// - `400`: target is already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(workspace_id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<WorkspaceMember>> {
    let member = state
        .workspaces
        .add_member(
            user.user_id,
            workspace_id,
            AddWorkspaceMemberInput {
                user_id: req.user_id,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(member))
}

/// `PUT /v1/workspaces/:id/members/:user_id`
///
/// # Errors
///
/// - `403`: caller is not the workspace OWNER
/// - `400`: target is the OWNER, target is not a member, or the change
///   would leave the workspace leaderless
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<MemberRoleResponse>> {
    let update = state
        .workspaces
        .update_member_role(
            user.user_id,
            workspace_id,
            UpdateWorkspaceMemberRoleInput {
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

/// `DELETE /v1/workspaces/:id/members/:user_id`
///
/// # Errors
///
/// - `403`: caller is not the workspace OWNER
/// - `400`: self-removal, or target is not a member
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((workspace_id, target_user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .workspaces
        .remove_member(user.user_id, workspace_id, target_user_id)
        .await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
