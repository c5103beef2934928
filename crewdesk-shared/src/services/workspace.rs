/// Workspace flows
///
/// Workspace creation inserts the workspace row and the creator's OWNER
/// membership in one transaction — no workspace is ever observable with
/// zero OWNER memberships. Member management is OWNER-gated and applies
/// the role-update guard: the workspace OWNER's role is immutable through
/// this flow (ownership transfer is not supported), and a requester may
/// never leave the workspace leaderless through a self-change.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::rbac::AccessControl;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{PublicUser, User};
use crate::models::workspace::Workspace;
use crate::models::workspace_member::{WorkspaceMember, WorkspaceRole};

/// Input for creating a workspace
#[derive(Debug, Clone)]
pub struct CreateWorkspaceInput {
    /// Workspace display name
    pub name: String,
}

/// Input for adding a member to a workspace
#[derive(Debug, Clone)]
pub struct AddWorkspaceMemberInput {
    /// User to add
    pub user_id: Uuid,

    /// Role to grant
    pub role: WorkspaceRole,
}

/// Input for updating a member's role
#[derive(Debug, Clone)]
pub struct UpdateWorkspaceMemberRoleInput {
    /// Member whose role changes
    pub user_id: Uuid,

    /// New role
    pub role: WorkspaceRole,
}

/// Result of a role update: the new role plus who it applies to
#[derive(Debug, Clone)]
pub struct WorkspaceMemberRoleUpdate {
    /// The member's public identity
    pub user: PublicUser,

    /// The role now in effect
    pub role: WorkspaceRole,
}

/// Workspace service
#[derive(Clone)]
pub struct WorkspaceService {
    pool: PgPool,
    access: AccessControl,
}

impl WorkspaceService {
    /// Creates the service with its dependencies injected
    pub fn new(pool: PgPool, access: AccessControl) -> Self {
        Self { pool, access }
    }

    /// Creates a workspace owned by the actor
    ///
    /// Any authenticated, non-banned identity may create workspaces (the
    /// middleware guarantees both). The workspace row and the creator's
    /// OWNER membership commit together or not at all.
    pub async fn create_workspace(
        &self,
        actor_id: Uuid,
        input: CreateWorkspaceInput,
    ) -> ServiceResult<Workspace> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Workspace name is required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let workspace = Workspace::create(&mut *tx, name, actor_id).await?;
        WorkspaceMember::create(&mut *tx, workspace.id, actor_id, WorkspaceRole::Owner).await?;
        tx.commit().await?;

        info!(workspace_id = %workspace.id, owner_id = %actor_id, "Created workspace");

        Ok(workspace)
    }

    /// Adds a member to a workspace
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor is the workspace OWNER
    /// - `NotFound` when the workspace or user does not exist
    /// - `InvalidInput` when the user is already a member
    pub async fn add_member(
        &self,
        actor_id: Uuid,
        workspace_id: Uuid,
        input: AddWorkspaceMemberInput,
    ) -> ServiceResult<WorkspaceMember> {
        if Workspace::find(&self.pool, workspace_id).await?.is_none() {
            return Err(ServiceError::NotFound("workspace"));
        }

        if !self
            .access
            .has_workspace_access(workspace_id, actor_id, WorkspaceRole::Owner)
            .await?
        {
            return Err(ServiceError::forbidden_workspace(WorkspaceRole::Owner));
        }

        if User::find(&self.pool, input.user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }

        if WorkspaceMember::find(&self.pool, workspace_id, input.user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::InvalidInput(
                "User is already a member of this workspace".to_string(),
            ));
        }

        let member =
            WorkspaceMember::create(&self.pool, workspace_id, input.user_id, input.role).await?;

        info!(
            workspace_id = %workspace_id,
            user_id = %input.user_id,
            role = input.role.as_str(),
            "Added workspace member"
        );

        Ok(member)
    }

    /// Updates a member's role
    ///
    /// The guard order is fixed: the OWNER's role is rejected outright
    /// (ownership transfer is not supported by this flow), then a
    /// self-change is rejected when the requester is the only holder of
    /// the top role — the workspace must never be left leaderless.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor is the workspace OWNER
    /// - `InvalidInput` for a non-member target, an OWNER target, or a
    ///   leaderless self-change
    pub async fn update_member_role(
        &self,
        actor_id: Uuid,
        workspace_id: Uuid,
        input: UpdateWorkspaceMemberRoleInput,
    ) -> ServiceResult<WorkspaceMemberRoleUpdate> {
        if !self
            .access
            .has_workspace_access(workspace_id, actor_id, WorkspaceRole::Owner)
            .await?
        {
            return Err(ServiceError::forbidden_workspace(WorkspaceRole::Owner));
        }

        let target = WorkspaceMember::find(&self.pool, workspace_id, input.user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(
                    "User is not a member of this workspace".to_string(),
                )
            })?;

        if target.role == WorkspaceRole::Owner {
            return Err(ServiceError::InvalidInput(
                "The workspace owner's role cannot be changed".to_string(),
            ));
        }

        if input.user_id == actor_id {
            let other_owners = WorkspaceMember::count_role_holders_excluding(
                &self.pool,
                workspace_id,
                WorkspaceRole::Owner,
                actor_id,
            )
            .await?;

            if other_owners == 0 {
                return Err(ServiceError::InvalidInput(
                    "Cannot change your own role as the only workspace owner".to_string(),
                ));
            }
        }

        let updated =
            WorkspaceMember::update_role(&self.pool, workspace_id, input.user_id, input.role)
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidInput(
                        "User is not a member of this workspace".to_string(),
                    )
                })?;

        let user = User::find(&self.pool, input.user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        info!(
            workspace_id = %workspace_id,
            user_id = %input.user_id,
            role = updated.role.as_str(),
            "Updated workspace member role"
        );

        Ok(WorkspaceMemberRoleUpdate {
            user: PublicUser::from(&user),
            role: updated.role,
        })
    }

    /// Removes a member from a workspace
    ///
    /// An OWNER may never remove themselves, co-owners or not — there is
    /// no promotion path that could restore ownership afterwards.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the actor is the workspace OWNER
    /// - `InvalidInput` for self-removal or a non-member target
    pub async fn remove_member(
        &self,
        actor_id: Uuid,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<()> {
        if !self
            .access
            .has_workspace_access(workspace_id, actor_id, WorkspaceRole::Owner)
            .await?
        {
            return Err(ServiceError::forbidden_workspace(WorkspaceRole::Owner));
        }

        if user_id == actor_id {
            return Err(ServiceError::InvalidInput(
                "Owners cannot remove themselves from a workspace".to_string(),
            ));
        }

        let removed = WorkspaceMember::delete(&self.pool, workspace_id, user_id).await?;
        if !removed {
            return Err(ServiceError::InvalidInput(
                "User is not a member of this workspace".to_string(),
            ));
        }

        info!(
            workspace_id = %workspace_id,
            user_id = %user_id,
            "Removed workspace member"
        );

        Ok(())
    }
}
