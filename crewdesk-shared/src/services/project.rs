/// Project flows
///
/// Project creation requires workspace MEMBER and inserts the project row
/// plus the creator's PROJECT_LEAD membership in one transaction. Member
/// management is open to the project's leads and to the owning
/// workspace's OWNER; the sole-lead guard keeps a project from going
/// leaderless through a self-change.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::rbac::AccessControl;
use crate::error::{ServiceError, ServiceResult};
use crate::models::project::Project;
use crate::models::project_member::{ProjectMember, ProjectRole};
use crate::models::user::{PublicUser, User};
use crate::models::workspace_member::WorkspaceRole;

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Project display name
    pub name: String,
}

/// Input for adding a member to a project
#[derive(Debug, Clone)]
pub struct AddProjectMemberInput {
    /// User to add
    pub user_id: Uuid,

    /// Role to grant
    pub role: ProjectRole,
}

/// Input for updating a member's role
#[derive(Debug, Clone)]
pub struct UpdateProjectMemberRoleInput {
    /// Member whose role changes
    pub user_id: Uuid,

    /// New role
    pub role: ProjectRole,
}

/// Result of a role update: the new role plus who it applies to
#[derive(Debug, Clone)]
pub struct ProjectMemberRoleUpdate {
    /// The member's public identity
    pub user: PublicUser,

    /// The role now in effect
    pub role: ProjectRole,
}

/// Project service
#[derive(Clone)]
pub struct ProjectService {
    pool: PgPool,
    access: AccessControl,
}

impl ProjectService {
    /// Creates the service with its dependencies injected
    pub fn new(pool: PgPool, access: AccessControl) -> Self {
        Self { pool, access }
    }

    /// Creates a project led by the actor
    ///
    /// Requires at least workspace MEMBER. The project row and the
    /// creator's PROJECT_LEAD membership commit together or not at all.
    pub async fn create_project(
        &self,
        actor_id: Uuid,
        workspace_id: Uuid,
        input: CreateProjectInput,
    ) -> ServiceResult<Project> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Project name is required".to_string(),
            ));
        }

        if !self
            .access
            .has_workspace_access(workspace_id, actor_id, WorkspaceRole::Member)
            .await?
        {
            return Err(ServiceError::forbidden_workspace(WorkspaceRole::Member));
        }

        let mut tx = self.pool.begin().await?;
        let project = Project::create(&mut *tx, workspace_id, name, actor_id).await?;
        ProjectMember::create(&mut *tx, project.id, actor_id, ProjectRole::ProjectLead).await?;
        tx.commit().await?;

        info!(project_id = %project.id, lead_id = %actor_id, "Created project");

        Ok(project)
    }

    /// Whether the actor may manage this project's members
    ///
    /// PROJECT_LEAD on the project or OWNER on the owning workspace.
    /// Checked against explicit roles only — the auto-provisioned VIEWER
    /// grant never reaches lead level.
    async fn can_manage_members(
        &self,
        project: &Project,
        actor_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        if let Some(role) = self.access.project_role(project.id, actor_id).await? {
            if role.has_at_least(ProjectRole::ProjectLead) {
                return Ok(true);
            }
        }

        self.access
            .has_workspace_access(project.workspace_id, actor_id, WorkspaceRole::Owner)
            .await
    }

    /// Adds a member to a project
    ///
    /// # Errors
    ///
    /// - `NotFound` when the project or user does not exist
    /// - `Forbidden` unless the actor is a lead or the workspace OWNER
    /// - `InvalidInput` when the user is already a member
    pub async fn add_member(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        input: AddProjectMemberInput,
    ) -> ServiceResult<ProjectMember> {
        let project = Project::find(&self.pool, project_id)
            .await?
            .ok_or(ServiceError::NotFound("project"))?;

        if !self.can_manage_members(&project, actor_id).await? {
            return Err(ServiceError::forbidden_project(ProjectRole::ProjectLead));
        }

        if User::find(&self.pool, input.user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }

        if ProjectMember::find(&self.pool, project_id, input.user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::InvalidInput(
                "User is already a member of this project".to_string(),
            ));
        }

        let member =
            ProjectMember::create(&self.pool, project_id, input.user_id, input.role).await?;

        info!(
            project_id = %project_id,
            user_id = %input.user_id,
            role = input.role.as_str(),
            "Added project member"
        );

        Ok(member)
    }

    /// Updates a member's role
    ///
    /// The sole-lead guard: a requester changing their own role while
    /// being the project's only PROJECT_LEAD is rejected, leaving the
    /// membership table untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the project does not exist
    /// - `Forbidden` unless the actor is a lead or the workspace OWNER
    /// - `InvalidInput` for a non-member target or a leaderless
    ///   self-change
    pub async fn update_member_role(
        &self,
        actor_id: Uuid,
        project_id: Uuid,
        input: UpdateProjectMemberRoleInput,
    ) -> ServiceResult<ProjectMemberRoleUpdate> {
        let project = Project::find(&self.pool, project_id)
            .await?
            .ok_or(ServiceError::NotFound("project"))?;

        if !self.can_manage_members(&project, actor_id).await? {
            return Err(ServiceError::forbidden_project(ProjectRole::ProjectLead));
        }

        let target = ProjectMember::find(&self.pool, project_id, input.user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput("User is not a member of this project".to_string())
            })?;

        if input.user_id == actor_id && target.role == ProjectRole::ProjectLead {
            let other_leads = ProjectMember::count_role_holders_excluding(
                &self.pool,
                project_id,
                ProjectRole::ProjectLead,
                actor_id,
            )
            .await?;

            if other_leads == 0 {
                return Err(ServiceError::InvalidInput(
                    "Cannot change your own role as the only project lead".to_string(),
                ));
            }
        }

        let updated =
            ProjectMember::update_role(&self.pool, project_id, input.user_id, input.role)
                .await?
                .ok_or_else(|| {
                    ServiceError::InvalidInput(
                        "User is not a member of this project".to_string(),
                    )
                })?;

        let user = User::find(&self.pool, input.user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        info!(
            project_id = %project_id,
            user_id = %input.user_id,
            role = updated.role.as_str(),
            "Updated project member role"
        );

        Ok(ProjectMemberRoleUpdate {
            user: PublicUser::from(&user),
            role: updated.role,
        })
    }
}
