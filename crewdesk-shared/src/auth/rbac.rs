/// Hierarchy-aware role resolution
///
/// Answers "may this identity perform this action at this level?" with a
/// single rank comparison per level, and transparently provisions
/// inherited project access.
///
/// # Permission Model
///
/// Two independent role families gate the Workspace → Project → Task
/// hierarchy:
///
/// 1. **Workspace**: OWNER > MEMBER > VIEWER. Membership is always
///    explicit — no row means no access.
/// 2. **Project**: PROJECT_LEAD > CONTRIBUTOR > VIEWER. A user without an
///    explicit row but with at least workspace VIEWER gets implied
///    project VIEWER access, which is materialized as an explicit row the
///    first time it is exercised so later checks short-circuit.
///
/// Inheritance is one-directional: project rights never elevate workspace
/// rights.
///
/// Resolver methods return booleans and `Option`s rather than failing;
/// the mutation flows translate `false` into a Forbidden error carrying
/// the required level. No role state is cached in-process — a role change
/// is visible to the next request.
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::auth::rbac::AccessControl;
/// use crewdesk_shared::models::workspace_member::WorkspaceRole;
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, workspace_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let access = AccessControl::new(pool);
///
/// if access.has_workspace_access(workspace_id, user_id, WorkspaceRole::Member).await? {
///     // proceed with a member-level operation
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::project_member::{ProjectMember, ProjectRole};
use crate::models::workspace_member::{WorkspaceMember, WorkspaceRole};

/// Role resolver over the membership tables
#[derive(Clone)]
pub struct AccessControl {
    pool: PgPool,
}

impl AccessControl {
    /// Creates a resolver over a pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a user's explicit workspace role, if any
    pub async fn workspace_role(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceRole>, sqlx::Error> {
        WorkspaceMember::get_role(&self.pool, workspace_id, user_id).await
    }

    /// Whether a user's workspace role satisfies `minimum`
    ///
    /// No membership row means no access — workspace membership is never
    /// auto-provisioned.
    pub async fn has_workspace_access(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
        minimum: WorkspaceRole,
    ) -> Result<bool, sqlx::Error> {
        match self.workspace_role(workspace_id, user_id).await? {
            Some(role) => Ok(role.has_at_least(minimum)),
            None => Ok(false),
        }
    }

    /// Gets a user's explicit project role, if any
    ///
    /// Does not consult workspace inheritance; use
    /// [`has_project_access`](Self::has_project_access) for the full
    /// check.
    pub async fn project_role(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        ProjectMember::get_role(&self.pool, project_id, user_id).await
    }

    /// Whether a user's project role satisfies `minimum`
    ///
    /// With an explicit membership row this is a plain rank comparison.
    /// Without one, falls back to the owning workspace: at least
    /// workspace VIEWER implies project VIEWER, and the implied grant is
    /// materialized as an explicit VIEWER row so subsequent checks skip
    /// the fallback. The implied grant satisfies VIEWER-level minimums
    /// only.
    pub async fn has_project_access(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        minimum: ProjectRole,
    ) -> Result<bool, sqlx::Error> {
        if let Some(role) = self.project_role(project_id, user_id).await? {
            return Ok(role.has_at_least(minimum));
        }

        let Some(workspace_id) = Project::workspace_id_of(&self.pool, project_id).await? else {
            return Ok(false);
        };

        let inherited = self
            .has_workspace_access(workspace_id, user_id, WorkspaceRole::Viewer)
            .await?;

        if !inherited {
            return Ok(false);
        }

        ProjectMember::create_if_absent(&self.pool, project_id, user_id, ProjectRole::Viewer)
            .await?;

        Ok(ProjectRole::Viewer.has_at_least(minimum))
    }
}
