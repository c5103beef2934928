/// Integration tests for the RBAC resolver
///
/// Covers rank monotonicity against live membership rows, the
/// no-implicit-workspace-access rule, VIEWER auto-provisioning on the
/// project fallback path, and the one-directional inheritance edge.
///
/// DATABASE_URL=postgresql://... cargo test --test rbac_tests -- --ignored

mod common;

use common::{create_test_user, test_access_control, test_pool};
use crewdesk_shared::models::project::Project;
use crewdesk_shared::models::project_member::{ProjectMember, ProjectRole};
use crewdesk_shared::models::workspace::Workspace;
use crewdesk_shared::models::workspace_member::{WorkspaceMember, WorkspaceRole};
use sqlx::PgPool;
use uuid::Uuid;

async fn seed_workspace(pool: &PgPool, owner_id: Uuid) -> Workspace {
    let workspace = Workspace::create(pool, "rbac test workspace", owner_id)
        .await
        .unwrap();
    WorkspaceMember::create(pool, workspace.id, owner_id, WorkspaceRole::Owner)
        .await
        .unwrap();
    workspace
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_workspace_rank_monotonicity() {
    let pool = test_pool().await;
    let access = test_access_control(pool.clone());
    let owner = create_test_user(&pool).await;
    let workspace = seed_workspace(&pool, owner.id).await;

    // OWNER satisfies every minimum level.
    for minimum in [
        WorkspaceRole::Owner,
        WorkspaceRole::Member,
        WorkspaceRole::Viewer,
    ] {
        assert!(access
            .has_workspace_access(workspace.id, owner.id, minimum)
            .await
            .unwrap());
    }

    let viewer = create_test_user(&pool).await;
    WorkspaceMember::create(&pool, workspace.id, viewer.id, WorkspaceRole::Viewer)
        .await
        .unwrap();

    assert!(access
        .has_workspace_access(workspace.id, viewer.id, WorkspaceRole::Viewer)
        .await
        .unwrap());
    assert!(!access
        .has_workspace_access(workspace.id, viewer.id, WorkspaceRole::Member)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_workspace_access_is_never_implicit() {
    let pool = test_pool().await;
    let access = test_access_control(pool.clone());
    let owner = create_test_user(&pool).await;
    let outsider = create_test_user(&pool).await;
    let workspace = seed_workspace(&pool, owner.id).await;

    assert!(access
        .workspace_role(workspace.id, outsider.id)
        .await
        .unwrap()
        .is_none());
    assert!(!access
        .has_workspace_access(workspace.id, outsider.id, WorkspaceRole::Viewer)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_project_viewer_is_auto_provisioned_for_workspace_member() {
    let pool = test_pool().await;
    let access = test_access_control(pool.clone());
    let owner = create_test_user(&pool).await;
    let member = create_test_user(&pool).await;
    let workspace = seed_workspace(&pool, owner.id).await;
    WorkspaceMember::create(&pool, workspace.id, member.id, WorkspaceRole::Member)
        .await
        .unwrap();

    let project = Project::create(&pool, workspace.id, "rbac test project", owner.id)
        .await
        .unwrap();
    ProjectMember::create(&pool, project.id, owner.id, ProjectRole::ProjectLead)
        .await
        .unwrap();

    // No explicit row yet.
    assert!(access
        .project_role(project.id, member.id)
        .await
        .unwrap()
        .is_none());

    // The fallback grants VIEWER...
    assert!(access
        .has_project_access(project.id, member.id, ProjectRole::Viewer)
        .await
        .unwrap());

    // ...and materializes an explicit VIEWER row for the next check.
    let role = access.project_role(project.id, member.id).await.unwrap();
    assert_eq!(role, Some(ProjectRole::Viewer));

    // The implied grant never reaches CONTRIBUTOR.
    assert!(!access
        .has_project_access(project.id, member.id, ProjectRole::Contributor)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_outsider_gets_no_project_access() {
    let pool = test_pool().await;
    let access = test_access_control(pool.clone());
    let owner = create_test_user(&pool).await;
    let outsider = create_test_user(&pool).await;
    let workspace = seed_workspace(&pool, owner.id).await;

    let project = Project::create(&pool, workspace.id, "rbac closed project", owner.id)
        .await
        .unwrap();
    ProjectMember::create(&pool, project.id, owner.id, ProjectRole::ProjectLead)
        .await
        .unwrap();

    assert!(!access
        .has_project_access(project.id, outsider.id, ProjectRole::Viewer)
        .await
        .unwrap());

    // The denied fallback must not leave a membership row behind.
    assert!(access
        .project_role(project.id, outsider.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_project_rights_never_elevate_workspace_rights() {
    let pool = test_pool().await;
    let access = test_access_control(pool.clone());
    let owner = create_test_user(&pool).await;
    let lead = create_test_user(&pool).await;
    let workspace = seed_workspace(&pool, owner.id).await;

    let project = Project::create(&pool, workspace.id, "rbac inheritance project", owner.id)
        .await
        .unwrap();

    // A project lead with no workspace membership at all.
    ProjectMember::create(&pool, project.id, lead.id, ProjectRole::ProjectLead)
        .await
        .unwrap();

    assert!(access
        .has_project_access(project.id, lead.id, ProjectRole::ProjectLead)
        .await
        .unwrap());
    assert!(!access
        .has_workspace_access(workspace.id, lead.id, WorkspaceRole::Viewer)
        .await
        .unwrap());
}
