/// Integration tests for the transactional mutation flows
///
/// Covers create-with-root-membership atomicity, the assignment diff's
/// notification behavior, the sole-lead guard, and the post-commit
/// status-change event.
///
/// DATABASE_URL=postgresql://... cargo test --test task_flow_tests -- --ignored

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{create_test_user, test_access_control, test_pool};
use crewdesk_shared::events::{NoopPublisher, PgNotifier, RealtimePublisher};
use crewdesk_shared::models::notification::{Notification, NotificationKind};
use crewdesk_shared::models::project_member::ProjectRole;
use crewdesk_shared::models::task::{Task, TaskStatus};
use crewdesk_shared::models::workspace_member::{WorkspaceMember, WorkspaceRole};
use crewdesk_shared::services::project::{
    AddProjectMemberInput, CreateProjectInput, UpdateProjectMemberRoleInput,
};
use crewdesk_shared::services::task::{CreateTaskInput, UpdateTaskInput};
use crewdesk_shared::services::workspace::{AddWorkspaceMemberInput, CreateWorkspaceInput};
use crewdesk_shared::services::{ProjectService, TaskService, WorkspaceService};
use crewdesk_shared::error::ServiceError;
use sqlx::PgPool;
use uuid::Uuid;

/// Publisher that records every status-change event
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<(Uuid, TaskStatus, TaskStatus)>>,
}

#[async_trait]
impl RealtimePublisher for RecordingPublisher {
    async fn publish_status_changed(&self, task: &Task, previous: TaskStatus) {
        self.events
            .lock()
            .unwrap()
            .push((task.id, previous, task.status));
    }
}

fn workspace_service(pool: &PgPool) -> WorkspaceService {
    WorkspaceService::new(pool.clone(), test_access_control(pool.clone()))
}

fn project_service(pool: &PgPool) -> ProjectService {
    ProjectService::new(pool.clone(), test_access_control(pool.clone()))
}

fn task_service(pool: &PgPool, realtime: Arc<dyn RealtimePublisher>) -> TaskService {
    TaskService::new(
        pool.clone(),
        test_access_control(pool.clone()),
        Arc::new(PgNotifier),
        realtime,
    )
}

/// Seeds a workspace and project with the given user as owner/lead
async fn seed_project(pool: &PgPool, owner_id: Uuid) -> (Uuid, Uuid) {
    let workspace = workspace_service(pool)
        .create_workspace(
            owner_id,
            CreateWorkspaceInput {
                name: "flow test workspace".to_string(),
            },
        )
        .await
        .unwrap();

    let project = project_service(pool)
        .create_project(
            owner_id,
            workspace.id,
            CreateProjectInput {
                name: "flow test project".to_string(),
            },
        )
        .await
        .unwrap();

    (workspace.id, project.id)
}

fn assignment_notifications(notifications: &[Notification], task_id: Uuid) -> usize {
    notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::TaskAssigned && n.task_id == Some(task_id))
        .count()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_workspace_creation_yields_exactly_one_owner_row() {
    let pool = test_pool().await;
    let user = create_test_user(&pool).await;

    let workspace = workspace_service(&pool)
        .create_workspace(
            user.id,
            CreateWorkspaceInput {
                name: "atomicity workspace".to_string(),
            },
        )
        .await
        .unwrap();

    let members = WorkspaceMember::list_by_workspace(&pool, workspace.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, user.id);
    assert_eq!(members[0].role, WorkspaceRole::Owner);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_project_creation_requires_workspace_member() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let viewer = create_test_user(&pool).await;
    let (workspace_id, _) = seed_project(&pool, owner.id).await;

    workspace_service(&pool)
        .add_member(
            owner.id,
            workspace_id,
            AddWorkspaceMemberInput {
                user_id: viewer.id,
                role: WorkspaceRole::Viewer,
            },
        )
        .await
        .unwrap();

    let result = project_service(&pool)
        .create_project(
            viewer.id,
            workspace_id,
            CreateProjectInput {
                name: "viewer project".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Forbidden { .. })));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_assignment_diff_notifies_only_net_new_assignees() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let user_x = create_test_user(&pool).await;
    let user_y = create_test_user(&pool).await;
    let user_z = create_test_user(&pool).await;
    let (workspace_id, project_id) = seed_project(&pool, owner.id).await;

    // X, Y, and Z all get workspace membership; project access arrives
    // via the auto-provisioned VIEWER grant during assignee validation.
    for user in [&user_x, &user_y, &user_z] {
        workspace_service(&pool)
            .add_member(
                owner.id,
                workspace_id,
                AddWorkspaceMemberInput {
                    user_id: user.id,
                    role: WorkspaceRole::Member,
                },
            )
            .await
            .unwrap();
    }

    let tasks = task_service(&pool, Arc::new(NoopPublisher));

    let task = tasks
        .create_task(
            owner.id,
            project_id,
            CreateTaskInput {
                title: "diff task".to_string(),
                description: None,
                status: TaskStatus::Todo,
                assignee_ids: vec![user_x.id, user_y.id],
            },
        )
        .await
        .unwrap();

    // Update {X, Y} -> {Y, Z}.
    tasks
        .update_task(
            owner.id,
            task.id,
            UpdateTaskInput {
                title: "diff task".to_string(),
                description: None,
                status: TaskStatus::Todo,
                assignee_ids: vec![user_y.id, user_z.id],
            },
        )
        .await
        .unwrap();

    // Z: exactly one, from the update.
    let z_notifications = Notification::list_for_user(&pool, user_z.id).await.unwrap();
    assert_eq!(assignment_notifications(&z_notifications, task.id), 1);

    // Y: exactly one, from the create — already assigned at update time.
    let y_notifications = Notification::list_for_user(&pool, user_y.id).await.unwrap();
    assert_eq!(assignment_notifications(&y_notifications, task.id), 1);

    // X: exactly one, from the create — removal does not notify.
    let x_notifications = Notification::list_for_user(&pool, user_x.id).await.unwrap();
    assert_eq!(assignment_notifications(&x_notifications, task.id), 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_non_member_assignee_fails_with_input_error() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let outsider = create_test_user(&pool).await;
    let (_, project_id) = seed_project(&pool, owner.id).await;

    let result = task_service(&pool, Arc::new(NoopPublisher))
        .create_task(
            owner.id,
            project_id,
            CreateTaskInput {
                title: "bad assignee".to_string(),
                description: None,
                status: TaskStatus::Todo,
                assignee_ids: vec![outsider.id],
            },
        )
        .await;

    match result {
        Err(ServiceError::InvalidInput(msg)) => {
            assert!(msg.contains(&outsider.id.to_string()));
        }
        other => panic!("Expected InvalidInput, got {:?}", other.map(|t| t.id)),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_status_change_publishes_exactly_once() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let (_, project_id) = seed_project(&pool, owner.id).await;

    let recorder = Arc::new(RecordingPublisher::default());
    let tasks = task_service(&pool, recorder.clone());

    let task = tasks
        .create_task(
            owner.id,
            project_id,
            CreateTaskInput {
                title: "status task".to_string(),
                description: None,
                status: TaskStatus::Todo,
                assignee_ids: vec![],
            },
        )
        .await
        .unwrap();

    // Same status: no event.
    tasks
        .update_task(
            owner.id,
            task.id,
            UpdateTaskInput {
                title: "status task".to_string(),
                description: Some("retitled only".to_string()),
                status: TaskStatus::Todo,
                assignee_ids: vec![],
            },
        )
        .await
        .unwrap();
    assert!(recorder.events.lock().unwrap().is_empty());

    // Changed status: one event carrying old and new.
    tasks
        .update_task(
            owner.id,
            task.id,
            UpdateTaskInput {
                title: "status task".to_string(),
                description: None,
                status: TaskStatus::InProgress,
                assignee_ids: vec![],
            },
        )
        .await
        .unwrap();

    let events = recorder.events.lock().unwrap();
    assert_eq!(
        events.as_slice(),
        &[(task.id, TaskStatus::Todo, TaskStatus::InProgress)]
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_sole_lead_cannot_change_own_role() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let (_, project_id) = seed_project(&pool, owner.id).await;

    let result = project_service(&pool)
        .update_member_role(
            owner.id,
            project_id,
            UpdateProjectMemberRoleInput {
                user_id: owner.id,
                role: ProjectRole::Contributor,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));

    // The membership table is unchanged.
    let role = test_access_control(pool.clone())
        .project_role(project_id, owner.id)
        .await
        .unwrap();
    assert_eq!(role, Some(ProjectRole::ProjectLead));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_lead_with_co_lead_can_step_down() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let co_lead = create_test_user(&pool).await;
    let (workspace_id, project_id) = seed_project(&pool, owner.id).await;

    workspace_service(&pool)
        .add_member(
            owner.id,
            workspace_id,
            AddWorkspaceMemberInput {
                user_id: co_lead.id,
                role: WorkspaceRole::Member,
            },
        )
        .await
        .unwrap();

    project_service(&pool)
        .add_member(
            owner.id,
            project_id,
            AddProjectMemberInput {
                user_id: co_lead.id,
                role: ProjectRole::ProjectLead,
            },
        )
        .await
        .unwrap();

    let update = project_service(&pool)
        .update_member_role(
            owner.id,
            project_id,
            UpdateProjectMemberRoleInput {
                user_id: owner.id,
                role: ProjectRole::Contributor,
            },
        )
        .await
        .unwrap();

    assert_eq!(update.role, ProjectRole::Contributor);
    assert_eq!(update.user.id, owner.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_workspace_owner_role_is_immutable() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let (workspace_id, _) = seed_project(&pool, owner.id).await;

    let result = workspace_service(&pool)
        .update_member_role(
            owner.id,
            workspace_id,
            crewdesk_shared::services::workspace::UpdateWorkspaceMemberRoleInput {
                user_id: owner.id,
                role: WorkspaceRole::Member,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_owner_cannot_remove_self() {
    let pool = test_pool().await;
    let owner = create_test_user(&pool).await;
    let (workspace_id, _) = seed_project(&pool, owner.id).await;

    let result = workspace_service(&pool)
        .remove_member(owner.id, workspace_id, owner.id)
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}
