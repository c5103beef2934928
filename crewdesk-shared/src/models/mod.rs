/// Database models for Crewdesk
///
/// This module contains all database models and their query operations.
/// Model methods take `impl PgExecutor<'_>` so the same query runs against
/// the pool directly or inside a transaction; the transactional service
/// flows rely on this to compose multi-row writes atomically.
///
/// # Models
///
/// - `user`: Identities with global status (active/banned/admin)
/// - `workspace`: Top-level tenant container
/// - `workspace_member`: User-workspace membership with OWNER/MEMBER/VIEWER roles
/// - `project`: Projects within a workspace
/// - `project_member`: User-project membership with PROJECT_LEAD/CONTRIBUTOR/VIEWER roles
/// - `task`: Tasks within a project, plus the task-assignment join
/// - `notification`: Persisted notification requests

pub mod notification;
pub mod project;
pub mod project_member;
pub mod task;
pub mod user;
pub mod workspace;
pub mod workspace_member;
