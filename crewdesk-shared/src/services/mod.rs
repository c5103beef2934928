/// Transactional mutation flows
///
/// Each service composes an authorization check with an atomic multi-row
/// write plus side effects, so partial writes (a workspace without its
/// owner membership, a task without its notification requests) can never
/// be observed. Every flow runs its writes inside `pool.begin()` ..
/// `tx.commit()`; sqlx rolls the transaction back when it is dropped on
/// any early return.
///
/// # Services
///
/// - `auth`: register, login, refresh (with rotation), logout,
///   revoke-all, change-password
/// - `workspace`: create-with-owner, member management, role-update guard
/// - `project`: create-with-lead, member management, sole-lead guard
/// - `task`: create/update with assignment diffing and notification
///   emission

pub mod auth;
pub mod project;
pub mod task;
pub mod workspace;

pub use auth::AuthService;
pub use project::ProjectService;
pub use task::TaskService;
pub use workspace::WorkspaceService;
