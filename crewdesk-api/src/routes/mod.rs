/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout,
///   logout-all, password change)
/// - `workspaces`: Workspace creation and member management
/// - `projects`: Project creation and member management
/// - `tasks`: Task create/update with assignment sets

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod workspaces;
