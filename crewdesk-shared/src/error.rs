/// Shared service error taxonomy
///
/// Every transactional mutation flow returns `Result<T, ServiceError>`.
/// The taxonomy separates the four outcomes that matter to callers:
///
/// - `Authentication`: the caller is not (or no longer) a valid identity.
///   Surfaced as "not authenticated"; never retried automatically.
/// - `Forbidden`: authenticated but insufficient role at the workspace,
///   project, or task level. Carries the required minimum role for
///   diagnostics; transport layers decide how much of that to expose.
/// - `InvalidInput`: a domain-rule violation — duplicate membership,
///   removing the sole OWNER/PROJECT_LEAD, referencing a non-member as
///   assignee, missing required fields.
/// - `NotFound`: the referenced entity does not exist.
/// - `Database`: infrastructure failure. The surrounding transaction has
///   already rolled back; the error is logged and re-thrown, never
///   converted into a success.

use crate::models::project_member::ProjectRole;
use crate::models::workspace_member::WorkspaceRole;

/// Result type alias for service flows
pub type ServiceResult<T> = Result<T, ServiceError>;

/// The minimum role a rejected operation would have required
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// A workspace-level role
    Workspace(WorkspaceRole),

    /// A project-level role
    Project(ProjectRole),
}

impl std::fmt::Display for RequiredRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequiredRole::Workspace(role) => write!(f, "workspace {}", role.as_str()),
            RequiredRole::Project(role) => write!(f, "project {}", role.as_str()),
        }
    }
}

/// Unified error type for the service layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing/invalid/expired credentials, unknown user, or banned user
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authenticated but insufficient role for the operation
    #[error("Forbidden: requires at least {required}")]
    Forbidden {
        /// The minimum role the operation requires
        required: RequiredRole,
    },

    /// Domain-rule violation in the request itself
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Infrastructure failure; the transaction has rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-database infrastructure failure (hashing, token signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::auth::tokens::TokenError> for ServiceError {
    fn from(err: crate::auth::tokens::TokenError) -> Self {
        use crate::auth::tokens::TokenError;
        match err {
            TokenError::Expired => ServiceError::Authentication("Token has expired".to_string()),
            TokenError::Invalid(msg) => ServiceError::Authentication(msg),
            TokenError::Create(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<crate::auth::password::PasswordError> for ServiceError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl ServiceError {
    /// Shorthand for a workspace-level Forbidden
    pub fn forbidden_workspace(required: WorkspaceRole) -> Self {
        ServiceError::Forbidden {
            required: RequiredRole::Workspace(required),
        }
    }

    /// Shorthand for a project-level Forbidden
    pub fn forbidden_project(required: ProjectRole) -> Self {
        ServiceError::Forbidden {
            required: RequiredRole::Project(required),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_display_names_required_role() {
        let err = ServiceError::forbidden_workspace(WorkspaceRole::Owner);
        assert!(err.to_string().contains("workspace owner"));

        let err = ServiceError::forbidden_project(ProjectRole::Contributor);
        assert!(err.to_string().contains("project contributor"));
    }

    #[test]
    fn test_authentication_display() {
        let err = ServiceError::Authentication("invalid email or password".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: invalid email or password"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = ServiceError::NotFound("task");
        assert_eq!(err.to_string(), "task not found");
    }

    #[test]
    fn test_database_error_from_sqlx() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
