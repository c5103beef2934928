//! # Crewdesk Shared Library
//!
//! This crate contains the core of the Crewdesk collaboration backend:
//! the authentication/session lifecycle, the hierarchical RBAC engine,
//! and the transactional mutation flows that every workspace, project,
//! and task operation runs through.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Tokens, passwords, sessions, and the RBAC resolver
//! - `services`: Transactional mutation flows (one unit of work per call)
//! - `events`: Interfaces to the notification and real-time collaborators
//! - `db`: Connection pool management
//! - `error`: The shared service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod services;

/// Current version of the Crewdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
