//! # Crewdesk API Server
//!
//! Axum transport layer over the `crewdesk-shared` core: configuration,
//! error mapping, and the HTTP routes for authentication, workspaces,
//! projects, and tasks.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
