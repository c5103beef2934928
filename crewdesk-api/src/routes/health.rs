/// Health check endpoint
///
/// Reports service liveness and database reachability.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the handler runs
    pub status: &'static str,

    /// Whether the database answered
    pub database: bool,

    /// Server version
    pub version: &'static str,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = crewdesk_shared::db::pool::health_check(&state.db)
        .await
        .is_ok();

    Ok(Json(HealthResponse {
        status: "ok",
        database,
        version: env!("CARGO_PKG_VERSION"),
    }))
}
