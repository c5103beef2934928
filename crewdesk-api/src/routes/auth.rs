/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` — register a new user
/// - `POST /v1/auth/login` — authenticate and open a session
/// - `POST /v1/auth/refresh` — rotate a refresh token
/// - `POST /v1/auth/logout` — revoke the presented session (idempotent)
/// - `POST /v1/auth/logout-all` — revoke every other session
/// - `PUT  /v1/auth/password` — change password

use crate::{
    app::AppState,
    error::{validation_details, ApiResult},
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};
use crewdesk_shared::auth::middleware::CurrentUser;
use crewdesk_shared::models::user::UserStatus;
use crewdesk_shared::services::auth::{ChangePasswordInput, LoginInput, RegisterInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (strength-checked by the auth flow)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// New user ID
    pub user_id: Uuid,

    /// Registered email
    pub email: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// The caller's identity as returned by login
#[derive(Debug, Serialize)]
pub struct LoginUser {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Global status
    pub status: UserStatus,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (15 minutes)
    pub access_token: String,

    /// Refresh token (7 days)
    pub refresh_token: String,

    /// The logged-in user
    pub user: LoginUser,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token to rotate
    pub refresh_token: String,
}

/// Refresh response: the rotated pair
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,

    /// New refresh token; the presented one is spent
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token of the session to revoke
    pub refresh_token: String,
}

/// Logout-all request
#[derive(Debug, Deserialize, Default)]
pub struct LogoutAllRequest {
    /// Refresh token of the current device, kept alive if present
    pub refresh_token: Option<String>,
}

/// Logout-all response
#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    /// Number of sessions revoked
    pub revoked: u64,
}

/// Change-password request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password
    pub current_password: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,

    /// Refresh token of the current device, kept alive if present
    pub refresh_token: Option<String>,
}

fn client_metadata(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    (ip_address, user_agent)
}

/// `POST /v1/auth/register`
///
/// # Errors
///
/// - `422`: request validation failed
/// - `400`: password fails the strength gate
/// - `409`: email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(validation_details)?;

    let user = state
        .auth
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            name: req.name,
        })
        .await?;

    Ok(Json(RegisterResponse {
        user_id: user.id,
        email: user.email,
    }))
}

/// `POST /v1/auth/login`
///
/// Side effects: one new session row, `last_login_at` stamped.
///
/// # Errors
///
/// - `422`: request validation failed
/// - `401`: unknown email, wrong password, or banned account
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_details)?;

    let (ip_address, user_agent) = client_metadata(&headers);

    let output = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
            ip_address,
            user_agent,
        })
        .await?;

    Ok(Json(LoginResponse {
        access_token: output.tokens.access_token,
        refresh_token: output.tokens.refresh_token,
        user: LoginUser {
            id: output.user.id,
            email: output.user.email,
            status: output.user.status,
        },
    }))
}

/// `POST /v1/auth/refresh`
///
/// Side effect: the session's stored hash is rotated; the presented
/// refresh token will not work again.
///
/// # Errors
///
/// - `401`: expired, malformed, revoked, or already-rotated token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let pair = state.auth.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// `POST /v1/auth/logout`
///
/// Idempotent: revoking an already-revoked session is a success.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.auth.logout(&req.refresh_token).await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// `POST /v1/auth/logout-all`
///
/// Revokes every session of the caller except the one whose refresh
/// token is passed in the body.
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<LogoutAllRequest>,
) -> ApiResult<Json<LogoutAllResponse>> {
    let revoked = state
        .auth
        .revoke_all(user.user_id, req.refresh_token.as_deref())
        .await?;

    Ok(Json(LogoutAllResponse { revoked }))
}

/// `PUT /v1/auth/password`
///
/// # Errors
///
/// - `401`: current password is wrong
/// - `400`: new password fails the strength gate
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(validation_details)?;

    state
        .auth
        .change_password(
            user.user_id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
                current_refresh_token: req.refresh_token,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
