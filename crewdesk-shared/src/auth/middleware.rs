/// Request authentication middleware for Axum
///
/// Extracts the access token from either the `Authorization: Bearer`
/// header or the `crewdesk_access` HTTP-only cookie, validates it, and
/// re-checks the user's status row before inserting a [`CurrentUser`]
/// into request extensions. The status re-check is what makes a ban take
/// effect immediately: the token's signature may verify for up to its
/// full lifetime after the ban lands.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use crewdesk_shared::auth::middleware::{create_auth_middleware, CurrentUser};
/// use crewdesk_shared::auth::tokens::TokenManager;
/// use sqlx::PgPool;
///
/// async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
///     user.email
/// }
///
/// fn protected_routes(pool: PgPool, tokens: TokenManager) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(middleware::from_fn(create_auth_middleware(pool, tokens)))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use uuid::Uuid;

use super::tokens::{TokenError, TokenManager};
use crate::models::user::{User, UserStatus};

/// Cookie that may carry the access token instead of the header
pub const ACCESS_TOKEN_COOKIE: &str = "crewdesk_access";

/// Authenticated identity attached to the request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID from the validated token
    pub user_id: Uuid,

    /// Email from the validated token
    pub email: String,

    /// Status from the users table, not the token claims
    pub status: UserStatus,
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// No bearer header and no access cookie
    MissingCredentials,

    /// Token validation failed (expired, bad signature, malformed)
    InvalidToken(String),

    /// The token's subject no longer exists or is banned
    NotAuthenticated,

    /// Database error during the status re-check
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Pulls the raw access token out of a request
///
/// The `Authorization: Bearer` header wins; the `crewdesk_access` cookie
/// is the fallback. Both delivery forms are accepted on every request.
pub fn extract_access_token(req: &Request) -> Option<String> {
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = req.headers().get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == ACCESS_TOKEN_COOKIE {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Access-token authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - No credential is present in header or cookie
/// - The token is expired, malformed, or has a bad signature
/// - The user no longer exists or is banned
pub async fn auth_middleware(
    pool: PgPool,
    tokens: TokenManager,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_access_token(&req).ok_or(AuthError::MissingCredentials)?;

    let claims = tokens.validate_access(&token).map_err(|e| match e {
        TokenError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    // Status comes from the table, not the claims: a ban must be visible
    // on the very next request.
    let status = User::current_status(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::NotAuthenticated)?;

    if status == UserStatus::Banned {
        return Err(AuthError::NotAuthenticated);
    }

    req.extensions_mut().insert(CurrentUser {
        user_id: claims.sub,
        email: claims.email,
        status,
    });

    Ok(next.run(req).await)
}

/// Creates an authentication middleware closure for `middleware::from_fn`
pub fn create_auth_middleware(
    pool: PgPool,
    tokens: TokenManager,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    move |req, next| {
        let pool = pool.clone();
        let tokens = tokens.clone();
        Box::pin(auth_middleware(pool, tokens, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_from_bearer_header() {
        let req = request_with_headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(extract_access_token(&req), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_from_cookie() {
        let req = request_with_headers(&[("cookie", "crewdesk_access=abc.def.ghi; other=1")]);
        assert_eq!(extract_access_token(&req), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let req = request_with_headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "crewdesk_access=from-cookie"),
        ]);
        assert_eq!(extract_access_token(&req), Some("from-header".to_string()));
    }

    #[test]
    fn test_extract_missing_credentials() {
        let req = request_with_headers(&[]);
        assert_eq!(extract_access_token(&req), None);

        // A non-Bearer authorization scheme does not count.
        let req = request_with_headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(extract_access_token(&req), None);

        // An unrelated cookie does not count.
        let req = request_with_headers(&[("cookie", "other_cookie=value")]);
        assert_eq!(extract_access_token(&req), None);
    }

    #[test]
    fn test_auth_error_status_codes() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("oops".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
