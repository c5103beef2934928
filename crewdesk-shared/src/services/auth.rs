/// Authentication flows
///
/// Registration, login, refresh-with-rotation, logout, revoke-all, and
/// password change. Login and refresh produce the access/refresh pair
/// through the token manager and persist only the refresh token's salted
/// hash through the session store; nothing here caches identity state
/// between requests.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password;
use crate::auth::session::{CreateSession, SessionStore};
use crate::auth::tokens::{TokenManager, TokenPair};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{CreateUser, PublicUser, User, UserStatus};

/// Input for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterInput {
    /// Email address
    pub email: String,

    /// Plaintext password (hashed before it leaves this flow)
    pub password: String,

    /// Optional display name
    pub name: Option<String>,
}

/// Input for logging in
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,

    /// Client IP, recorded on the session row
    pub ip_address: Option<String>,

    /// Client user agent, recorded on the session row
    pub user_agent: Option<String>,
}

/// Successful login result
#[derive(Debug)]
pub struct LoginOutput {
    /// Fresh access/refresh pair
    pub tokens: TokenPair,

    /// The logged-in user
    pub user: User,
}

/// Input for changing the caller's password
#[derive(Debug, Clone)]
pub struct ChangePasswordInput {
    /// Current password, verified before anything changes
    pub current_password: String,

    /// Replacement password
    pub new_password: String,

    /// The refresh token of the current device, if the caller wants to
    /// stay logged in on it
    pub current_refresh_token: Option<String>,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    tokens: TokenManager,
    sessions: SessionStore,
}

impl AuthService {
    /// Creates the service with its dependencies injected
    pub fn new(pool: PgPool, tokens: TokenManager, sessions: SessionStore) -> Self {
        Self {
            pool,
            tokens,
            sessions,
        }
    }

    /// Registers a new user account
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the password fails the strength gate
    /// - `Database` on a duplicate email (unique constraint violation)
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<PublicUser> {
        password::validate_password_strength(&input.password)
            .map_err(ServiceError::InvalidInput)?;

        let password_hash = password::hash_password(&input.password)?;

        let user = User::create(
            &self.pool,
            CreateUser {
                email: input.email,
                password_hash,
                name: input.name,
            },
        )
        .await?;

        info!(user_id = %user.id, "Registered new user");

        Ok(PublicUser::from(&user))
    }

    /// Authenticates credentials and opens a session
    ///
    /// On success: one new session row holding the refresh token's salted
    /// hash, `last_login_at` stamped, and a fresh token pair returned.
    ///
    /// # Errors
    ///
    /// `Authentication` for an unknown email, a wrong password, or a
    /// banned account. Unknown email and wrong password share one message
    /// so the response does not reveal which emails exist.
    pub async fn login(&self, input: LoginInput) -> ServiceResult<LoginOutput> {
        let user = User::find_by_email(&self.pool, &input.email)
            .await?
            .ok_or_else(|| {
                ServiceError::Authentication("Invalid email or password".to_string())
            })?;

        if user.status == UserStatus::Banned {
            return Err(ServiceError::Authentication(
                "Account is disabled".to_string(),
            ));
        }

        let valid = password::verify_password(&input.password, &user.password_hash)?;
        if !valid {
            return Err(ServiceError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let pair = self.tokens.issue(&user)?;
        let refresh_hash = self.sessions.hash_refresh_token(&pair.refresh_token);

        let mut tx = self.pool.begin().await?;
        self.sessions
            .create(
                &mut *tx,
                CreateSession {
                    user_id: user.id,
                    refresh_token_hash: refresh_hash,
                    ip_address: input.ip_address,
                    user_agent: input.user_agent,
                },
            )
            .await?;
        User::touch_last_login(&mut *tx, user.id).await?;
        tx.commit().await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput { tokens: pair, user })
    }

    /// Exchanges a refresh token for a rotated pair
    ///
    /// The presented token's hash must resolve to an active session whose
    /// owner is not banned. Rotation overwrites the stored hash, so the
    /// presented token is spent the moment this returns — a replay fails
    /// its lookup. Of two concurrent rotations for one session, the first
    /// commit wins and the loser surfaces here as an invalid token on its
    /// next use.
    ///
    /// # Errors
    ///
    /// `Authentication` when the token is expired, malformed, revoked,
    /// already rotated away, or owned by a banned user.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        self.tokens.validate_refresh(refresh_token)?;

        let hash = self.sessions.hash_refresh_token(refresh_token);

        let (session, user) = self
            .sessions
            .lookup_active_by_hash(&hash)
            .await?
            .ok_or_else(|| {
                ServiceError::Authentication("Refresh token is no longer valid".to_string())
            })?;

        let pair = self.tokens.issue(&user)?;
        let new_hash = self.sessions.hash_refresh_token(&pair.refresh_token);

        let rotated = self.sessions.rotate(session.id, &new_hash).await?;
        if !rotated {
            return Err(ServiceError::Authentication(
                "Refresh token is no longer valid".to_string(),
            ));
        }

        Ok(pair)
    }

    /// Logs out the device holding the presented refresh token
    ///
    /// Idempotent: revoking an already-revoked or unknown session is a
    /// no-op success.
    pub async fn logout(&self, refresh_token: &str) -> ServiceResult<()> {
        let hash = self.sessions.hash_refresh_token(refresh_token);
        self.sessions.revoke(&hash).await?;
        Ok(())
    }

    /// Revokes every session of the caller except, optionally, the
    /// current one
    ///
    /// Returns the number of sessions revoked.
    pub async fn revoke_all(
        &self,
        user_id: Uuid,
        current_refresh_token: Option<&str>,
    ) -> ServiceResult<u64> {
        let exclude_hash = current_refresh_token.map(|t| self.sessions.hash_refresh_token(t));

        let count = self
            .sessions
            .revoke_all_except(user_id, exclude_hash.as_deref())
            .await?;

        info!(user_id = %user_id, count, "Revoked sessions");

        Ok(count)
    }

    /// Changes the caller's password
    ///
    /// Verifies the current password, stores the new hash, and revokes
    /// every other session — a credential change invalidates whatever the
    /// old credential may have opened elsewhere.
    ///
    /// # Errors
    ///
    /// - `Authentication` when the current password is wrong
    /// - `InvalidInput` when the new password fails the strength gate
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> ServiceResult<()> {
        let user = User::find(&self.pool, user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        let valid = password::verify_password(&input.current_password, &user.password_hash)?;
        if !valid {
            return Err(ServiceError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        password::validate_password_strength(&input.new_password)
            .map_err(ServiceError::InvalidInput)?;

        let new_hash = password::hash_password(&input.new_password)?;

        User::update_password_hash(&self.pool, user_id, &new_hash).await?;

        let exclude_hash = input
            .current_refresh_token
            .as_deref()
            .map(|t| self.sessions.hash_refresh_token(t));

        let revoked = self
            .sessions
            .revoke_all_except(user_id, exclude_hash.as_deref())
            .await?;

        info!(user_id = %user_id, revoked, "Password changed");

        Ok(())
    }
}
