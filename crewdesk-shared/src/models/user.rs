/// User model and database operations
///
/// A user is the identity every authorization decision starts from. Users
/// join workspaces via `workspace_member` rows and projects via
/// `project_member` rows; the global `status` field gates everything — a
/// banned user cannot log in, refresh a session, or pass the per-request
/// status re-check.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_status AS ENUM ('active', 'banned', 'admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     status user_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// Users are never physically deleted; banning sets `status = 'banned'`
/// and leaves every membership row in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Global account status
///
/// Ordered by privilege only in the trivial sense that `Admin` bypasses
/// workspace-level checks; `Banned` is terminal for every request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Normal account
    Active,

    /// Locked out everywhere; sessions stop validating immediately
    Banned,

    /// Platform administrator
    Admin,
}

impl UserStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Banned => "banned",
            UserStatus::Admin => "admin",
        }
    }
}

/// User model representing an identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT)
    pub email: String,

    /// Argon2id password hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Global account status
    pub status: UserStatus,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// The identity fields safe to return to other users
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,
}

impl User {
    /// Creates a new user with status `active`
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database call fails.
    pub async fn create(db: impl PgExecutor<'_>, data: CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, name, status,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.name)
        .fetch_one(db)
        .await
    }

    /// Finds a user by ID
    pub async fn find(db: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, status,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Finds a user by email (case-insensitive)
    pub async fn find_by_email(
        db: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, status,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Fetches just the current status for a user
    ///
    /// Used by the per-request auth middleware: an access token may still
    /// carry a valid signature after the user was banned, so status is
    /// re-checked against the table rather than trusted from the claims.
    pub async fn current_status(
        db: impl PgExecutor<'_>,
        id: Uuid,
    ) -> Result<Option<UserStatus>, sqlx::Error> {
        sqlx::query_scalar::<_, UserStatus>("SELECT status FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Stamps `last_login_at` with the current time
    pub async fn touch_last_login(db: impl PgExecutor<'_>, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Replaces the stored password hash
    pub async fn update_password_hash(
        db: impl PgExecutor<'_>,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Sets the global status (ban/unban/promote)
    pub async fn set_status(
        db: impl PgExecutor<'_>,
        id: Uuid,
        status: UserStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_status_as_str() {
        assert_eq!(UserStatus::Active.as_str(), "active");
        assert_eq!(UserStatus::Banned.as_str(), "banned");
        assert_eq!(UserStatus::Admin.as_str(), "admin");
    }

    #[test]
    fn test_user_status_serializes_uppercase() {
        // Access-token claims carry the status as "ACTIVE"/"BANNED"/"ADMIN".
        let json = serde_json::to_string(&UserStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");

        let json = serde_json::to_string(&UserStatus::Banned).unwrap();
        assert_eq!(json, "\"BANNED\"");
    }

    #[test]
    fn test_public_user_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            name: Some("Ada".to_string()),
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let public = PublicUser::from(&user);
        assert_eq!(public.id, user.id);
        assert_eq!(public.email, user.email);
        assert_eq!(public.name, user.name);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: None,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
    }

    // Query tests require a running database and live in tests/.
}
