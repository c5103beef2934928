/// Session/device store
///
/// The stateful half of session management. Signed refresh tokens cannot
/// be invalidated before expiry on their own, so every login writes one
/// session row keyed by a salted hash of the refresh token; logout and
/// revoke-all flip `is_revoked`, and refresh overwrites the hash in place
/// (rotation). Only the hash is ever persisted — a database leak does not
/// grant session hijacking.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     refresh_token_hash VARCHAR(64) NOT NULL UNIQUE,
///     ip_address VARCHAR(45),
///     user_agent TEXT,
///     is_revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_active_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Rotation relies on the store's row-level update semantics rather than
/// application locks: of two concurrent rotations for one session, the
/// first to commit wins and the loser's old hash simply stops resolving.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::user::User;

/// Session row: one per successful login (device)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Salted SHA-256 hex digest of the current refresh token
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// Client IP at login
    pub ip_address: Option<String>,

    /// Client user agent at login
    pub user_agent: Option<String>,

    /// Revoked sessions never validate again
    pub is_revoked: bool,

    /// When the session was created (login time)
    pub created_at: DateTime<Utc>,

    /// Bumped on every rotation
    pub last_active_at: DateTime<Utc>,
}

/// Input for creating a session row
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// Owning user
    pub user_id: Uuid,

    /// Salted hash of the refresh token (see [`SessionStore::hash_refresh_token`])
    pub refresh_token_hash: String,

    /// Client IP
    pub ip_address: Option<String>,

    /// Client user agent
    pub user_agent: Option<String>,
}

/// Persistent store for sessions, keyed by refresh-token hash
#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
    hash_pepper: String,
}

impl SessionStore {
    /// Creates a store over a pool with a server-side hash pepper
    ///
    /// The pepper is mixed into every refresh-token hash so stored
    /// digests cannot be matched against tokens by an attacker holding
    /// only the database.
    pub fn new(pool: PgPool, hash_pepper: impl Into<String>) -> Self {
        Self {
            pool,
            hash_pepper: hash_pepper.into(),
        }
    }

    /// Computes the salted SHA-256 hex digest of a raw refresh token
    pub fn hash_refresh_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.hash_pepper.as_bytes());
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Creates a session row for a fresh login
    ///
    /// Accepts any executor so the auth flow can create the session in
    /// the same transaction that stamps `last_login_at`.
    pub async fn create(
        &self,
        db: impl PgExecutor<'_>,
        data: CreateSession,
    ) -> Result<Session, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, refresh_token_hash, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, refresh_token_hash, ip_address, user_agent,
                      is_revoked, created_at, last_active_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.refresh_token_hash)
        .bind(data.ip_address)
        .bind(data.user_agent)
        .fetch_one(db)
        .await
    }

    /// Looks up the active session matching a refresh-token hash
    ///
    /// Revoked sessions never match. The owning user is loaded in the
    /// same call and a BANNED owner rejects the lookup — a banned user's
    /// still-unexpired refresh tokens die here.
    pub async fn lookup_active_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<(Session, User)>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, refresh_token_hash, ip_address, user_agent,
                   is_revoked, created_at, last_active_at
            FROM sessions
            WHERE refresh_token_hash = $1 AND NOT is_revoked
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let user = User::find(&self.pool, session.user_id).await?;

        match user {
            Some(user) if user.status != crate::models::user::UserStatus::Banned => {
                Ok(Some((session, user)))
            }
            _ => Ok(None),
        }
    }

    /// Rotates the stored hash for a session
    ///
    /// One UPDATE replaces the hash and bumps `last_active_at`; the
    /// previous refresh token stops resolving the moment this commits,
    /// which limits the replay window of any single token to one use.
    /// Returns `false` if the session no longer exists or was revoked in
    /// the meantime.
    pub async fn rotate(&self, session_id: Uuid, new_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET refresh_token_hash = $2, last_active_at = NOW()
            WHERE id = $1 AND NOT is_revoked
            "#,
        )
        .bind(session_id)
        .bind(new_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes the session matching a refresh-token hash
    ///
    /// Returns whether a live session was revoked; revoking an
    /// already-revoked or unknown hash affects nothing, which makes
    /// logout idempotent at the flow level.
    pub async fn revoke(&self, hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET is_revoked = TRUE WHERE refresh_token_hash = $1 AND NOT is_revoked",
        )
        .bind(hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every session of a user except, optionally, one
    ///
    /// "Log out all other devices": the caller passes the hash of the
    /// refresh token it is currently holding to keep that session alive.
    /// Returns the number of sessions revoked.
    pub async fn revoke_all_except(
        &self,
        user_id: Uuid,
        exclude_hash: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET is_revoked = TRUE
            WHERE user_id = $1
              AND NOT is_revoked
              AND ($2::varchar IS NULL OR refresh_token_hash <> $2)
            "#,
        )
        .bind(user_id)
        .bind(exclude_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SessionStore {
        // Queries never run in these tests; lazy pool construction is
        // enough to exercise the hashing.
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        SessionStore::new(pool, "test-pepper")
    }

    #[tokio::test]
    async fn test_hash_is_deterministic_hex() {
        let store = test_store();

        let h1 = store.hash_refresh_token("some.refresh.token");
        let h2 = store.hash_refresh_token("some.refresh.token");

        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_hash_differs_per_token() {
        let store = test_store();
        assert_ne!(
            store.hash_refresh_token("token-a"),
            store.hash_refresh_token("token-b")
        );
    }

    #[tokio::test]
    async fn test_hash_depends_on_pepper() {
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let store_a = SessionStore::new(pool.clone(), "pepper-a");
        let store_b = SessionStore::new(pool, "pepper-b");

        assert_ne!(
            store_a.hash_refresh_token("same-token"),
            store_b.hash_refresh_token("same-token")
        );
    }

    #[tokio::test]
    async fn test_hash_never_contains_raw_token() {
        let store = test_store();
        let hash = store.hash_refresh_token("super-secret-refresh-token");
        assert!(!hash.contains("super-secret"));
    }

    // Store query tests require a running database and live in
    // tests/session_store_tests.rs.
}
