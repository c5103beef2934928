/// Token lifecycle management
///
/// Mints and validates the two signed, stateless bearer tokens of a
/// session: a short-lived access token carrying identity claims, and a
/// longer-lived refresh token carrying only the subject. The two families
/// are signed with **distinct** HS256 secrets, so compromise of one does
/// not compromise the other, and a refresh token can never pass an
/// access-token check (or vice versa) even before the type discriminator
/// is consulted.
///
/// Validation is purely cryptographic — no database access. Revocation is
/// the session store's job; expiry and signature mismatch are reported as
/// distinct failure kinds so callers can surface "please log in again"
/// differently from "malformed token".
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::auth::tokens::TokenManager;
/// # use crewdesk_shared::models::user::User;
///
/// # fn example(user: &User) -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenManager::new(
///     "access-secret-at-least-32-bytes-long",
///     "refresh-secret-at-least-32-bytes-xx",
/// );
///
/// let pair = tokens.issue(user)?;
/// let claims = tokens.validate_access(&pair.access_token)?;
/// assert_eq!(claims.sub, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{User, UserStatus};

/// Token issuer claim, pinned on both families
const ISSUER: &str = "crewdesk";

/// Access token lifetime: 15 minutes
const ACCESS_TOKEN_LIFETIME_MINUTES: i64 = 15;

/// Refresh token lifetime: 7 days
const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token has expired; the caller should re-authenticate
    #[error("Token has expired")]
    Expired,

    /// Signature mismatch, malformed token, wrong issuer, or wrong family
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Failed to sign a new token
    #[error("Failed to create token: {0}")]
    Create(String),
}

/// Token family discriminator, carried in refresh-token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Refresh token
    Refresh,
}

/// Claims of an access token
///
/// Carries enough identity for a request to proceed without a user-table
/// read: subject, email, and global status at issue time. Status is a
/// snapshot — ban enforcement re-checks the table downstream rather than
/// trusting this claim for the token's whole lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — user ID
    pub sub: Uuid,

    /// Email at issue time
    pub email: String,

    /// Global status at issue time
    pub status: UserStatus,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims of a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — user ID
    pub sub: Uuid,

    /// Family discriminator, always `refresh`
    pub token_type: TokenType,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A freshly issued access/refresh pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,

    /// Longer-lived refresh token
    pub refresh_token: String,
}

/// Issues and validates both token families
///
/// Holds the two signing secrets; constructed once at startup from
/// configuration and injected wherever tokens are needed.
#[derive(Clone)]
pub struct TokenManager {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenManager {
    /// Creates a manager from the two distinct signing secrets
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Issues a fresh access/refresh pair for a user
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Create` if signing fails.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = Utc::now();

        let access_claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            status: user.status,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_LIFETIME_MINUTES)).timestamp(),
        };

        let refresh_claims = RefreshClaims {
            sub: user.id,
            token_type: TokenType::Refresh,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        Ok(TokenPair {
            access_token: self.sign(&access_claims, &self.access_encoding)?,
            refresh_token: self.sign(&refresh_claims, &self.refresh_encoding)?,
        })
    }

    /// Validates an access token and extracts its claims
    ///
    /// # Errors
    ///
    /// - `TokenError::Expired` when the token is past its `exp`
    /// - `TokenError::Invalid` on signature mismatch, wrong issuer, or a
    ///   token signed with the refresh secret
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &validation())
            .map_err(map_decode_error)?;

        Ok(data.claims)
    }

    /// Validates a refresh token and extracts its claims
    ///
    /// # Errors
    ///
    /// Same kinds as [`validate_access`](Self::validate_access); a token
    /// missing the `refresh` discriminator is `Invalid`.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())
            .map_err(map_decode_error)?;

        if data.claims.token_type != TokenType::Refresh {
            return Err(TokenError::Invalid("Not a refresh token".to_string()));
        }

        Ok(data.claims)
    }

    fn sign<C: Serialize>(&self, claims: &C, key: &EncodingKey) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| TokenError::Create(e.to_string()))
    }

    /// Issues a pair with custom lifetimes, for expiry tests
    #[cfg(test)]
    pub fn issue_with_lifetimes(
        &self,
        user: &User,
        access_lifetime: Duration,
        refresh_lifetime: Duration,
    ) -> Result<TokenPair, TokenError> {
        let now = Utc::now();

        let access_claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            status: user.status,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + access_lifetime).timestamp(),
        };

        let refresh_claims = RefreshClaims {
            sub: user.id,
            token_type: TokenType::Refresh,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + refresh_lifetime).timestamp(),
        };

        Ok(TokenPair {
            access_token: self.sign(&access_claims, &self.access_encoding)?,
            refresh_token: self.sign(&refresh_claims, &self.refresh_encoding)?,
        })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            name: None,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    fn test_manager() -> TokenManager {
        TokenManager::new(
            "access-secret-for-tests-0123456789ab",
            "refresh-secret-for-tests-0123456789",
        )
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let user = test_user();
        let tokens = test_manager();

        let pair = tokens.issue(&user).unwrap();

        let access = tokens.validate_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user.id);
        assert_eq!(access.email, user.email);
        assert_eq!(access.status, UserStatus::Active);
        assert_eq!(access.iss, "crewdesk");

        let refresh = tokens.validate_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, user.id);
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_families_do_not_cross_validate() {
        // Distinct secrets: a refresh token must fail access validation
        // and an access token must fail refresh validation.
        let user = test_user();
        let tokens = test_manager();
        let pair = tokens.issue(&user).unwrap();

        assert!(matches!(
            tokens.validate_access(&pair.refresh_token),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            tokens.validate_refresh(&pair.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_secret_is_invalid_not_expired() {
        let user = test_user();
        let pair = test_manager().issue(&user).unwrap();

        let other = TokenManager::new(
            "completely-different-access-secret!!",
            "completely-different-refresh-secret!",
        );

        assert!(matches!(
            other.validate_access(&pair.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_access_token_reports_expired() {
        let user = test_user();
        let tokens = test_manager();

        let pair = tokens
            .issue_with_lifetimes(&user, Duration::seconds(-60), Duration::days(7))
            .unwrap();

        assert!(matches!(
            tokens.validate_access(&pair.access_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_expired_refresh_token_reports_expired() {
        let user = test_user();
        let tokens = test_manager();

        let pair = tokens
            .issue_with_lifetimes(&user, Duration::minutes(15), Duration::seconds(-60))
            .unwrap();

        assert!(matches!(
            tokens.validate_refresh(&pair.refresh_token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_access_lifetime_is_fifteen_minutes() {
        let user = test_user();
        let tokens = test_manager();
        let pair = tokens.issue(&user).unwrap();

        let claims = tokens.validate_access(&pair.access_token).unwrap();
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 15 * 60);
    }

    #[test]
    fn test_refresh_lifetime_is_seven_days() {
        let user = test_user();
        let tokens = test_manager();
        let pair = tokens.issue(&user).unwrap();

        let claims = tokens.validate_refresh(&pair.refresh_token).unwrap();
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let tokens = test_manager();
        assert!(matches!(
            tokens.validate_access("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }
}
