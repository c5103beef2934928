/// Authentication and authorization for Crewdesk
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`tokens`]: signed access/refresh token lifecycle (stateless half)
/// - [`session`]: session/device store keyed by refresh-token hash
///   (stateful half — refresh tokens must be revocable, which signatures
///   alone cannot provide)
/// - [`rbac`]: workspace/project role resolution with one-directional
///   inheritance
/// - [`middleware`]: axum request authentication (bearer header or cookie)
///
/// # Security Features
///
/// - Passwords hashed with Argon2id; verification is constant-time
/// - Access and refresh tokens signed with distinct HS256 secrets
/// - Only salted hashes of refresh tokens are persisted
/// - Refresh rotation is single-use: each refresh overwrites the stored
///   hash, so a replayed token fails its next lookup

pub mod middleware;
pub mod password;
pub mod rbac;
pub mod session;
pub mod tokens;
