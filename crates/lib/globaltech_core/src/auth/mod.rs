//! Authentication and authorization logic.
//!
//! Token codec, password hashing, the session manager and the request-time
//! authorization guard.

pub mod guard;
pub mod jwt;
pub mod password;
pub mod session;

use std::fmt;
use std::time::Duration;

/// Settings shared by every session operation.
#[derive(Clone)]
pub struct AuthSettings {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// bcrypt cost factor for new hashes.
    pub bcrypt_cost: u32,
    /// Bound on a single hash or hash comparison.
    pub hash_timeout: Duration,
}

impl AuthSettings {
    /// Settings with default lifetime, cost and timeout.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_secs: jwt::DEFAULT_TOKEN_TTL_SECS,
            bcrypt_cost: password::DEFAULT_BCRYPT_COST,
            hash_timeout: password::DEFAULT_HASH_TIMEOUT,
        }
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"[redacted]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("hash_timeout", &self.hash_timeout)
            .finish()
    }
}
