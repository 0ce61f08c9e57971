//! Password hashing via bcrypt.
//!
//! bcrypt is CPU-bound, so request paths go through the `*_bounded`
//! variants, which run on the blocking pool under a timeout.

use std::time::Duration;

use crate::error::{ShopError, ShopResult};

/// bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Bound on one hash or comparison.
pub const DEFAULT_HASH_TIMEOUT: Duration = Duration::from_secs(5);

/// Hash a password with bcrypt.
pub fn hash_password(password: &str, cost: u32) -> ShopResult<String> {
    bcrypt::hash(password, cost).map_err(|e| ShopError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> ShopResult<bool> {
    bcrypt::verify(password, hash).map_err(|e| ShopError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] off the async executor, bounded by `timeout`.
pub async fn hash_password_bounded(
    password: String,
    cost: u32,
    timeout: Duration,
) -> ShopResult<String> {
    run_bounded(timeout, move || hash_password(&password, cost)).await
}

/// [`verify_password`] off the async executor, bounded by `timeout`.
pub async fn verify_password_bounded(
    password: String,
    hash: String,
    timeout: Duration,
) -> ShopResult<bool> {
    run_bounded(timeout, move || verify_password(&password, &hash)).await
}

async fn run_bounded<T, F>(timeout: Duration, f: F) -> ShopResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ShopResult<T> + Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(ShopError::Internal(format!("password task failed: {join}"))),
        Err(_) => Err(ShopError::Unavailable(format!(
            "password hashing did not finish within {timeout:?}"
        ))),
    }
}
