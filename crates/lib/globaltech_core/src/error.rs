//! Domain error taxonomy shared by sessions, catalog and carts.

use thiserror::Error;

use crate::store::StoreError;

/// Convenience alias for domain operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// Domain errors. Each variant maps to one externally observable status.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient dependency failure; the caller may retry.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShopError::Unavailable(_))
    }
}

impl From<StoreError> for ShopError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => ShopError::Conflict(msg),
            StoreError::OutOfRange(msg) => ShopError::Validation(msg),
            StoreError::Unavailable(msg) => ShopError::Unavailable(msg),
            StoreError::Timeout(after) => {
                ShopError::Unavailable(format!("store did not answer within {after:?}"))
            }
            StoreError::Database(e) => ShopError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(ShopError::Unavailable("db".into()).is_retryable());
        assert!(!ShopError::Conflict("email".into()).is_retryable());
        assert!(!ShopError::Forbidden("owner".into()).is_retryable());
    }

    #[test]
    fn store_timeout_becomes_unavailable() {
        let err = ShopError::from(StoreError::Timeout(Duration::from_millis(50)));
        assert!(matches!(err, ShopError::Unavailable(_)));
    }

    #[test]
    fn store_out_of_range_is_a_validation_error() {
        let err = ShopError::from(StoreError::OutOfRange("quantity".into()));
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[test]
    fn store_conflict_keeps_message() {
        let err = ShopError::from(StoreError::Conflict("email already registered".into()));
        match err {
            ShopError::Conflict(msg) => assert_eq!(msg, "email already registered"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
