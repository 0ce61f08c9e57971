//! Persistence seam.
//!
//! Domain logic talks to a [`Store`]; the crate ships a PostgreSQL store, an
//! in-process store and a decorator that bounds every call with a timeout.
//! Every read-modify-write a store exposes is atomic per entity.

pub mod memory;
pub mod postgres;
pub mod timed;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::User;
use crate::models::cart::Cart;
use crate::models::catalog::{Product, ProductPatch, ProductQuery};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use timed::TimedStore;

/// Message used for a duplicate registration email.
pub const EMAIL_TAKEN: &str = "Email already registered";

/// Message used for a duplicate product code.
pub const CODE_TAKEN: &str = "Product code already exists";

/// Message used when a write names a row that was deleted meanwhile.
pub const MISSING_REFERENCE: &str = "Referenced entity no longer exists";

/// Message used when a cart quantity would not fit in a BIGINT.
pub const QUANTITY_OUT_OF_RANGE: &str = "Cart quantity out of range";

/// PostgreSQL `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store failures, classified so the domain can tell conflicts and transient
/// outages apart from bugs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A computed value does not fit its column.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(unique_violation_message(db.constraint()).into())
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::Conflict(MISSING_REFERENCE.into())
            }
            sqlx::Error::Database(ref db)
                if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) =>
            {
                StoreError::OutOfRange(QUANTITY_OUT_OF_RANGE.into())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => EMAIL_TAKEN,
        Some("products_code_key") => CODE_TAKEN,
        _ => "Duplicate value",
    }
}

/// Credential, catalog and cart persistence.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new user together with their empty cart (`user.cart`).
    /// Fails with [`StoreError::Conflict`] if the email is taken.
    async fn create_user(&self, user: &User) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Raise a user's role to premium, returning the updated record.
    /// A user who already is premium is returned unchanged.
    async fn promote_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::Conflict`] if the code is taken.
    async fn create_product(&self, product: &Product) -> StoreResult<Product>;

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Products in creation order, filtered and paged by `query`.
    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;

    /// Apply a patch atomically. `None` if the product does not exist,
    /// otherwise whether anything changed.
    async fn update_product(&self, id: &str, patch: &ProductPatch) -> StoreResult<Option<bool>>;

    /// Delete a product and every cart line item referencing it.
    /// Returns whether the product existed.
    async fn delete_product(&self, id: &str) -> StoreResult<bool>;

    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>>;

    /// Add `quantity` of a product to a cart, merging with an existing line
    /// item. `None` if the cart does not exist. Fails with
    /// [`StoreError::Conflict`] if the product is gone and with
    /// [`StoreError::OutOfRange`] if the merged quantity overflows.
    async fn add_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<Cart>>;

    /// Replace a line item's quantity. `None` if the cart or line item does
    /// not exist.
    async fn set_cart_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<i64>>;

    /// Remove one line item. Returns whether it was present.
    async fn remove_from_cart(&self, cart_id: &str, product_id: &str) -> StoreResult<bool>;

    /// Remove every line item. Returns whether the cart exists.
    async fn clear_cart(&self, cart_id: &str) -> StoreResult<bool>;
}
