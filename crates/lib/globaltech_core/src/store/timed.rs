//! Timeout decorator for any [`Store`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{Store, StoreError, StoreResult};
use crate::models::auth::User;
use crate::models::cart::Cart;
use crate::models::catalog::{Product, ProductPatch, ProductQuery};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a store so that no call waits longer than `timeout`. An expired
/// call fails with [`StoreError::Timeout`].
#[derive(Debug)]
pub struct TimedStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: Store> TimedStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout = ?self.timeout, "store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<S: Store> Store for TimedStore<S> {
    async fn create_user(&self, user: &User) -> StoreResult<User> {
        self.bounded("create_user", self.inner.create_user(user)).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.bounded("find_user_by_email", self.inner.find_user_by_email(email)).await
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        self.bounded("find_user_by_id", self.inner.find_user_by_id(id)).await
    }

    async fn promote_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.bounded("promote_user", self.inner.promote_user(id)).await
    }

    async fn create_product(&self, product: &Product) -> StoreResult<Product> {
        self.bounded("create_product", self.inner.create_product(product)).await
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        self.bounded("find_product", self.inner.find_product(id)).await
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        self.bounded("list_products", self.inner.list_products(query)).await
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> StoreResult<Option<bool>> {
        self.bounded("update_product", self.inner.update_product(id, patch)).await
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        self.bounded("delete_product", self.inner.delete_product(id)).await
    }

    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>> {
        self.bounded("find_cart", self.inner.find_cart(id)).await
    }

    async fn add_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<Cart>> {
        self.bounded(
            "add_to_cart",
            self.inner.add_to_cart(cart_id, product_id, quantity),
        )
        .await
    }

    async fn set_cart_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<i64>> {
        self.bounded(
            "set_cart_quantity",
            self.inner.set_cart_quantity(cart_id, product_id, quantity),
        )
        .await
    }

    async fn remove_from_cart(&self, cart_id: &str, product_id: &str) -> StoreResult<bool> {
        self.bounded(
            "remove_from_cart",
            self.inner.remove_from_cart(cart_id, product_id),
        )
        .await
    }

    async fn clear_cart(&self, cart_id: &str) -> StoreResult<bool> {
        self.bounded("clear_cart", self.inner.clear_cart(cart_id)).await
    }
}
