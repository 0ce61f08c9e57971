//! In-process store backed by `dashmap`.
//!
//! Each read-modify-write runs while holding the entry's shard lock, so
//! concurrent writers to one cart or product are serialized. Locks on
//! different maps are nested in one order only: `products` → `codes` during
//! a code-changing update, and `carts` → `products` while adding to a cart.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{
    CODE_TAKEN, EMAIL_TAKEN, MISSING_REFERENCE, QUANTITY_OUT_OF_RANGE, Store, StoreError,
    StoreResult,
};
use crate::models::auth::{Role, User};
use crate::models::cart::Cart;
use crate::models::catalog::{Product, ProductPatch, ProductQuery};

/// Volatile store for tests and single-instance runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// email → user id.
    emails: DashMap<String, String>,
    products: DashMap<String, Product>,
    /// product code → product id.
    codes: DashMap<String, String>,
    carts: DashMap<String, Cart>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &User) -> StoreResult<User> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict(EMAIL_TAKEN.into())),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
            }
        }
        self.carts
            .insert(user.cart.clone(), Cart::new(user.cart.clone(), user.id.clone()));
        self.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn promote_user(&self, id: &str) -> StoreResult<Option<User>> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(None);
        };
        if user.role != Role::Premium {
            user.role = Role::Premium;
            user.version += 1;
        }
        Ok(Some(user.value().clone()))
    }

    async fn create_product(&self, product: &Product) -> StoreResult<Product> {
        match self.codes.entry(product.code.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Conflict(CODE_TAKEN.into())),
            Entry::Vacant(slot) => {
                slot.insert(product.id.clone());
            }
        }
        self.products.insert(product.id.clone(), product.clone());
        Ok(product.clone())
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.get(id).map(|p| p.value().clone()))
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                query
                    .category
                    .as_deref()
                    .is_none_or(|category| p.category == category)
            })
            .map(|p| p.value().clone())
            .collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(products
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> StoreResult<Option<bool>> {
        let Some(mut product) = self.products.get_mut(id) else {
            return Ok(None);
        };
        let mut next = product.value().clone();
        if !patch.apply(&mut next) {
            return Ok(Some(false));
        }
        if next.code != product.code {
            match self.codes.entry(next.code.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Conflict(CODE_TAKEN.into())),
                Entry::Vacant(slot) => {
                    slot.insert(id.to_string());
                }
            }
            self.codes.remove(&product.code);
        }
        next.version += 1;
        *product = next;
        Ok(Some(true))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        // Remove the product first so that no `add_to_cart` can re-insert it
        // once the sweep below has passed its cart.
        let Some((_, product)) = self.products.remove(id) else {
            return Ok(false);
        };
        self.codes.remove(&product.code);
        for mut cart in self.carts.iter_mut() {
            cart.remove(id);
        }
        Ok(true)
    }

    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>> {
        Ok(self.carts.get(id).map(|c| c.value().clone()))
    }

    async fn add_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<Cart>> {
        let Some(mut cart) = self.carts.get_mut(cart_id) else {
            return Ok(None);
        };
        // Checked under the cart lock: `delete_product` removes the product
        // before sweeping carts, so its sweep waits for this entry.
        if !self.products.contains_key(product_id) {
            return Err(StoreError::Conflict(MISSING_REFERENCE.into()));
        }
        if cart.add(product_id, quantity).is_none() {
            return Err(StoreError::OutOfRange(QUANTITY_OUT_OF_RANGE.into()));
        }
        Ok(Some(cart.value().clone()))
    }

    async fn set_cart_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<i64>> {
        Ok(self
            .carts
            .get_mut(cart_id)
            .and_then(|mut cart| cart.set_quantity(product_id, quantity)))
    }

    async fn remove_from_cart(&self, cart_id: &str, product_id: &str) -> StoreResult<bool> {
        Ok(self
            .carts
            .get_mut(cart_id)
            .is_some_and(|mut cart| cart.remove(product_id)))
    }

    async fn clear_cart(&self, cart_id: &str) -> StoreResult<bool> {
        let Some(mut cart) = self.carts.get_mut(cart_id) else {
            return Ok(false);
        };
        cart.clear();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::uuid::new_id;

    fn user(email: &str) -> User {
        User {
            id: new_id(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            age: 36,
            password_hash: "hash".into(),
            role: Role::User,
            cart: new_id(),
            version: 0,
        }
    }

    fn product(code: &str, owner: &str, category: &str) -> Product {
        Product {
            id: new_id(),
            title: "Lamp".into(),
            description: "Desk lamp".into(),
            code: code.into(),
            price: 1500,
            stock: 3,
            category: category.into(),
            thumbnails: vec![],
            owner_id: owner.into(),
            version: 0,
        }
    }

    #[tokio::test]
    async fn create_user_creates_empty_cart() {
        let store = MemoryStore::new();
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let cart = store.find_cart(&u.cart).await.unwrap().unwrap();
        assert_eq!(cart.user_id, u.id);
        assert!(cart.products.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(&user("a@example.com")).await.unwrap();
        let err = store.create_user(&user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn promote_is_monotonic_and_idempotent() {
        let store = MemoryStore::new();
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let first = store.promote_user(&u.id).await.unwrap().unwrap();
        let second = store.promote_user(&u.id).await.unwrap().unwrap();
        assert_eq!(first.role, Role::Premium);
        assert_eq!(second, first);
        assert!(store.promote_user("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn code_change_to_taken_code_conflicts() {
        let store = MemoryStore::new();
        let a = store.create_product(&product("A", "u1", "Home")).await.unwrap();
        store.create_product(&product("B", "u1", "Home")).await.unwrap();
        let patch = ProductPatch {
            code: Some("B".into()),
            ..Default::default()
        };
        let err = store.update_product(&a.id, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The old code is still held by `a`, the freed one can be reused.
        let patch = ProductPatch {
            code: Some("C".into()),
            ..Default::default()
        };
        assert_eq!(store.update_product(&a.id, &patch).await.unwrap(), Some(true));
        store.create_product(&product("A", "u1", "Home")).await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_and_pages_in_creation_order() {
        let store = MemoryStore::new();
        let mut home = Vec::new();
        for i in 0..5 {
            let p = store
                .create_product(&product(&format!("H{i}"), "u1", "Home"))
                .await
                .unwrap();
            home.push(p.id);
        }
        store.create_product(&product("G0", "u1", "Garden")).await.unwrap();

        let page = store
            .list_products(&ProductQuery {
                category: Some("Home".into()),
                limit: Some(2),
                page: Some(2),
            })
            .await
            .unwrap();
        let ids: Vec<_> = page.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, home[2..4]);

        let all = store.list_products(&ProductQuery::default()).await.unwrap();
        assert_eq!(all.len(), 6);
    }

    #[tokio::test]
    async fn delete_product_cascades_to_carts() {
        let store = MemoryStore::new();
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let p = store.create_product(&product("A", "u9", "Home")).await.unwrap();
        store.add_to_cart(&u.cart, &p.id, 2).await.unwrap();

        assert!(store.delete_product(&p.id).await.unwrap());
        assert!(!store.delete_product(&p.id).await.unwrap());
        let cart = store.find_cart(&u.cart).await.unwrap().unwrap();
        assert!(cart.products.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let p = store.create_product(&product("A", "u9", "Home")).await.unwrap();

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                let cart = u.cart.clone();
                let product_id = p.id.clone();
                tokio::spawn(async move { store.add_to_cart(&cart, &product_id, 1).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        let cart = store.find_cart(&u.cart).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(&p.id), Some(64));
    }

    #[tokio::test]
    async fn add_of_deleted_product_is_rejected() {
        let store = MemoryStore::new();
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let p = store.create_product(&product("A", "u9", "Home")).await.unwrap();
        store.delete_product(&p.id).await.unwrap();

        let err = store.add_to_cart(&u.cart, &p.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let cart = store.find_cart(&u.cart).await.unwrap().unwrap();
        assert!(cart.products.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn delete_racing_adds_leaves_no_dangling_line_item() {
        let store = Arc::new(MemoryStore::new());
        let mut carts = Vec::new();
        for i in 0..16 {
            let u = store.create_user(&user(&format!("u{i}@example.com"))).await.unwrap();
            carts.push(u.cart);
        }
        let p = store.create_product(&product("A", "u9", "Home")).await.unwrap();

        let adds: Vec<_> = carts
            .iter()
            .cloned()
            .map(|cart| {
                let store = store.clone();
                let product_id = p.id.clone();
                tokio::spawn(async move {
                    for _ in 0..32 {
                        // Failures after the delete are expected.
                        let _ = store.add_to_cart(&cart, &product_id, 1).await;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        let delete = {
            let store = store.clone();
            let product_id = p.id.clone();
            tokio::spawn(async move { store.delete_product(&product_id).await })
        };
        assert!(delete.await.unwrap().unwrap());
        for t in adds {
            t.await.unwrap();
        }

        for cart in &carts {
            let cart = store.find_cart(cart).await.unwrap().unwrap();
            assert_eq!(cart.quantity_of(&p.id), None);
        }
    }

    #[tokio::test]
    async fn add_overflow_is_out_of_range() {
        let store = MemoryStore::new();
        let u = store.create_user(&user("a@example.com")).await.unwrap();
        let p = store.create_product(&product("A", "u9", "Home")).await.unwrap();
        store.add_to_cart(&u.cart, &p.id, i64::MAX).await.unwrap();

        let err = store.add_to_cart(&u.cart, &p.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange(_)));
        let cart = store.find_cart(&u.cart).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of(&p.id), Some(i64::MAX));
    }
}
