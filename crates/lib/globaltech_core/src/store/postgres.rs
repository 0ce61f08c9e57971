//! PostgreSQL store.
//!
//! Raw SQLx queries against the tables in `migrations/`. Cart writes lock
//! the cart row for the duration of their transaction; product updates lock
//! the product row with `FOR UPDATE`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::{Store, StoreResult};
use crate::models::auth::User;
use crate::models::cart::{Cart, CartItem};
use crate::models::catalog::{Product, ProductPatch, ProductQuery};
use crate::uuid::parse_id;

const USER_COLUMNS: &str = "id::text AS id, first_name, last_name, email, age, \
     password_hash, role, cart_id::text AS cart, version";

const PRODUCT_COLUMNS: &str = "id::text AS id, title, description, code, price, stock, \
     category, thumbnails, owner_id::text AS owner_id, version";

/// Store backed by a shared PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Load a cart and its line items in insertion order.
async fn load_cart(conn: &mut PgConnection, cart_id: &str) -> Result<Option<Cart>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String, i32)>(
        "SELECT id::text, user_id::text, version FROM carts WHERE id = $1::uuid",
    )
    .bind(cart_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((id, user_id, version)) = row else {
        return Ok(None);
    };

    let products = sqlx::query_as::<_, (String, i64)>(
        "SELECT product_id::text, quantity FROM cart_items \
         WHERE cart_id = $1::uuid ORDER BY position",
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(|(product_id, quantity)| CartItem {
        product_id,
        quantity,
    })
    .collect();

    Ok(Some(Cart {
        id,
        user_id,
        products,
        version,
    }))
}

/// Bump the cart's version, taking its row lock until the transaction ends.
/// Returns false if the cart does not exist.
async fn lock_cart(conn: &mut PgConnection, cart_id: &str) -> Result<bool, sqlx::Error> {
    let locked = sqlx::query_scalar::<_, i32>(
        "UPDATE carts SET version = version + 1 WHERE id = $1::uuid RETURNING version",
    )
    .bind(cart_id)
    .fetch_optional(conn)
    .await?;
    Ok(locked.is_some())
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: &User) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1::uuid, $2::uuid)")
            .bind(&user.cart)
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "INSERT INTO users \
             (id, first_name, last_name, email, age, password_hash, role, cart_id) \
             VALUES ($1::uuid, $2, $3, $4, $5, $6, $7, $8::uuid) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.age)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.cart)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        if parse_id(id).is_none() {
            return Ok(None);
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1::uuid");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn promote_user(&self, id: &str) -> StoreResult<Option<User>> {
        if parse_id(id).is_none() {
            return Ok(None);
        }
        let sql = format!(
            "UPDATE users SET role = 'premium', \
             version = version + CASE WHEN role = 'premium' THEN 0 ELSE 1 END \
             WHERE id = $1::uuid \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_product(&self, product: &Product) -> StoreResult<Product> {
        let sql = format!(
            "INSERT INTO products \
             (id, title, description, code, price, stock, category, thumbnails, owner_id) \
             VALUES ($1::uuid, $2, $3, $4, $5, $6, $7, $8, $9::uuid) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.id)
            .bind(&product.title)
            .bind(&product.description)
            .bind(&product.code)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.category)
            .bind(&product.thumbnails)
            .bind(&product.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        if parse_id(id).is_none() {
            return Ok(None);
        }
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1::uuid");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn list_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY id \
             LIMIT $2 OFFSET $3"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(query.category.as_deref())
            .bind(i64::from(query.limit()))
            .bind(i64::from(query.offset()))
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn update_product(&self, id: &str, patch: &ProductPatch) -> StoreResult<Option<bool>> {
        if parse_id(id).is_none() {
            return Ok(None);
        }
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1::uuid FOR UPDATE");
        let current = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut product) = current else {
            return Ok(None);
        };
        if !patch.apply(&mut product) {
            tx.commit().await?;
            return Ok(Some(false));
        }

        sqlx::query(
            "UPDATE products SET title = $2, description = $3, code = $4, price = $5, \
             stock = $6, category = $7, thumbnails = $8, version = version + 1 \
             WHERE id = $1::uuid",
        )
        .bind(id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(&product.code)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.category)
        .bind(&product.thumbnails)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(true))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        if parse_id(id).is_none() {
            return Ok(false);
        }
        // cart_items rows go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM products WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_cart(&self, id: &str) -> StoreResult<Option<Cart>> {
        if parse_id(id).is_none() {
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        Ok(load_cart(&mut conn, id).await?)
    }

    async fn add_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<Cart>> {
        if parse_id(cart_id).is_none() || parse_id(product_id).is_none() {
            return Ok(None);
        }
        let mut tx = self.pool.begin().await?;
        if !lock_cart(&mut tx, cart_id).await? {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity) \
             VALUES ($1::uuid, $2::uuid, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        let cart = load_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn set_cart_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<Option<i64>> {
        if parse_id(cart_id).is_none() || parse_id(product_id).is_none() {
            return Ok(None);
        }
        let mut tx = self.pool.begin().await?;
        if !lock_cart(&mut tx, cart_id).await? {
            return Ok(None);
        }

        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE cart_items SET quantity = $3 \
             WHERE cart_id = $1::uuid AND product_id = $2::uuid \
             RETURNING quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_some() {
            tx.commit().await?;
        }
        Ok(updated)
    }

    async fn remove_from_cart(&self, cart_id: &str, product_id: &str) -> StoreResult<bool> {
        if parse_id(cart_id).is_none() || parse_id(product_id).is_none() {
            return Ok(false);
        }
        let mut tx = self.pool.begin().await?;
        if !lock_cart(&mut tx, cart_id).await? {
            return Ok(false);
        }

        let result = sqlx::query(
            "DELETE FROM cart_items WHERE cart_id = $1::uuid AND product_id = $2::uuid",
        )
        .bind(cart_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tx.commit().await?;
        }
        Ok(removed)
    }

    async fn clear_cart(&self, cart_id: &str) -> StoreResult<bool> {
        if parse_id(cart_id).is_none() {
            return Ok(false);
        }
        let mut tx = self.pool.begin().await?;
        if !lock_cart(&mut tx, cart_id).await? {
            return Ok(false);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1::uuid")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
