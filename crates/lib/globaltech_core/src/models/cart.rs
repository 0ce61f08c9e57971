//! Cart models and the line-item arithmetic shared by every store.

use serde::Serialize;

/// A `{productId, quantity}` pair. Serialized with the product id as `_id`
/// so clients can address the line item by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub product_id: String,
    pub quantity: i64,
}

/// One cart per user, created at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    /// Line items in insertion order, unique by product id.
    pub products: Vec<CartItem>,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl Cart {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            products: Vec::new(),
            version: 0,
        }
    }

    /// Add `quantity` of a product, merging into an existing line item.
    /// Returns the line item's new quantity, or `None` (cart untouched) if
    /// the sum does not fit in an `i64`.
    pub fn add(&mut self, product_id: &str, quantity: i64) -> Option<i64> {
        let total = match self.products.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity)?;
                item.quantity
            }
            None => {
                self.products.push(CartItem {
                    product_id: product_id.to_string(),
                    quantity,
                });
                quantity
            }
        };
        self.version += 1;
        Some(total)
    }

    /// Replace a line item's quantity. Returns `None` if the product is not
    /// in the cart.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Option<i64> {
        let item = self
            .products
            .iter_mut()
            .find(|i| i.product_id == product_id)?;
        item.quantity = quantity;
        self.version += 1;
        Some(quantity)
    }

    /// Drop a line item. Returns whether it was present.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|i| i.product_id != product_id);
        let removed = self.products.len() != before;
        if removed {
            self.version += 1;
        }
        removed
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        if !self.products.is_empty() {
            self.products.clear();
            self.version += 1;
        }
    }

    /// Quantity of a product, if present.
    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.products
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
    }
}

/// Result of `PUT /api/carts/{cid}/products/{pid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdate {
    pub new_quantity: i64,
}
