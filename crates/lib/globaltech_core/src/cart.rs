//! Cart manager.
//!
//! Every operation requires the caller's session to hold the cart being
//! touched. Quantities for the same product aggregate into one line item.

use tracing::info;

use crate::auth::guard::{Requirement, allow};
use crate::error::{ShopError, ShopResult};
use crate::models::auth::TokenClaims;
use crate::models::cart::{Cart, QuantityUpdate};
use crate::store::Store;

pub const PRODUCT_ADDED: &str = "Producto agregado al carrito exitosamente.";
pub const PRODUCT_REMOVED: &str = "Producto eliminado del carrito exitosamente.";
pub const CART_CLEARED: &str = "Los productos del carrito se han eliminado exitosamente.";

/// A confirmation message with the cart as it stands after the change.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    pub message: &'static str,
    pub cart: Cart,
}

fn cart_not_found(cart_id: &str) -> ShopError {
    ShopError::NotFound(format!("Cart {cart_id} not found"))
}

fn holder<'c>(claims: &'c TokenClaims, cart_id: &str) -> ShopResult<&'c TokenClaims> {
    allow(
        Some(claims),
        &[Requirement::Authenticated, Requirement::CartHolder(cart_id)],
    )
}

/// Add `quantity` of a product to the cart.
///
/// Premium users cannot add products they own.
pub async fn add_product(
    store: &dyn Store,
    claims: &TokenClaims,
    cart_id: &str,
    product_id: &str,
    quantity: i64,
) -> ShopResult<CartUpdate> {
    let claims = holder(claims, cart_id)?;
    if quantity < 1 {
        return Err(ShopError::Validation("quantity must be at least 1".into()));
    }

    let product = store
        .find_product(product_id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {product_id} not found")))?;
    if product.owner_id == claims.sub {
        return Err(ShopError::Forbidden(
            "You cannot add your own product to your cart".into(),
        ));
    }

    let cart = store
        .add_to_cart(cart_id, product_id, quantity)
        .await?
        .ok_or_else(|| cart_not_found(cart_id))?;
    info!(cart_id = %cart_id, product_id = %product_id, quantity, "product added to cart");
    Ok(CartUpdate {
        message: PRODUCT_ADDED,
        cart,
    })
}

/// Replace a line item's quantity.
pub async fn set_quantity(
    store: &dyn Store,
    claims: &TokenClaims,
    cart_id: &str,
    product_id: &str,
    quantity: i64,
) -> ShopResult<QuantityUpdate> {
    holder(claims, cart_id)?;
    if quantity <= 0 {
        return Err(ShopError::Validation("quantity must be greater than 0".into()));
    }

    let new_quantity = store
        .set_cart_quantity(cart_id, product_id, quantity)
        .await?
        .ok_or_else(|| {
            ShopError::NotFound(format!("Product {product_id} is not in cart {cart_id}"))
        })?;
    info!(cart_id = %cart_id, product_id = %product_id, new_quantity, "cart quantity set");
    Ok(QuantityUpdate { new_quantity })
}

/// Drop one line item.
pub async fn remove_product(
    store: &dyn Store,
    claims: &TokenClaims,
    cart_id: &str,
    product_id: &str,
) -> ShopResult<CartUpdate> {
    holder(claims, cart_id)?;

    if !store.remove_from_cart(cart_id, product_id).await? {
        return Err(ShopError::NotFound(format!(
            "Product {product_id} is not in cart {cart_id}"
        )));
    }
    let cart = store
        .find_cart(cart_id)
        .await?
        .ok_or_else(|| cart_not_found(cart_id))?;
    info!(cart_id = %cart_id, product_id = %product_id, "product removed from cart");
    Ok(CartUpdate {
        message: PRODUCT_REMOVED,
        cart,
    })
}

/// Empty the cart. Clearing an empty cart succeeds.
pub async fn clear(
    store: &dyn Store,
    claims: &TokenClaims,
    cart_id: &str,
) -> ShopResult<&'static str> {
    holder(claims, cart_id)?;

    if !store.clear_cart(cart_id).await? {
        return Err(cart_not_found(cart_id));
    }
    info!(cart_id = %cart_id, "cart cleared");
    Ok(CART_CLEARED)
}

pub async fn get(store: &dyn Store, claims: &TokenClaims, cart_id: &str) -> ShopResult<Cart> {
    holder(claims, cart_id)?;
    store
        .find_cart(cart_id)
        .await?
        .ok_or_else(|| cart_not_found(cart_id))
}
