//! Product catalog.
//!
//! Reads are public. Writes require the premium role, and updates/deletes
//! additionally require ownership of the product.

use tracing::info;

use crate::auth::guard::{Requirement, allow};
use crate::error::{ShopError, ShopResult};
use crate::models::auth::{Role, TokenClaims};
use crate::models::catalog::{
    DeleteSummary, NewProduct, Product, ProductPatch, ProductQuery, UpdateSummary,
};
use crate::store::Store;
use crate::uuid::new_id;

fn require_text(field: &str, value: &str) -> ShopResult<()> {
    if value.trim().is_empty() {
        return Err(ShopError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_price(price: i64) -> ShopResult<()> {
    if price <= 0 {
        return Err(ShopError::Validation("price must be greater than 0".into()));
    }
    Ok(())
}

fn require_stock(stock: i64) -> ShopResult<()> {
    if stock < 0 {
        return Err(ShopError::Validation("stock cannot be negative".into()));
    }
    Ok(())
}

fn require_thumbnails(thumbnails: &[String]) -> ShopResult<()> {
    if thumbnails.iter().any(|t| t.trim().is_empty()) {
        return Err(ShopError::Validation("thumbnails cannot contain empty entries".into()));
    }
    Ok(())
}

fn validate_patch(patch: &ProductPatch) -> ShopResult<()> {
    if let Some(title) = &patch.title {
        require_text("title", title)?;
    }
    if let Some(description) = &patch.description {
        require_text("description", description)?;
    }
    if let Some(code) = &patch.code {
        require_text("code", code)?;
    }
    if let Some(category) = &patch.category {
        require_text("category", category)?;
    }
    if let Some(price) = patch.price {
        require_price(price)?;
    }
    if let Some(stock) = patch.stock {
        require_stock(stock)?;
    }
    if let Some(thumbnails) = &patch.thumbnails {
        require_thumbnails(thumbnails)?;
    }
    Ok(())
}

/// Create a product owned by the acting premium user.
pub async fn create(
    store: &dyn Store,
    claims: &TokenClaims,
    input: NewProduct,
) -> ShopResult<Product> {
    let claims = allow(
        Some(claims),
        &[Requirement::Authenticated, Requirement::Role(Role::Premium)],
    )?;

    require_text("title", &input.title)?;
    require_text("description", &input.description)?;
    require_text("code", &input.code)?;
    require_text("category", &input.category)?;
    let price = input
        .price
        .ok_or_else(|| ShopError::Validation("price is required".into()))?;
    require_price(price)?;
    let stock = input
        .stock
        .ok_or_else(|| ShopError::Validation("stock is required".into()))?;
    require_stock(stock)?;
    require_thumbnails(&input.thumbnails)?;

    let product = Product {
        id: new_id(),
        title: input.title,
        description: input.description,
        code: input.code,
        price,
        stock,
        category: input.category,
        thumbnails: input.thumbnails,
        owner_id: claims.sub.clone(),
        version: 0,
    };
    let created = store.create_product(&product).await?;
    info!(product_id = %created.id, owner_id = %created.owner_id, "product created");
    Ok(created)
}

/// Load a product and check the acting user may modify it.
async fn owned_product(store: &dyn Store, claims: &TokenClaims, id: &str) -> ShopResult<Product> {
    allow(
        Some(claims),
        &[Requirement::Authenticated, Requirement::Role(Role::Premium)],
    )?;
    let product = get(store, id).await?;
    allow(Some(claims), &[Requirement::Owner(&product.owner_id)])?;
    Ok(product)
}

/// Apply a partial update. A patch that changes nothing reports
/// `modifiedCount: 0`.
pub async fn update(
    store: &dyn Store,
    claims: &TokenClaims,
    id: &str,
    patch: ProductPatch,
) -> ShopResult<UpdateSummary> {
    owned_product(store, claims, id).await?;
    validate_patch(&patch)?;

    let changed = store
        .update_product(id, &patch)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {id} not found")))?;
    if changed {
        info!(product_id = %id, "product updated");
    }
    Ok(UpdateSummary {
        modified_count: u64::from(changed),
    })
}

/// Delete a product. Cart line items referencing it are removed too.
pub async fn remove(
    store: &dyn Store,
    claims: &TokenClaims,
    id: &str,
) -> ShopResult<DeleteSummary> {
    owned_product(store, claims, id).await?;

    if !store.delete_product(id).await? {
        return Err(ShopError::NotFound(format!("Product {id} not found")));
    }
    info!(product_id = %id, "product deleted");
    Ok(DeleteSummary { deleted_count: 1 })
}

/// Fetch a single product.
pub async fn get(store: &dyn Store, id: &str) -> ShopResult<Product> {
    store
        .find_product(id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("Product {id} not found")))
}

/// List products in creation order.
pub async fn list(store: &dyn Store, query: &ProductQuery) -> ShopResult<Vec<Product>> {
    Ok(store.list_products(query).await?)
}
