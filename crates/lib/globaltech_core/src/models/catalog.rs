//! Product catalog models.

use serde::{Deserialize, Serialize};

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a catalog page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub code: String,
    /// Minor currency units.
    pub price: i64,
    pub stock: i64,
    pub category: String,
    pub thumbnails: Vec<String>,
    /// The premium user who created the product.
    #[serde(rename = "owner")]
    pub owner_id: String,
    #[serde(rename = "__v")]
    pub version: i32,
}

/// Product creation request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Partial product update. Absent fields are left untouched; ownership and
/// identity are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    /// Apply the patch in place. Returns whether any field changed.
    pub fn apply(&self, product: &mut Product) -> bool {
        let mut changed = false;
        changed |= patch_field(&mut product.title, &self.title);
        changed |= patch_field(&mut product.description, &self.description);
        changed |= patch_field(&mut product.code, &self.code);
        changed |= patch_field(&mut product.price, &self.price);
        changed |= patch_field(&mut product.stock, &self.stock);
        changed |= patch_field(&mut product.category, &self.category);
        changed |= patch_field(&mut product.thumbnails, &self.thumbnails);
        changed
    }
}

fn patch_field<T: PartialEq + Clone>(slot: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(v) if v != slot => {
            *slot = v.clone();
            true
        }
        _ => false,
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ProductQuery {
    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Number of entries to skip for the requested (1-based) page.
    pub fn offset(&self) -> u32 {
        self.page
            .unwrap_or(1)
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.limit())
    }
}

/// Result of `PUT /api/products/{pid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub modified_count: u64,
}

/// Result of `DELETE /api/products/{pid}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: u64,
}
