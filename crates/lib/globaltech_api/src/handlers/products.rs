//! Product catalog request handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use globaltech_core::catalog;
use globaltech_core::models::catalog::{
    DeleteSummary, NewProduct, Product, ProductPatch, ProductQuery, UpdateSummary,
};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::AuthenticatedUser;
use crate::models::ResultResponse;

/// `GET /api/products`: list products, optionally by category.
pub async fn list_products_handler(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> AppResult<Json<ResultResponse<Vec<Product>>>> {
    let Query(query) = query?;
    let products = catalog::list(state.store(), &query).await?;
    Ok(Json(ResultResponse::ok(products)))
}

/// `GET /api/products/{pid}`
pub async fn get_product_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ResultResponse<Product>>> {
    let Path(pid) = path?;
    let product = catalog::get(state.store(), &pid).await?;
    Ok(Json(ResultResponse::ok(product)))
}

/// `POST /api/products`: premium only; the caller becomes the owner.
pub async fn create_product_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> AppResult<Json<ResultResponse<Product>>> {
    let Json(input) = body?;
    let product = catalog::create(state.store(), &user.0, input).await?;
    Ok(Json(ResultResponse::ok(product)))
}

/// `PUT /api/products/{pid}`: owner only.
pub async fn update_product_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> AppResult<Json<ResultResponse<UpdateSummary>>> {
    let Path(pid) = path?;
    let Json(patch) = body?;
    let summary = catalog::update(state.store(), &user.0, &pid, patch).await?;
    Ok(Json(ResultResponse::ok(summary)))
}

/// `DELETE /api/products/{pid}`: owner only.
pub async fn delete_product_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ResultResponse<DeleteSummary>>> {
    let Path(pid) = path?;
    let summary = catalog::remove(state.store(), &user.0, &pid).await?;
    Ok(Json(ResultResponse::ok(summary)))
}
