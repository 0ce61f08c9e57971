//! Cart request handlers. Every route requires the caller to hold the cart.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use globaltech_core::cart;
use globaltech_core::models::cart::{Cart, QuantityUpdate};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::AuthenticatedUser;
use crate::models::{
    MessageResponse, MessageResultResponse, Nested, QuantityRequest, ResultResponse,
};

/// `GET /api/carts/{cid}`
pub async fn get_cart_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ResultResponse<Cart>>> {
    let Path(cid) = path?;
    let cart = cart::get(state.store(), &user.0, &cid).await?;
    Ok(Json(ResultResponse::ok(cart)))
}

/// `POST /api/carts/{cid}/products/{pid}/quantity/{quantity}`
pub async fn add_product_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<(String, String, i64)>, PathRejection>,
) -> AppResult<Json<MessageResultResponse<Nested<Cart>>>> {
    let Path((cid, pid, quantity)) = path?;
    let update = cart::add_product(state.store(), &user.0, &cid, &pid, quantity).await?;
    Ok(Json(MessageResultResponse {
        status_code: 200,
        message: update.message.to_string(),
        result: Nested {
            result: update.cart,
        },
    }))
}

/// `PUT /api/carts/{cid}/products/{pid}` with body `{quantity}`.
pub async fn set_quantity_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Json<QuantityRequest>, JsonRejection>,
) -> AppResult<Json<ResultResponse<QuantityUpdate>>> {
    let Path((cid, pid)) = path?;
    let Json(body) = body?;
    let update = cart::set_quantity(state.store(), &user.0, &cid, &pid, body.quantity).await?;
    Ok(Json(ResultResponse::ok(update)))
}

/// `DELETE /api/carts/{cid}/products/{pid}`
pub async fn remove_product_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path((cid, pid)) = path?;
    let update = cart::remove_product(state.store(), &user.0, &cid, &pid).await?;
    Ok(Json(MessageResponse::ok(update.message)))
}

/// `DELETE /api/carts/{cid}`: empty the cart.
pub async fn clear_cart_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(cid) = path?;
    let message = cart::clear(state.store(), &user.0, &cid).await?;
    Ok(Json(MessageResponse::ok(message)))
}
