//! Request bodies and response envelopes.
//!
//! Every response carries the HTTP status code in `statusCode`.

use globaltech_core::models::auth::User;
use serde::{Deserialize, Serialize};

/// `POST /api/sessions/login` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `PUT /api/carts/{cid}/products/{pid}` body.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

/// `{statusCode, message}`, used for confirmations and errors alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub status_code: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            message: message.into(),
        }
    }
}

/// `{statusCode, user}` returned by registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub status_code: u16,
    pub user: User,
}

/// `{statusCode, result}` for catalog and cart reads and writes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse<T> {
    pub status_code: u16,
    pub result: T,
}

impl<T> ResultResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            status_code: 200,
            result,
        }
    }
}

/// `{statusCode, message, result}`, used when a cart mutation reports both a
/// confirmation and the resulting cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResultResponse<T> {
    pub status_code: u16,
    pub message: String,
    pub result: T,
}

/// Nests the updated cart as `result.result`.
#[derive(Debug, Clone, Serialize)]
pub struct Nested<T> {
    pub result: T,
}
