//! Error envelopes: every failure answers `{statusCode, message}`.

mod common;

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode, header};
use common::TestApp;
use globaltech_core::models::auth::User;
use globaltech_core::models::cart::Cart;
use globaltech_core::models::catalog::{Product, ProductPatch, ProductQuery};
use globaltech_core::store::{Store, StoreResult, TimedStore};
use serde_json::json;

#[tokio::test]
async fn missing_cookie_is_unauthorized() {
    let app = TestApp::new();
    let resp = app
        .request(Method::GET, "/api/sessions/current", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["statusCode"], 401);
    assert!(resp.body["message"].is_string());
}

#[tokio::test]
async fn forged_cookie_is_unauthorized() {
    let app = TestApp::new();
    let resp = app
        .request(
            Method::GET,
            "/api/sessions/current",
            Some("CoderCookie123=not.a.token"),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::new();
    app.register("ada@example.com").await;

    let wrong = app
        .request(
            Method::POST,
            "/api/sessions/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "nope" })),
        )
        .await;
    let unknown = app
        .request(
            Method::POST,
            "/api/sessions/login",
            None,
            Some(json!({ "email": "bob@example.com", "password": "s3cret-pass" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
    assert!(wrong.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = TestApp::new();
    app.register("ada@example.com").await;
    let resp = app
        .request(
            Method::POST,
            "/api/sessions/register",
            None,
            Some(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "age": 36,
                "password": "another",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["statusCode"], 409);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let app = TestApp::new();
    let resp = app
        .request(
            Method::POST,
            "/api/sessions/register",
            None,
            Some(json!({ "age": "thirty" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["statusCode"], 400);
}

#[tokio::test]
async fn non_numeric_quantity_is_a_validation_error() {
    let app = TestApp::new();
    app.register("ada@example.com").await;
    let cookie = app.login("ada@example.com").await;
    let resp = app
        .request(
            Method::POST,
            "/api/carts/c1/products/p1/quantity/lots",
            Some(&cookie),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let app = TestApp::new();
    let resp = app
        .request(Method::GET, "/api/products/does-not-exist", None, None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["statusCode"], 404);
}

#[tokio::test]
async fn cart_quantity_overflow_is_a_validation_error() {
    let app = TestApp::new();
    let (_, _, seller) = app.premium_user("seller@example.com").await;
    let pid = app.create_product(&seller, "LAMP-1").await;
    app.register("buyer@example.com").await;
    let buyer = app.login("buyer@example.com").await;
    let current = app
        .request(Method::GET, "/api/sessions/current", Some(&buyer), None)
        .await;
    let cid = current.body["cart"].as_str().unwrap().to_string();

    let add_uri = |quantity: i64| format!("/api/carts/{cid}/products/{pid}/quantity/{quantity}");
    let resp = app
        .request(Method::POST, &add_uri(i64::MAX), Some(&buyer), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    let resp = app
        .request(Method::POST, &add_uri(1), Some(&buyer), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["statusCode"], 400);

    let cart = app
        .request(Method::GET, &format!("/api/carts/{cid}"), Some(&buyer), None)
        .await;
    assert_eq!(cart.body["result"]["products"][0]["quantity"], i64::MAX);
}

/// A store that never answers.
struct StalledStore;

async fn stall<T>() -> T {
    pending().await
}

#[async_trait]
impl Store for StalledStore {
    async fn create_user(&self, _: &User) -> StoreResult<User> {
        stall().await
    }
    async fn find_user_by_email(&self, _: &str) -> StoreResult<Option<User>> {
        stall().await
    }
    async fn find_user_by_id(&self, _: &str) -> StoreResult<Option<User>> {
        stall().await
    }
    async fn promote_user(&self, _: &str) -> StoreResult<Option<User>> {
        stall().await
    }
    async fn create_product(&self, _: &Product) -> StoreResult<Product> {
        stall().await
    }
    async fn find_product(&self, _: &str) -> StoreResult<Option<Product>> {
        stall().await
    }
    async fn list_products(&self, _: &ProductQuery) -> StoreResult<Vec<Product>> {
        stall().await
    }
    async fn update_product(&self, _: &str, _: &ProductPatch) -> StoreResult<Option<bool>> {
        stall().await
    }
    async fn delete_product(&self, _: &str) -> StoreResult<bool> {
        stall().await
    }
    async fn find_cart(&self, _: &str) -> StoreResult<Option<Cart>> {
        stall().await
    }
    async fn add_to_cart(&self, _: &str, _: &str, _: i64) -> StoreResult<Option<Cart>> {
        stall().await
    }
    async fn set_cart_quantity(&self, _: &str, _: &str, _: i64) -> StoreResult<Option<i64>> {
        stall().await
    }
    async fn remove_from_cart(&self, _: &str, _: &str) -> StoreResult<bool> {
        stall().await
    }
    async fn clear_cart(&self, _: &str) -> StoreResult<bool> {
        stall().await
    }
}

#[tokio::test]
async fn store_timeout_is_service_unavailable() {
    let store = TimedStore::new(StalledStore, Duration::from_millis(20));
    let app = TestApp::with_store(Arc::new(store));

    let resp = app.request(Method::GET, "/api/products", None, None).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.body["statusCode"], 503);
    assert_eq!(resp.headers[header::RETRY_AFTER], "1");
}
