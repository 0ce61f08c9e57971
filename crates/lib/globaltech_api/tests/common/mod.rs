//! Helpers for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use globaltech_api::{AppState, config::ApiConfig};
use globaltech_core::store::{MemoryStore, Store};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` of the first `Set-Cookie` header, ready to send back.
    pub fn session_cookie(&self) -> String {
        let raw = self
            .headers
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let mut config = ApiConfig::with_secret("integration-secret");
        config.auth.bcrypt_cost = 4;
        Self {
            state: AppState::new(store, config),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = globaltech_api::app(self.state.clone())
            .oneshot(req)
            .await
            .expect("request");

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a user and return their id.
    pub async fn register(&self, email: &str) -> String {
        let resp = self
            .request(
                Method::POST,
                "/api/sessions/register",
                None,
                Some(serde_json::json!({
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "email": email,
                    "age": 36,
                    "password": "s3cret-pass",
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
        resp.body["user"]["_id"].as_str().unwrap().to_string()
    }

    /// Log in and return the cookie to send on later requests.
    pub async fn login(&self, email: &str) -> String {
        let resp = self
            .request(
                Method::POST,
                "/api/sessions/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "s3cret-pass" })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
        resp.session_cookie()
    }

    /// Register, log in and upgrade; returns `(user id, cart id, premium cookie)`.
    pub async fn premium_user(&self, email: &str) -> (String, String, String) {
        let uid = self.register(email).await;
        let cookie = self.login(email).await;
        let resp = self
            .request(
                Method::POST,
                &format!("/api/sessions/premium/{uid}"),
                Some(&cookie),
                None,
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
        let cookie = resp.session_cookie();
        let current = self
            .request(Method::GET, "/api/sessions/current", Some(&cookie), None)
            .await;
        let cart = current.body["cart"].as_str().unwrap().to_string();
        (uid, cart, cookie)
    }

    /// Create a product as the given premium user and return its id.
    pub async fn create_product(&self, cookie: &str, code: &str) -> String {
        let resp = self
            .request(
                Method::POST,
                "/api/products",
                Some(cookie),
                Some(product_body(code)),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
        resp.body["result"]["_id"].as_str().unwrap().to_string()
    }
}

pub fn product_body(code: &str) -> Value {
    serde_json::json!({
        "title": "Desk Lamp",
        "description": "Warm light",
        "code": code,
        "price": 1500,
        "stock": 7,
        "category": "Home",
        "thumbnails": ["https://img.example/lamp.png"],
    })
}

pub fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}
