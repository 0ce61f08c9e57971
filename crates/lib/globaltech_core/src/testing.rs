//! Shared fixtures for unit tests.

use crate::auth::AuthSettings;
use crate::auth::session::{Session, login, register};
use crate::models::auth::{Registration, User};
use crate::models::catalog::NewProduct;
use crate::store::Store;

/// Settings with the cheapest bcrypt cost.
pub fn settings() -> AuthSettings {
    AuthSettings {
        bcrypt_cost: 4,
        ..AuthSettings::new("test-secret")
    }
}

pub fn registration(email: &str) -> Registration {
    Registration {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: email.into(),
        age: Some(36),
        password: "s3cret-pass".into(),
    }
}

/// Register and log in; returns the stored user and their session.
pub async fn signed_in(store: &dyn Store, email: &str) -> (User, Session) {
    let s = settings();
    let user = register(store, &s, registration(email)).await.unwrap();
    let session = login(store, &s, email, "s3cret-pass").await.unwrap();
    (user, session)
}

/// Register, log in and upgrade to premium.
pub async fn premium(store: &dyn Store, email: &str) -> (User, Session) {
    let (user, session) = signed_in(store, email).await;
    let upgraded =
        crate::auth::session::upgrade_to_premium(store, &settings(), &session.claims, &user.id)
            .await
            .unwrap();
    (user, upgraded)
}

pub fn new_product(code: &str) -> NewProduct {
    NewProduct {
        title: "Desk Lamp".into(),
        description: "Warm light".into(),
        code: code.into(),
        price: Some(1500),
        stock: Some(7),
        category: "Home".into(),
        thumbnails: vec!["https://img.example/lamp.png".into()],
    }
}
