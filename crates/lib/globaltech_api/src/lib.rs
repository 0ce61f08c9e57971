//! # globaltech_api
//!
//! HTTP API library for Global Technology.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use globaltech_core::auth::AuthSettings;
use globaltech_core::store::Store;
use sqlx::PgPool;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{carts, products, sessions};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, products and carts.
    pub store: Arc<dyn Store>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Self {
        Self { store, config }
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.config.auth
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Run embedded database migrations.
///
/// Delegates to `globaltech_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    globaltech_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no session required)
    let public = Router::new()
        .route(routes::POST_SESSIONS_REGISTER, post(sessions::register_handler))
        .route(routes::POST_SESSIONS_LOGIN, post(sessions::login_handler))
        .route(routes::POST_SESSIONS_LOGOUT, post(sessions::logout_handler))
        .route(routes::GET_PRODUCTS, get(products::list_products_handler))
        .route(routes::GET_PRODUCTS_ID, get(products::get_product_handler));

    // Protected routes (require the session cookie)
    let protected = Router::new()
        .route(routes::GET_SESSIONS_CURRENT, get(sessions::current_handler))
        .route(
            routes::POST_SESSIONS_PREMIUM_ID,
            post(sessions::premium_handler),
        )
        .route(routes::POST_PRODUCTS, post(products::create_product_handler))
        .route(
            routes::PRODUCTS_ID,
            put(products::update_product_handler).delete(products::delete_product_handler),
        )
        .route(
            routes::CARTS_ID,
            get(carts::get_cart_handler).delete(carts::clear_cart_handler),
        )
        .route(
            routes::POST_CARTS_ID_PRODUCTS_ID_QUANTITY,
            post(carts::add_product_handler),
        )
        .route(
            routes::CARTS_ID_PRODUCTS_ID,
            put(carts::set_quantity_handler).delete(carts::remove_product_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::require_session,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// The router wrapped so that `/api/products/` and `/api/products` route
/// the same way. Path normalization has to run before routing, so it wraps
/// the router instead of being one of its layers.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
