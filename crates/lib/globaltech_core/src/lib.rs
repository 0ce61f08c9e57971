//! # globaltech_core
//!
//! Core domain logic for Global Technology: stateless sessions with a one-way
//! role upgrade, the product catalog and per-user carts.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

#[cfg(test)]
mod testing;

pub use error::{ShopError, ShopResult};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
