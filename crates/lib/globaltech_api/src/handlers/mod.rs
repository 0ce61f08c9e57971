//! Request handlers.

pub mod carts;
pub mod products;
pub mod sessions;
