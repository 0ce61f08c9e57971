//! Domain models.
//!
//! The serde shapes here are the wire shapes: the API crate serializes these
//! types directly (`_id`, `__v`, snake_case user fields, camelCase projections).

pub mod auth;
pub mod cart;
pub mod catalog;
