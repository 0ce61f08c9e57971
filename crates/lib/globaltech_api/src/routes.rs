//! Route paths.

pub const POST_SESSIONS_REGISTER: &str = "/api/sessions/register";
pub const POST_SESSIONS_LOGIN: &str = "/api/sessions/login";
pub const POST_SESSIONS_LOGOUT: &str = "/api/sessions/logout";
pub const GET_SESSIONS_CURRENT: &str = "/api/sessions/current";
pub const POST_SESSIONS_PREMIUM_ID: &str = "/api/sessions/premium/{uid}";

pub const GET_PRODUCTS: &str = "/api/products";
pub const POST_PRODUCTS: &str = "/api/products";
pub const GET_PRODUCTS_ID: &str = "/api/products/{pid}";
/// `PUT` and `DELETE`.
pub const PRODUCTS_ID: &str = "/api/products/{pid}";

/// `GET` and `DELETE`.
pub const CARTS_ID: &str = "/api/carts/{cid}";
pub const POST_CARTS_ID_PRODUCTS_ID_QUANTITY: &str =
    "/api/carts/{cid}/products/{pid}/quantity/{quantity}";
/// `PUT` and `DELETE`.
pub const CARTS_ID_PRODUCTS_ID: &str = "/api/carts/{cid}/products/{pid}";
