//! Identity, role and session-token models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of roles. Upgrades only ever go `User` → `Premium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Premium,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Premium => "premium",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record.
///
/// Serializes to the registration response shape
/// `{_id, first_name, last_name, email, age, password, role, cart, __v}`,
/// where `password` carries the bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i32,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub role: Role,
    /// Id of the user's cart; fixed at registration.
    pub cart: String,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl User {
    /// Display name used in session projections.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration request body.
#[derive(Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("age", &self.age)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Claims carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID.
    pub sub: String,
    /// "First Last".
    pub name: String,
    pub email: String,
    /// The user's cart id.
    pub cart: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Projection returned by `GET /api/sessions/current`.
///
/// Only these five fields ever leave the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub name: String,
    pub cart: String,
    pub email: String,
    pub user_id: String,
    pub role: Role,
}

impl From<&TokenClaims> for CurrentUser {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            name: claims.name.clone(),
            cart: claims.cart.clone(),
            email: claims.email.clone(),
            user_id: claims.sub.clone(),
            role: claims.role,
        }
    }
}
