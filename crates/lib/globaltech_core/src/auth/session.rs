//! Session manager: registration, login, current user and role upgrade.
//!
//! Sessions are stateless. The signed token is the session; a role change
//! issues a new one instead of mutating server-side state.

use tracing::{info, warn};

use super::AuthSettings;
use super::guard::{Requirement, allow};
use super::jwt::{claims_for, encode_token, verify_token};
use super::password::{hash_password_bounded, verify_password_bounded};
use crate::error::{ShopError, ShopResult};
use crate::models::auth::{CurrentUser, Registration, Role, TokenClaims, User};
use crate::store::{EMAIL_TAKEN, Store, StoreError};
use crate::uuid::new_id;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "CoderCookie123";

/// Returned for unknown emails and wrong passwords alike.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Confirmation returned by a successful role upgrade.
pub const PREMIUM_UPGRADE_MESSAGE: &str =
    "Usuario actualizado exitosamente, su rol a sido actualizado a premium.";

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: TokenClaims,
}

impl Session {
    /// The projection exposed by the current-session endpoint.
    pub fn current_user(&self) -> CurrentUser {
        current(&self.claims)
    }
}

/// Sign a session for the user as given.
pub fn issue_session(user: &User, settings: &AuthSettings) -> ShopResult<Session> {
    let claims = claims_for(user, settings.token_ttl_secs);
    let token = encode_token(&claims, settings.secret())?;
    Ok(Session { token, claims })
}

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(candidate: &Registration) -> ShopResult<i32> {
    if candidate.first_name.trim().is_empty() {
        return Err(ShopError::Validation("first_name is required".into()));
    }
    if candidate.last_name.trim().is_empty() {
        return Err(ShopError::Validation("last_name is required".into()));
    }
    let email = candidate.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ShopError::Validation("A valid email is required".into()));
    }
    if candidate.password.is_empty() {
        return Err(ShopError::Validation("password is required".into()));
    }
    match candidate.age {
        Some(age) if (1..=150).contains(&age) => Ok(age),
        Some(_) => Err(ShopError::Validation("age must be between 1 and 150".into())),
        None => Err(ShopError::Validation("age is required".into())),
    }
}

/// Create a user with role `user` and an empty cart.
///
/// Returns the full stored record, including the password hash.
pub async fn register(
    store: &dyn Store,
    settings: &AuthSettings,
    candidate: Registration,
) -> ShopResult<User> {
    let age = validate_registration(&candidate)?;
    let email = normalize_email(&candidate.email);

    // The unique index in the store still settles concurrent registrations.
    if store.find_user_by_email(&email).await?.is_some() {
        return Err(ShopError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash =
        hash_password_bounded(candidate.password, settings.bcrypt_cost, settings.hash_timeout)
            .await?;

    let user = User {
        id: new_id(),
        first_name: candidate.first_name.trim().to_string(),
        last_name: candidate.last_name.trim().to_string(),
        email,
        age,
        password_hash,
        role: Role::User,
        cart: new_id(),
        version: 0,
    };
    let created = store.create_user(&user).await?;
    info!(user_id = %created.id, cart_id = %created.cart, "user registered");
    Ok(created)
}

/// Authenticate with email + password and issue a session token.
pub async fn login(
    store: &dyn Store,
    settings: &AuthSettings,
    email: &str,
    password: &str,
) -> ShopResult<Session> {
    let Some(user) = store.find_user_by_email(&normalize_email(email)).await? else {
        return Err(ShopError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let matches = verify_password_bounded(
        password.to_string(),
        user.password_hash.clone(),
        settings.hash_timeout,
    )
    .await?;
    if !matches {
        return Err(ShopError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let session = issue_session(&user, settings)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(session)
}

/// Verify a raw session token.
pub fn authenticate(settings: &AuthSettings, token: Option<&str>) -> ShopResult<TokenClaims> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ShopError::Unauthorized("Missing session token".into()))?;
    verify_token(token, settings.secret())
        .ok_or_else(|| ShopError::Unauthorized("Invalid or expired session token".into()))
}

/// Capability-limited view of the session.
pub fn current(claims: &TokenClaims) -> CurrentUser {
    CurrentUser::from(claims)
}

/// Raise `target_user_id` to premium and re-issue their token.
///
/// Only the user themself may upgrade. The new token is signed before the
/// role change is persisted, so a signing failure changes nothing.
/// Already-premium users get a fresh token and no error.
///
/// A store timeout does not say whether the change committed. In that case
/// the user is read back once: if the stored role is premium the caller
/// still gets the premium token, otherwise the timeout is returned.
pub async fn upgrade_to_premium(
    store: &dyn Store,
    settings: &AuthSettings,
    claims: &TokenClaims,
    target_user_id: &str,
) -> ShopResult<Session> {
    allow(
        Some(claims),
        &[Requirement::Authenticated, Requirement::Owner(target_user_id)],
    )?;

    let user = store
        .find_user_by_id(target_user_id)
        .await?
        .ok_or_else(|| ShopError::NotFound(format!("User {target_user_id} not found")))?;

    if user.role == Role::Premium {
        info!(user_id = %user.id, "user already premium");
        return issue_session(&user, settings);
    }

    let promoted = User {
        role: Role::Premium,
        ..user
    };
    let session = issue_session(&promoted, settings)?;

    let stored = match store.promote_user(target_user_id).await {
        Ok(stored) => stored,
        Err(StoreError::Timeout(elapsed)) => {
            warn!(user_id = %target_user_id, ?elapsed, "promotion timed out, re-reading user");
            match store.find_user_by_id(target_user_id).await? {
                Some(user) if user.role == Role::Premium => Some(user),
                _ => return Err(StoreError::Timeout(elapsed).into()),
            }
        }
        Err(e) => return Err(e.into()),
    }
    .ok_or_else(|| ShopError::NotFound(format!("User {target_user_id} not found")))?;
    if stored.role != session.claims.role {
        return Err(ShopError::Internal("role change was not persisted".into()));
    }

    info!(user_id = %stored.id, "user upgraded to premium");
    Ok(session)
}
