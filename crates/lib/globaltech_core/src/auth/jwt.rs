//! Session token codec: HS256 JWTs carrying identity, cart and role.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use crate::error::{ShopError, ShopResult};
use crate::models::auth::{TokenClaims, User};

/// Default session token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Build the claims for a user as currently stored.
pub fn claims_for(user: &User, ttl_secs: i64) -> TokenClaims {
    let now = Utc::now();
    TokenClaims {
        sub: user.id.clone(),
        name: user.full_name(),
        email: user.email.clone(),
        cart: user.cart.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    }
}

/// Sign claims into a compact token.
pub fn encode_token(claims: &TokenClaims, secret: &[u8]) -> ShopResult<String> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|e| ShopError::Internal(format!("jwt encode: {e}")))
}

/// Verify a token, returning the claims on success.
///
/// Bad signatures, malformed tokens and expired tokens all yield `None`.
pub fn verify_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    match decode::<TokenClaims>(token, &key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!(error = %e, "rejected session token");
            None
        }
    }
}

/// Environment variables consulted for the signing secret, in order.
const SECRET_VARS: [&str; 2] = ["JWT_SECRET", "AUTH_SECRET"];

/// Pick the token signing secret.
///
/// The first non-empty variable in [`SECRET_VARS`] wins. Otherwise the
/// secret kept in [`secret_file`] is used, generated on first start.
/// Instances sharing cookies must share the secret, so production sets
/// `JWT_SECRET`.
pub fn resolve_jwt_secret() -> String {
    SECRET_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| stored_secret(&secret_file()))
}

/// Default location of the generated secret.
pub fn secret_file() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("globaltech").join("session-secret")
}

/// Read the secret kept at `path`, generating one when the file is missing
/// or blank. A secret that cannot be saved still serves this process, but
/// tokens signed with it stop verifying after a restart.
fn stored_secret(path: &Path) -> String {
    if let Ok(kept) = fs::read_to_string(path) {
        let kept = kept.trim();
        if !kept.is_empty() {
            return kept.to_owned();
        }
    }

    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match save_secret(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated session secret"),
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "could not save generated session secret; sessions end on restart"
        ),
    }
    secret
}

fn save_secret(path: &Path, secret: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, secret)
}
