//! API server configuration.

use std::time::Duration;

use globaltech_core::auth::AuthSettings;
use globaltech_core::auth::jwt::resolve_jwt_secret;
use globaltech_core::store::timed::DEFAULT_STORE_TIMEOUT;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Token signing and password hashing settings.
    pub auth: AuthSettings,
    /// Bound on every store call.
    pub store_timeout: Duration,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable           | Default                                     |
    /// |--------------------|---------------------------------------------|
    /// | `BIND_ADDR`        | `127.0.0.1:8080`                            |
    /// | `DATABASE_URL`     | `postgres://localhost:5432/globaltech`      |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file     |
    /// | `TOKEN_TTL_SECS`   | `86400`                                     |
    /// | `BCRYPT_COST`      | `10`                                        |
    /// | `STORE_TIMEOUT_MS` | `5000`                                      |
    /// | `SECURE_COOKIES`   | `false`                                     |
    pub fn from_env() -> Self {
        let mut auth = AuthSettings::new(resolve_jwt_secret());
        if let Some(ttl) = env_parse("TOKEN_TTL_SECS") {
            auth.token_ttl_secs = ttl;
        }
        if let Some(cost) = env_parse("BCRYPT_COST") {
            auth.bcrypt_cost = cost;
        }

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/globaltech".into()),
            auth,
            store_timeout: env_parse("STORE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
            secure_cookies: env_parse("SECURE_COOKIES").unwrap_or(false),
        }
    }

    /// Configuration for tests and in-process use: no environment lookups.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: String::new(),
            auth: AuthSettings::new(jwt_secret),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            secure_cookies: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
