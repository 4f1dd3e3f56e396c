//! Environment-driven configuration.

use chrono::Duration;

const DEFAULT_TTL_MS: i64 = 3_600_000;
// base64("dev-secret"); never intended for anything beyond local runs.
const DEV_SECRET_B64: &str = "ZGV2LXNlY3JldA==";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HS256 key material, base64-encoded.
    pub token_secret: String,
    pub token_ttl: Duration,
    /// Reserved username that resolves to the synthetic guest.
    pub guest_username: String,
    pub root_username: String,
    pub root_email: String,
    pub root_password: String,
    pub bind_addr: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let token_secret = std::env::var("BOOKSHELF_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("BOOKSHELF_TOKEN_SECRET not set; using insecure dev default");
            DEV_SECRET_B64.to_string()
        });

        let token_ttl_ms = std::env::var("BOOKSHELF_TOKEN_TTL_MS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TTL_MS);

        let root_password = std::env::var("BOOKSHELF_ROOT_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("BOOKSHELF_ROOT_PASSWORD not set; using insecure dev default");
            "changeme".to_string()
        });

        Self {
            token_secret,
            token_ttl: Duration::milliseconds(token_ttl_ms),
            guest_username: env_or("BOOKSHELF_GUEST_USERNAME", "guestuser"),
            root_username: env_or("BOOKSHELF_ROOT_USERNAME", "superuser"),
            root_email: env_or("BOOKSHELF_ROOT_EMAIL", "super@localhost"),
            root_password,
            bind_addr: env_or("BOOKSHELF_BIND_ADDR", "0.0.0.0:8080"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
