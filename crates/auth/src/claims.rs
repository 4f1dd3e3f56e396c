use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Signed token payload (transport-agnostic).
///
/// Field names follow the registered JWT claim names (`sub`, `iat`, `exp`)
/// so tokens stay interoperable with other consumers of the same secret.
/// Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's username.
    pub sub: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: sub.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Expiry check against an injected clock. Expiry is deliberately
    /// separate from signature validity: an expired token still carries
    /// trustworthy, signature-checked claims.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
