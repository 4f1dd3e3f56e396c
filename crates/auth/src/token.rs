//! Bearer-token issuance and validation (HS256-signed claims).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{Claims, Identity, IdentityLookup};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed token or signature mismatch. No claims are recoverable.
    #[error("token is malformed or its signature does not verify")]
    Invalid,

    /// Signature verified but the expiry has passed. The claims are kept so
    /// callers can log who presented the stale token.
    #[error("token expired for subject '{}'", .0.sub)]
    Expired(Claims),

    /// Issuance was requested for an identity that no longer exists.
    #[error("unknown token subject '{0}'")]
    UnknownSubject(String),

    #[error("bad signing key material: {0}")]
    Key(String),

    #[error("token signing failed: {0}")]
    Sign(String),
}

/// Stateless token mint + validator.
///
/// Key material is decoded from the base64 secret once, at construction;
/// every issue/validate call reuses the same keys. The clock is an explicit
/// argument everywhere, so the service is a pure function of (secret, now).
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    guest_username: String,
}

impl TokenService {
    pub fn new(
        secret_base64: &str,
        ttl: Duration,
        guest_username: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_base64_secret(secret_base64)
            .map_err(|e| TokenError::Key(e.to_string()))?;
        let decoding = DecodingKey::from_base64_secret(secret_base64)
            .map_err(|e| TokenError::Key(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked after decoding so that the claims of an expired
        // token remain extractable.
        validation.validate_exp = false;

        Ok(Self {
            encoding,
            decoding,
            validation,
            ttl,
            guest_username: guest_username.into(),
        })
    }

    pub fn guest_username(&self) -> &str {
        &self.guest_username
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `identity`.
    ///
    /// With no identity (or the reserved guest username) the synthetic guest
    /// is substituted, so a token is always mintable. For real identities the
    /// subject is re-resolved through `directory` first; a stale reference to
    /// a since-deleted account fails with [`TokenError::UnknownSubject`].
    pub fn issue<L>(
        &self,
        directory: &L,
        identity: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>
    where
        L: IdentityLookup + ?Sized,
    {
        let subject = match identity {
            None => Identity::guest(self.guest_username.as_str()),
            Some(id) if id.username == self.guest_username => {
                Identity::guest(self.guest_username.as_str())
            }
            Some(id) => directory
                .identity_by_username(&id.username)
                .ok_or_else(|| TokenError::UnknownSubject(id.username.clone()))?,
        };

        let claims = Claims::new(subject.username, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Sign(e.to_string()))
    }

    /// Signature-check and decode a token.
    ///
    /// A valid signature with a past expiry yields [`TokenError::Expired`]
    /// carrying the decoded claims; anything else that fails yields
    /// [`TokenError::Invalid`] with no claims.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        let claims = data.claims;
        if claims.is_expired(now) {
            return Err(TokenError::Expired(claims));
        }
        Ok(claims)
    }

    /// True iff the token's subject matches `candidate` AND the token has not
    /// expired. Either condition failing alone invalidates.
    pub fn is_valid(&self, token: &str, candidate: &Identity, now: DateTime<Utc>) -> bool {
        matches!(self.validate(token, now), Ok(claims) if claims.sub == candidate.username)
    }
}
