//! Per-request actor resolution.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use bookshelf_auth::{Identity, TokenError, TokenService};
use bookshelf_store::CatalogStore;

use crate::ServiceError;

/// The effective caller of a request.
///
/// Resolved exactly once per request (in the transport layer) and passed
/// explicitly into every service call; nothing re-resolves mid-request, so
/// a concurrent mutation of the caller's record cannot split one request
/// across two views of the same identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Authenticated(Identity),
}

impl Actor {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Actor::Anonymous => None,
            Actor::Authenticated(identity) => Some(identity),
        }
    }

    /// Fail closed: role-gated operations reject anonymous callers.
    pub fn require(&self) -> Result<&Identity, ServiceError> {
        self.identity().ok_or(ServiceError::Unauthenticated)
    }
}

/// Resolves an inbound bearer token to an [`Actor`].
pub struct SessionAuthenticator<S> {
    store: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<S: CatalogStore> SessionAuthenticator<S> {
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Resolve the caller.
    ///
    /// No token → anonymous. A token naming the reserved guest username
    /// resolves to the synthetic guest without touching the store. Any other
    /// subject must still exist in the store — an identity deleted after
    /// issuance is treated as unauthenticated.
    pub fn resolve(
        &self,
        bearer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Actor, ServiceError> {
        let Some(token) = bearer else {
            return Ok(Actor::Anonymous);
        };

        let claims = match self.tokens.validate(token, now) {
            Ok(claims) => claims,
            Err(TokenError::Expired(claims)) => {
                tracing::debug!(subject = %claims.sub, "rejected expired token");
                return Err(ServiceError::Unauthenticated);
            }
            Err(_) => return Err(ServiceError::Unauthenticated),
        };

        if claims.sub == self.tokens.guest_username() {
            return Ok(Actor::Authenticated(Identity::guest(claims.sub)));
        }

        let identity = self
            .store
            .find_user_by_username(&claims.sub)
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(Actor::Authenticated(identity))
    }
}
