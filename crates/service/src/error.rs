//! Service-level error taxonomy.
//!
//! This is the single error surface the HTTP layer maps to status codes.
//! Only [`ServiceError::Conflict`] is a caller-retryable condition; every
//! other failure is final for that request.

use thiserror::Error;

use bookshelf_auth::{CredentialError, TokenError};
use bookshelf_store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthenticated,

    /// Deliberately opaque: never says whether the identifier or the secret
    /// was wrong.
    #[error("bad credentials")]
    BadCredentials,

    #[error("forbidden")]
    Forbidden,

    #[error("role not allowed: {0}")]
    RoleNotAllowed(String),

    #[error("identity not found")]
    IdentityNotFound,

    #[error("book not found")]
    BookNotFound,

    #[error("book already on shelf")]
    AlreadyOnShelf,

    #[error("book not on shelf")]
    NotOnShelf,

    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// Optimistic-concurrency conflict; the caller may retry the whole
    /// read-decide-write sequence from scratch.
    #[error("concurrent modification detected")]
    Conflict,

    #[error("unknown token subject")]
    UnknownSubject,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Store failures in a user-record context.
pub(crate) fn user_store_err(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound => ServiceError::IdentityNotFound,
        StoreError::Duplicate(field) => ServiceError::Duplicate(field),
        StoreError::Concurrency(_) => ServiceError::Conflict,
    }
}

/// Store failures in a book-record context.
pub(crate) fn book_store_err(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound => ServiceError::BookNotFound,
        StoreError::Duplicate(field) => ServiceError::Duplicate(field),
        StoreError::Concurrency(_) => ServiceError::Conflict,
    }
}

impl From<CredentialError> for ServiceError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingIdentifier => {
                ServiceError::validation("either a username or an email must be provided")
            }
            // Collapsed on purpose: login failures must not reveal whether
            // the identifier or the secret was wrong.
            CredentialError::UnknownIdentity | CredentialError::BadCredentials => {
                ServiceError::BadCredentials
            }
            CredentialError::Hash(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired(_) => ServiceError::Unauthenticated,
            TokenError::UnknownSubject(_) => ServiceError::UnknownSubject,
            TokenError::Key(msg) | TokenError::Sign(msg) => ServiceError::Internal(msg),
        }
    }
}
