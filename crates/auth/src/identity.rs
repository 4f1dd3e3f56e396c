//! Identity records.
//!
//! # Invariants
//! - `username` and `email` are each globally unique (enforced by the store).
//! - `version` increases by one on every persisted mutation.
//! - The guest identity is synthetic: it is never persisted and carries no
//!   password. [`Identity::guest`] is the single place it is built.

use bookshelf_core::{Entity, UserId};

use crate::Role;

/// A principal: a persisted user record, or the synthetic guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC-formatted one-way hash. `None` only for the synthetic guest.
    pub password_hash: Option<String>,
    pub role: Role,
    pub cover_image: Option<String>,
    pub version: u64,
}

impl Identity {
    /// Build the synthetic guest identity for the reserved guest username.
    ///
    /// Guests are reconstructed on demand and never persisted; the id is a
    /// placeholder that no store will ever assign.
    pub fn guest(username: impl Into<String>) -> Self {
        Self {
            id: UserId::from_raw(0),
            username: username.into(),
            email: String::new(),
            password_hash: None,
            role: Role::Guest,
            cover_image: None,
            version: 0,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.role == Role::Guest
    }
}

impl Entity for Identity {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A user record ready to be persisted (id and version are store-assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub cover_image: Option<String>,
}

/// Read-side seam the auth components use to resolve identities.
///
/// Keeping this trait here (rather than depending on the store crate) keeps
/// authentication testable with plain closures-over-maps fakes.
pub trait IdentityLookup {
    fn identity_by_username(&self, username: &str) -> Option<Identity>;
    fn identity_by_email(&self, email: &str) -> Option<Identity>;
}
