//! `bookshelf-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Store access
//! happens through the small [`IdentityLookup`] seam; everything else is
//! deterministic computation over identities, roles and claims.

pub mod claims;
pub mod credentials;
pub mod identity;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::Claims;
pub use credentials::{verify_credentials, ArgonHasher, CredentialError, CredentialHasher};
pub use identity::{Identity, IdentityLookup, NewIdentity};
pub use policy::{may_create_identity, may_delete_identity, may_mutate_book, may_update_identity};
pub use roles::Role;
pub use token::{TokenError, TokenService};
