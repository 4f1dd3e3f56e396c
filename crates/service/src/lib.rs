//! `bookshelf-service` — application services over the store and the auth
//! boundary.
//!
//! Services take the resolved [`Actor`] as an explicit argument on every
//! call; there is no ambient "current principal" state anywhere in the
//! system. Authorization denials come back as [`ServiceError::Forbidden`],
//! never as panics.

pub mod accounts;
pub mod books;
pub mod error;
pub mod session;
pub mod shelf;

#[cfg(test)]
mod testutil;

pub use accounts::{AccountService, IdentityDraft, IdentityPatch, LoginOutcome, SignupRequest};
pub use books::{BookDraft, BookPatch, BookService};
pub use error::ServiceError;
pub use session::{Actor, SessionAuthenticator};
pub use shelf::ShelfService;
