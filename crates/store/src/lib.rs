//! `bookshelf-store` — persistence seam for identities, books and shelf
//! membership.
//!
//! The [`CatalogStore`] trait is the only storage contract the rest of the
//! system sees: uniqueness-enforcing inserts, conditional-write-on-version
//! updates, and the dual-version membership link/unlink primitive.

pub mod memory;
pub mod store;

pub use memory::InMemoryStore;
pub use store::{CatalogStore, StoreDirectory, StoreError};
