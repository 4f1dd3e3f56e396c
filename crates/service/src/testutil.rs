//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::Duration;

use bookshelf_auth::{
    CredentialError, CredentialHasher, Identity, NewIdentity, Role, TokenService,
};
use bookshelf_catalog::{Book, Isbn, NewBook, PublishDate};
use bookshelf_store::{CatalogStore, InMemoryStore};

pub const SECRET: &str = "c2VjcmV0LXNpZ25pbmcta2V5";
pub const GUEST: &str = "guestuser";
pub const TTL_MINUTES: i64 = 10;

/// Reversible stand-in for argon2 so tests stay fast. Same contract: opaque
/// stored form, deterministic match.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(format!("plain:{plaintext}"))
    }

    fn matches(&self, plaintext: &str, hash: &str) -> bool {
        hash == format!("plain:{plaintext}")
    }
}

pub fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(SECRET, Duration::minutes(TTL_MINUTES), GUEST).unwrap())
}

pub fn insert_account(store: &InMemoryStore, username: &str, role: Role) -> Identity {
    store
        .insert_user(NewIdentity {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: format!("plain:{username}-pw"),
            role,
            cover_image: None,
        })
        .unwrap()
}

/// A store with one READER ("alice", password "alice-pw" under
/// [`PlainHasher`]).
pub fn seeded_store() -> (Arc<InMemoryStore>, Identity) {
    let store = Arc::new(InMemoryStore::new());
    let alice = insert_account(&store, "alice", Role::Reader);
    (store, alice)
}

pub fn insert_sample_book(store: &InMemoryStore, title: &str, isbn: &str) -> Book {
    store
        .insert_book(NewBook {
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            isbn: Isbn::parse(isbn).unwrap(),
            price: "9.99".to_string(),
            published: PublishDate::new(8, 1965).unwrap(),
            cover_image: None,
        })
        .unwrap()
}
