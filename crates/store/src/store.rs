use std::sync::Arc;

use thiserror::Error;

use bookshelf_auth::{Identity, IdentityLookup, NewIdentity};
use bookshelf_catalog::{Book, NewBook};
use bookshelf_core::{BookId, ExpectedVersion, UserId};

/// Store operation error.
///
/// These are **infrastructure** failures (uniqueness, concurrency, misses),
/// as opposed to domain validation which happens before a record reaches the
/// store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The entity's version moved since it was read; the write was rejected
    /// before being applied.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A uniqueness constraint (username/email/title/isbn) was violated.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("not found")]
    NotFound,
}

/// Uniqueness-constrained, version-checked storage for the catalog.
///
/// ## Write semantics
///
/// - `insert_*` assigns the id, sets `version` to 1 and rejects duplicates.
/// - `update_*` checks the caller's [`ExpectedVersion`] against the current
///   record **before** writing, then persists with `version + 1`.
/// - `link_book` / `unlink_book` mutate the membership set and bump **both**
///   the user and the book version; either expectation failing rejects the
///   whole write atomically. This is the native optimistic-locking
///   primitive the membership services rely on — there is no window where a
///   conflicting write lands and is only detected afterwards.
///
/// ## Implementation requirements
///
/// Each mutating call must be atomic: check-then-write under one exclusion
/// scope, no partial effects on failure.
pub trait CatalogStore: Send + Sync {
    fn insert_user(&self, user: NewIdentity) -> Result<Identity, StoreError>;
    fn update_user(&self, user: Identity, expected: ExpectedVersion) -> Result<Identity, StoreError>;
    fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
    fn find_user_by_id(&self, id: UserId) -> Option<Identity>;
    fn find_user_by_username(&self, username: &str) -> Option<Identity>;
    fn find_user_by_email(&self, email: &str) -> Option<Identity>;
    fn list_users(&self) -> Vec<Identity>;

    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;
    fn update_book(&self, book: Book, expected: ExpectedVersion) -> Result<Book, StoreError>;
    /// Deleting a book also severs every membership referencing it.
    fn delete_book(&self, id: BookId) -> Result<(), StoreError>;
    fn find_book_by_id(&self, id: BookId) -> Option<Book>;
    fn find_book_by_title(&self, title: &str) -> Option<Book>;
    fn find_book_by_isbn(&self, isbn: &str) -> Option<Book>;
    fn list_books(&self) -> Vec<Book>;

    /// The user's membership set, in ascending book-id order.
    fn shelf(&self, user: UserId) -> Result<Vec<BookId>, StoreError>;
    fn link_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError>;
    fn unlink_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn insert_user(&self, user: NewIdentity) -> Result<Identity, StoreError> {
        (**self).insert_user(user)
    }

    fn update_user(&self, user: Identity, expected: ExpectedVersion) -> Result<Identity, StoreError> {
        (**self).update_user(user, expected)
    }

    fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        (**self).delete_user(id)
    }

    fn find_user_by_id(&self, id: UserId) -> Option<Identity> {
        (**self).find_user_by_id(id)
    }

    fn find_user_by_username(&self, username: &str) -> Option<Identity> {
        (**self).find_user_by_username(username)
    }

    fn find_user_by_email(&self, email: &str) -> Option<Identity> {
        (**self).find_user_by_email(email)
    }

    fn list_users(&self) -> Vec<Identity> {
        (**self).list_users()
    }

    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        (**self).insert_book(book)
    }

    fn update_book(&self, book: Book, expected: ExpectedVersion) -> Result<Book, StoreError> {
        (**self).update_book(book, expected)
    }

    fn delete_book(&self, id: BookId) -> Result<(), StoreError> {
        (**self).delete_book(id)
    }

    fn find_book_by_id(&self, id: BookId) -> Option<Book> {
        (**self).find_book_by_id(id)
    }

    fn find_book_by_title(&self, title: &str) -> Option<Book> {
        (**self).find_book_by_title(title)
    }

    fn find_book_by_isbn(&self, isbn: &str) -> Option<Book> {
        (**self).find_book_by_isbn(isbn)
    }

    fn list_books(&self) -> Vec<Book> {
        (**self).list_books()
    }

    fn shelf(&self, user: UserId) -> Result<Vec<BookId>, StoreError> {
        (**self).shelf(user)
    }

    fn link_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError> {
        (**self).link_book(user, book, expected_user, expected_book)
    }

    fn unlink_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError> {
        (**self).unlink_book(user, book, expected_user, expected_book)
    }
}

/// Adapter exposing a store's user lookups through the auth crate's
/// [`IdentityLookup`] seam.
pub struct StoreDirectory<'a, S: ?Sized>(pub &'a S);

impl<S> IdentityLookup for StoreDirectory<'_, S>
where
    S: CatalogStore + ?Sized,
{
    fn identity_by_username(&self, username: &str) -> Option<Identity> {
        self.0.find_user_by_username(username)
    }

    fn identity_by_email(&self, email: &str) -> Option<Identity> {
        self.0.find_user_by_email(email)
    }
}
