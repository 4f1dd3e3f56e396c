//! In-memory store.
//!
//! Intended for tests/dev. Not optimized for performance: uniqueness checks
//! are linear scans, which is fine at this scale.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bookshelf_auth::{Identity, NewIdentity};
use bookshelf_catalog::{Book, NewBook};
use bookshelf_core::{BookId, ExpectedVersion, UserId};

use crate::store::{CatalogStore, StoreError};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, Identity>,
    books: BTreeMap<BookId, Book>,
    shelves: HashMap<UserId, BTreeSet<BookId>>,
    next_user_id: u64,
    next_book_id: u64,
}

/// In-memory [`CatalogStore`].
///
/// Every mutating method takes the write lock for its whole
/// check-then-write sequence, which is what makes the version checks an
/// atomic reject-before-write rather than detect-after-write.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_user_uniqueness(
    state: &State,
    username: &str,
    email: &str,
    exclude: Option<UserId>,
) -> Result<(), StoreError> {
    for user in state.users.values() {
        if Some(user.id) == exclude {
            continue;
        }
        if user.username == username {
            return Err(StoreError::Duplicate("username"));
        }
        if user.email == email {
            return Err(StoreError::Duplicate("email"));
        }
    }
    Ok(())
}

fn check_book_uniqueness(
    state: &State,
    title: &str,
    isbn: &str,
    exclude: Option<BookId>,
) -> Result<(), StoreError> {
    for book in state.books.values() {
        if Some(book.id) == exclude {
            continue;
        }
        if book.title == title {
            return Err(StoreError::Duplicate("title"));
        }
        if book.isbn.as_str() == isbn {
            return Err(StoreError::Duplicate("isbn"));
        }
    }
    Ok(())
}

impl CatalogStore for InMemoryStore {
    fn insert_user(&self, user: NewIdentity) -> Result<Identity, StoreError> {
        let mut state = self.write();
        check_user_uniqueness(&state, &user.username, &user.email, None)?;

        state.next_user_id += 1;
        let id = UserId::from_raw(state.next_user_id);
        let record = Identity {
            id,
            username: user.username,
            email: user.email,
            password_hash: Some(user.password_hash),
            role: user.role,
            cover_image: user.cover_image,
            version: 1,
        };

        state.users.insert(id, record.clone());
        state.shelves.insert(id, BTreeSet::new());
        Ok(record)
    }

    fn update_user(&self, user: Identity, expected: ExpectedVersion) -> Result<Identity, StoreError> {
        let mut state = self.write();
        let current = state.users.get(&user.id).ok_or(StoreError::NotFound)?;

        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "user {}: expected {expected:?}, found {}",
                user.id, current.version
            )));
        }
        let current_version = current.version;
        check_user_uniqueness(&state, &user.username, &user.email, Some(user.id))?;

        let record = Identity {
            version: current_version + 1,
            ..user
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.write();
        state.users.remove(&id).ok_or(StoreError::NotFound)?;
        state.shelves.remove(&id);
        Ok(())
    }

    fn find_user_by_id(&self, id: UserId) -> Option<Identity> {
        self.read().users.get(&id).cloned()
    }

    fn find_user_by_username(&self, username: &str) -> Option<Identity> {
        self.read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    fn find_user_by_email(&self, email: &str) -> Option<Identity> {
        self.read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    fn list_users(&self) -> Vec<Identity> {
        self.read().users.values().cloned().collect()
    }

    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut state = self.write();
        check_book_uniqueness(&state, &book.title, book.isbn.as_str(), None)?;

        state.next_book_id += 1;
        let id = BookId::from_raw(state.next_book_id);
        let record = Book {
            id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            price: book.price,
            published: book.published,
            cover_image: book.cover_image,
            version: 1,
        };

        state.books.insert(id, record.clone());
        Ok(record)
    }

    fn update_book(&self, book: Book, expected: ExpectedVersion) -> Result<Book, StoreError> {
        let mut state = self.write();
        let current = state.books.get(&book.id).ok_or(StoreError::NotFound)?;

        if !expected.matches(current.version) {
            return Err(StoreError::Concurrency(format!(
                "book {}: expected {expected:?}, found {}",
                book.id, current.version
            )));
        }
        let current_version = current.version;
        check_book_uniqueness(&state, &book.title, book.isbn.as_str(), Some(book.id))?;

        let record = Book {
            version: current_version + 1,
            ..book
        };
        state.books.insert(record.id, record.clone());
        Ok(record)
    }

    fn delete_book(&self, id: BookId) -> Result<(), StoreError> {
        let mut state = self.write();
        state.books.remove(&id).ok_or(StoreError::NotFound)?;

        // Sever memberships; each affected user's state changed, so their
        // version moves too.
        let affected: Vec<UserId> = state
            .shelves
            .iter()
            .filter(|(_, set)| set.contains(&id))
            .map(|(user, _)| *user)
            .collect();
        for user_id in affected {
            if let Some(set) = state.shelves.get_mut(&user_id) {
                set.remove(&id);
            }
            if let Some(user) = state.users.get_mut(&user_id) {
                user.version += 1;
            }
        }
        Ok(())
    }

    fn find_book_by_id(&self, id: BookId) -> Option<Book> {
        self.read().books.get(&id).cloned()
    }

    fn find_book_by_title(&self, title: &str) -> Option<Book> {
        self.read()
            .books
            .values()
            .find(|b| b.title == title)
            .cloned()
    }

    fn find_book_by_isbn(&self, isbn: &str) -> Option<Book> {
        self.read()
            .books
            .values()
            .find(|b| b.isbn.as_str() == isbn)
            .cloned()
    }

    fn list_books(&self) -> Vec<Book> {
        self.read().books.values().cloned().collect()
    }

    fn shelf(&self, user: UserId) -> Result<Vec<BookId>, StoreError> {
        let state = self.read();
        let set = state.shelves.get(&user).ok_or(StoreError::NotFound)?;
        Ok(set.iter().copied().collect())
    }

    fn link_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut state = self.write();

        let user_version = state.users.get(&user).ok_or(StoreError::NotFound)?.version;
        let book_version = state.books.get(&book).ok_or(StoreError::NotFound)?.version;

        if !expected_user.matches(user_version) {
            return Err(StoreError::Concurrency(format!(
                "user {user}: expected {expected_user:?}, found {user_version}"
            )));
        }
        if !expected_book.matches(book_version) {
            return Err(StoreError::Concurrency(format!(
                "book {book}: expected {expected_book:?}, found {book_version}"
            )));
        }

        let set = state.shelves.entry(user).or_default();
        if !set.insert(book) {
            return Err(StoreError::Duplicate("shelf link"));
        }

        if let Some(u) = state.users.get_mut(&user) {
            u.version += 1;
        }
        if let Some(b) = state.books.get_mut(&book) {
            b.version += 1;
        }
        Ok(())
    }

    fn unlink_book(
        &self,
        user: UserId,
        book: BookId,
        expected_user: ExpectedVersion,
        expected_book: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut state = self.write();

        let user_version = state.users.get(&user).ok_or(StoreError::NotFound)?.version;
        let book_version = state.books.get(&book).ok_or(StoreError::NotFound)?.version;

        if !expected_user.matches(user_version) {
            return Err(StoreError::Concurrency(format!(
                "user {user}: expected {expected_user:?}, found {user_version}"
            )));
        }
        if !expected_book.matches(book_version) {
            return Err(StoreError::Concurrency(format!(
                "book {book}: expected {expected_book:?}, found {book_version}"
            )));
        }

        let removed = state
            .shelves
            .get_mut(&user)
            .map(|set| set.remove(&book))
            .unwrap_or(false);
        if !removed {
            return Err(StoreError::NotFound);
        }

        if let Some(u) = state.users.get_mut(&user) {
            u.version += 1;
        }
        if let Some(b) = state.books.get_mut(&book) {
            b.version += 1;
        }
        Ok(())
    }
}
