//! Shelf (user↔book membership) mutation under optimistic concurrency.
//!
//! This is the one write path in the system that touches two records at
//! once. The service reads both version counters, decides, and hands the
//! expectations to the store's conditional link/unlink — the store rejects
//! the whole write if either record moved in the meantime, so there is no
//! window where a conflicting write lands and is only noticed afterwards.

use std::sync::Arc;

use bookshelf_auth::Identity;
use bookshelf_catalog::{Book, BookKey};
use bookshelf_core::ExpectedVersion;
use bookshelf_store::{CatalogStore, StoreError};

use crate::books::resolve_book;
use crate::error::user_store_err;
use crate::{Actor, ServiceError};

pub struct ShelfService<S> {
    store: Arc<S>,
}

impl<S: CatalogStore> ShelfService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Membership lives on persisted records only; the synthetic guest has
    /// no shelf. Re-reads the caller for a fresh version counter.
    fn resolve_member(&self, actor: &Actor) -> Result<Identity, ServiceError> {
        let caller = actor.require()?;
        self.store
            .find_user_by_username(&caller.username)
            .ok_or(ServiceError::Unauthenticated)
    }

    /// Add a book to the caller's own shelf.
    ///
    /// Already present → [`ServiceError::AlreadyOnShelf`], nothing mutated.
    /// A concurrent writer on either record → [`ServiceError::Conflict`];
    /// the caller may retry the whole operation.
    pub fn add_book(&self, actor: &Actor, key: &BookKey) -> Result<Book, ServiceError> {
        let user = self.resolve_member(actor)?;
        let book = resolve_book(self.store.as_ref(), key)?;

        let shelf = self.store.shelf(user.id).map_err(user_store_err)?;
        if shelf.contains(&book.id) {
            return Err(ServiceError::AlreadyOnShelf);
        }

        self.store
            .link_book(
                user.id,
                book.id,
                ExpectedVersion::Exact(user.version),
                ExpectedVersion::Exact(book.version),
            )
            .map_err(|err| match err {
                StoreError::Concurrency(_) => ServiceError::Conflict,
                StoreError::Duplicate(_) => ServiceError::AlreadyOnShelf,
                StoreError::NotFound => ServiceError::BookNotFound,
            })?;

        tracing::info!(user = %user.username, book = %book.id, "book added to shelf");
        Ok(book)
    }

    /// Remove a book from the caller's own shelf.
    ///
    /// Not present → [`ServiceError::NotOnShelf`], nothing mutated.
    pub fn remove_book(&self, actor: &Actor, key: &BookKey) -> Result<(), ServiceError> {
        let user = self.resolve_member(actor)?;
        let book = resolve_book(self.store.as_ref(), key)?;

        let shelf = self.store.shelf(user.id).map_err(user_store_err)?;
        if !shelf.contains(&book.id) {
            return Err(ServiceError::NotOnShelf);
        }

        self.store
            .unlink_book(
                user.id,
                book.id,
                ExpectedVersion::Exact(user.version),
                ExpectedVersion::Exact(book.version),
            )
            .map_err(|err| match err {
                StoreError::Concurrency(_) => ServiceError::Conflict,
                StoreError::NotFound => ServiceError::NotOnShelf,
                StoreError::Duplicate(_) => ServiceError::Conflict,
            })?;

        tracing::info!(user = %user.username, book = %book.id, "book removed from shelf");
        Ok(())
    }

    /// The caller's own membership set, resolved to full records.
    pub fn list_shelf(&self, actor: &Actor) -> Result<Vec<Book>, ServiceError> {
        let user = self.resolve_member(actor)?;
        let ids = self.store.shelf(user.id).map_err(user_store_err)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| self.store.find_book_by_id(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testutil::{insert_account, insert_sample_book, seeded_store};
    use bookshelf_auth::{NewIdentity, Role};
    use bookshelf_catalog::NewBook;
    use bookshelf_core::{BookId, UserId};
    use bookshelf_store::InMemoryStore;

    fn actor_of(identity: Identity) -> Actor {
        Actor::Authenticated(identity)
    }

    #[test]
    fn add_then_list_then_remove() {
        let (store, alice) = seeded_store();
        let dune = insert_sample_book(&store, "Dune", "9780306406157");
        let svc = ShelfService::new(store);
        let actor = actor_of(alice);

        let added = svc
            .add_book(&actor, &BookKey::Isbn("9780306406157".to_string()))
            .unwrap();
        assert_eq!(added.id, dune.id);

        let shelf = svc.list_shelf(&actor).unwrap();
        assert_eq!(shelf.len(), 1);
        assert_eq!(shelf[0].title, "Dune");

        svc.remove_book(&actor, &BookKey::Id(dune.id)).unwrap();
        assert!(svc.list_shelf(&actor).unwrap().is_empty());
    }

    #[test]
    fn duplicate_add_conflicts_without_mutating() {
        let (store, alice) = seeded_store();
        insert_sample_book(&store, "Dune", "9780306406157");
        let svc = ShelfService::new(store);
        let actor = actor_of(alice);
        let key = BookKey::Title("Dune".to_string());

        svc.add_book(&actor, &key).unwrap();
        let before = svc.list_shelf(&actor).unwrap().len();

        let err = svc.add_book(&actor, &key).unwrap_err();
        assert_eq!(err, ServiceError::AlreadyOnShelf);
        assert_eq!(svc.list_shelf(&actor).unwrap().len(), before);
    }

    #[test]
    fn removing_an_absent_book_is_not_found_without_mutating() {
        let (store, alice) = seeded_store();
        let dune = insert_sample_book(&store, "Dune", "9780306406157");
        let user_version_before = store.find_user_by_id(alice.id).unwrap().version;
        let svc = ShelfService::new(store.clone());

        let err = svc
            .remove_book(&actor_of(alice.clone()), &BookKey::Id(dune.id))
            .unwrap_err();
        assert_eq!(err, ServiceError::NotOnShelf);
        assert_eq!(
            store.find_user_by_id(alice.id).unwrap().version,
            user_version_before
        );
    }

    #[test]
    fn unknown_book_key_is_book_not_found() {
        let (store, alice) = seeded_store();
        let svc = ShelfService::new(store);

        let err = svc
            .add_book(&actor_of(alice), &BookKey::Isbn("9780306406157".to_string()))
            .unwrap_err();
        assert_eq!(err, ServiceError::BookNotFound);
    }

    #[test]
    fn synthetic_guest_has_no_shelf() {
        let (store, _) = seeded_store();
        let svc = ShelfService::new(store);
        let guest = Identity::guest("guestuser");

        let err = svc.list_shelf(&actor_of(guest)).unwrap_err();
        assert_eq!(err, ServiceError::Unauthenticated);
    }

    /// Store wrapper that fires a one-shot mutation right after the shelf
    /// read — between the service's version read and its conditional write.
    struct RacingStore {
        inner: Arc<InMemoryStore>,
        race: Mutex<Option<Box<dyn FnOnce(&InMemoryStore) + Send>>>,
    }

    impl RacingStore {
        fn new(inner: Arc<InMemoryStore>, race: impl FnOnce(&InMemoryStore) + Send + 'static) -> Self {
            Self {
                inner,
                race: Mutex::new(Some(Box::new(race))),
            }
        }
    }

    impl CatalogStore for RacingStore {
        fn insert_user(&self, user: NewIdentity) -> Result<Identity, StoreError> {
            self.inner.insert_user(user)
        }

        fn update_user(
            &self,
            user: Identity,
            expected: ExpectedVersion,
        ) -> Result<Identity, StoreError> {
            self.inner.update_user(user, expected)
        }

        fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
            self.inner.delete_user(id)
        }

        fn find_user_by_id(&self, id: UserId) -> Option<Identity> {
            self.inner.find_user_by_id(id)
        }

        fn find_user_by_username(&self, username: &str) -> Option<Identity> {
            self.inner.find_user_by_username(username)
        }

        fn find_user_by_email(&self, email: &str) -> Option<Identity> {
            self.inner.find_user_by_email(email)
        }

        fn list_users(&self) -> Vec<Identity> {
            self.inner.list_users()
        }

        fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
            self.inner.insert_book(book)
        }

        fn update_book(&self, book: Book, expected: ExpectedVersion) -> Result<Book, StoreError> {
            self.inner.update_book(book, expected)
        }

        fn delete_book(&self, id: BookId) -> Result<(), StoreError> {
            self.inner.delete_book(id)
        }

        fn find_book_by_id(&self, id: BookId) -> Option<Book> {
            self.inner.find_book_by_id(id)
        }

        fn find_book_by_title(&self, title: &str) -> Option<Book> {
            self.inner.find_book_by_title(title)
        }

        fn find_book_by_isbn(&self, isbn: &str) -> Option<Book> {
            self.inner.find_book_by_isbn(isbn)
        }

        fn list_books(&self) -> Vec<Book> {
            self.inner.list_books()
        }

        fn shelf(&self, user: UserId) -> Result<Vec<BookId>, StoreError> {
            let result = self.inner.shelf(user);
            if let Some(race) = self.race.lock().unwrap().take() {
                race(&self.inner);
            }
            result
        }

        fn link_book(
            &self,
            user: UserId,
            book: BookId,
            expected_user: ExpectedVersion,
            expected_book: ExpectedVersion,
        ) -> Result<(), StoreError> {
            self.inner.link_book(user, book, expected_user, expected_book)
        }

        fn unlink_book(
            &self,
            user: UserId,
            book: BookId,
            expected_user: ExpectedVersion,
            expected_book: ExpectedVersion,
        ) -> Result<(), StoreError> {
            self.inner
                .unlink_book(user, book, expected_user, expected_book)
        }
    }

    #[test]
    fn concurrent_user_mutation_conflicts_and_persists_nothing() {
        let (store, alice) = seeded_store();
        insert_sample_book(&store, "Dune", "9780306406157");

        let alice_id = alice.id;
        let racing = Arc::new(RacingStore::new(store.clone(), move |inner| {
            let mut current = inner.find_user_by_id(alice_id).unwrap();
            current.cover_image = Some("race.png".to_string());
            inner
                .update_user(current.clone(), ExpectedVersion::Exact(current.version))
                .unwrap();
        }));
        let svc = ShelfService::new(racing);

        let err = svc
            .add_book(&actor_of(alice), &BookKey::Title("Dune".to_string()))
            .unwrap_err();
        assert_eq!(err, ServiceError::Conflict);
        assert!(store.shelf(alice_id).unwrap().is_empty());
    }

    #[test]
    fn concurrent_book_mutation_conflicts_and_persists_nothing() {
        let (store, alice) = seeded_store();
        let dune = insert_sample_book(&store, "Dune", "9780306406157");

        let dune_id = dune.id;
        let racing = Arc::new(RacingStore::new(store.clone(), move |inner| {
            let mut current = inner.find_book_by_id(dune_id).unwrap();
            current.price = "99.99".to_string();
            inner
                .update_book(current.clone(), ExpectedVersion::Exact(current.version))
                .unwrap();
        }));
        let svc = ShelfService::new(racing);

        let err = svc
            .add_book(&actor_of(alice.clone()), &BookKey::Id(dune_id))
            .unwrap_err();
        assert_eq!(err, ServiceError::Conflict);
        assert!(store.shelf(alice.id).unwrap().is_empty());
    }

    #[test]
    fn retry_after_conflict_succeeds() {
        let (store, alice) = seeded_store();
        insert_sample_book(&store, "Dune", "9780306406157");

        let alice_id = alice.id;
        let racing = Arc::new(RacingStore::new(store.clone(), move |inner| {
            let mut current = inner.find_user_by_id(alice_id).unwrap();
            current.cover_image = Some("race.png".to_string());
            inner
                .update_user(current.clone(), ExpectedVersion::Exact(current.version))
                .unwrap();
        }));
        let svc = ShelfService::new(racing);
        let actor = actor_of(alice);
        let key = BookKey::Title("Dune".to_string());

        assert_eq!(svc.add_book(&actor, &key).unwrap_err(), ServiceError::Conflict);
        // The race hook is one-shot; a fresh read-decide-write goes through.
        svc.add_book(&actor, &key).unwrap();
        assert_eq!(store.shelf(alice_id).unwrap().len(), 1);
    }

    #[test]
    fn two_readers_can_hold_the_same_book() {
        let (store, alice) = seeded_store();
        let bob = insert_account(&store, "bob", Role::Reader);
        let dune = insert_sample_book(&store, "Dune", "9780306406157");
        let svc = ShelfService::new(store.clone());

        svc.add_book(&actor_of(alice.clone()), &BookKey::Id(dune.id))
            .unwrap();
        svc.add_book(&actor_of(bob.clone()), &BookKey::Id(dune.id))
            .unwrap();

        assert_eq!(store.shelf(alice.id).unwrap(), vec![dune.id]);
        assert_eq!(store.shelf(bob.id).unwrap(), vec![dune.id]);
    }
}
