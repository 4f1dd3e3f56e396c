//! Catalog book CRUD.
//!
//! Mutation is gated to SUPER/ADMIN; reads are public. ISBN and publish-date
//! strings are validated here, on the way into the typed domain records.

use std::sync::Arc;

use bookshelf_auth::may_mutate_book;
use bookshelf_catalog::{Book, BookKey, Isbn, NewBook, PublishDate};
use bookshelf_core::{BookId, DomainError, ExpectedVersion};
use bookshelf_store::CatalogStore;

use crate::error::book_store_err;
use crate::{Actor, ServiceError};

#[derive(Debug, Clone)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: String,
    pub published: String,
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<String>,
    pub published: Option<String>,
    pub cover_image: Option<String>,
}

pub struct BookService<S> {
    store: Arc<S>,
}

impl<S: CatalogStore> BookService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_book(&self, actor: &Actor, draft: BookDraft) -> Result<Book, ServiceError> {
        let caller = actor.require()?;
        if !may_mutate_book(caller.role) {
            return Err(ServiceError::Forbidden);
        }

        if draft.title.trim().is_empty() {
            return Err(ServiceError::validation("title cannot be empty"));
        }
        let isbn = Isbn::parse(&draft.isbn).map_err(invalid_input)?;
        let published: PublishDate = draft.published.parse().map_err(invalid_input)?;

        let book = self
            .store
            .insert_book(NewBook {
                title: draft.title.trim().to_string(),
                author: draft.author,
                isbn,
                price: draft.price,
                published,
                cover_image: draft.cover_image,
            })
            .map_err(book_store_err)?;

        tracing::info!(actor = %caller.username, book = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    pub fn update_book(
        &self,
        actor: &Actor,
        id: BookId,
        patch: BookPatch,
    ) -> Result<Book, ServiceError> {
        let caller = actor.require()?;
        if !may_mutate_book(caller.role) {
            return Err(ServiceError::Forbidden);
        }

        let current = self
            .store
            .find_book_by_id(id)
            .ok_or(ServiceError::BookNotFound)?;

        let mut updated = current.clone();
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ServiceError::validation("title cannot be empty"));
            }
            updated.title = title;
        }
        if let Some(author) = patch.author {
            updated.author = author;
        }
        if let Some(isbn) = patch.isbn {
            updated.isbn = Isbn::parse(&isbn).map_err(invalid_input)?;
        }
        if let Some(price) = patch.price {
            updated.price = price;
        }
        if let Some(published) = patch.published {
            updated.published = published.parse().map_err(invalid_input)?;
        }
        if let Some(cover) = patch.cover_image {
            updated.cover_image = Some(cover);
        }

        let saved = self
            .store
            .update_book(updated, ExpectedVersion::Exact(current.version))
            .map_err(book_store_err)?;

        tracing::info!(actor = %caller.username, book = %saved.id, "book updated");
        Ok(saved)
    }

    pub fn delete_book(&self, actor: &Actor, id: BookId) -> Result<(), ServiceError> {
        let caller = actor.require()?;
        if !may_mutate_book(caller.role) {
            return Err(ServiceError::Forbidden);
        }

        self.store.delete_book(id).map_err(book_store_err)?;
        tracing::info!(actor = %caller.username, book = %id, "book deleted");
        Ok(())
    }

    pub fn get_book(&self, key: &BookKey) -> Result<Book, ServiceError> {
        resolve_book(self.store.as_ref(), key)
    }

    pub fn list_books(&self) -> Vec<Book> {
        self.store.list_books()
    }
}

/// Resolve a book by any of its unique attributes.
pub(crate) fn resolve_book<S>(store: &S, key: &BookKey) -> Result<Book, ServiceError>
where
    S: CatalogStore + ?Sized,
{
    match key {
        BookKey::Id(id) => store.find_book_by_id(*id),
        BookKey::Title(title) => store.find_book_by_title(title),
        BookKey::Isbn(isbn) => store.find_book_by_isbn(isbn),
    }
    .ok_or(ServiceError::BookNotFound)
}

fn invalid_input(err: DomainError) -> ServiceError {
    match err {
        DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::Validation(msg),
        other => ServiceError::Validation(other.to_string()),
    }
}
