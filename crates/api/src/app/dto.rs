//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{json, Value};

use bookshelf_auth::Identity;
use bookshelf_catalog::{Book, BookKey};
use bookshelf_core::BookId;
use bookshelf_service::ServiceError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to READER; anything else is rejected by the service.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub isbn: String,
    #[serde(default)]
    pub price: String,
    pub published: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Book selector: exactly one of id/title/isbn.
#[derive(Debug, Deserialize, Default)]
pub struct BookLookupRequest {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl BookLookupRequest {
    pub fn into_key(self) -> Result<BookKey, ServiceError> {
        let supplied = usize::from(self.id.is_some())
            + usize::from(self.title.as_deref().is_some_and(|t| !t.is_empty()))
            + usize::from(self.isbn.as_deref().is_some_and(|i| !i.is_empty()));
        if supplied != 1 {
            return Err(ServiceError::validation(
                "exactly one of id, title or isbn must be provided",
            ));
        }

        if let Some(id) = self.id {
            return Ok(BookKey::Id(BookId::from_raw(id)));
        }
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            return Ok(BookKey::Title(title));
        }
        if let Some(isbn) = self.isbn.filter(|i| !i.is_empty()) {
            return Ok(BookKey::Isbn(isbn));
        }
        Err(ServiceError::validation(
            "exactly one of id, title or isbn must be provided",
        ))
    }
}

/// Identity view; the password hash never leaves the service boundary.
pub fn identity_to_json(identity: &Identity) -> Value {
    json!({
        "id": identity.id.as_u64(),
        "username": identity.username,
        "email": identity.email,
        "role": identity.role.as_str(),
        "cover_image": identity.cover_image,
        "version": identity.version,
    })
}

pub fn book_to_json(book: &Book) -> Value {
    json!({
        "id": book.id.as_u64(),
        "title": book.title,
        "author": book.author,
        "isbn": book.isbn.as_str(),
        "price": book.price,
        "published": book.published.to_string(),
        "cover_image": book.cover_image,
        "version": book.version,
    })
}
