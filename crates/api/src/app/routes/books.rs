//! Catalog endpoints. Reads are open to any resolved actor (anonymous
//! included); mutation is gated in the service layer.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use bookshelf_catalog::BookKey;
use bookshelf_core::BookId;
use bookshelf_service::{BookDraft, BookPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_book).get(list_books))
        .route("/:id", get(get_book).put(update_book).delete(delete_book))
}

fn parse_book_id(raw: &str) -> Result<BookId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid book id")
    })
}

#[derive(Debug, Deserialize, Default)]
pub struct ListBooksQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

pub async fn create_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::CreateBookRequest>,
) -> axum::response::Response {
    let draft = BookDraft {
        title: body.title,
        author: body.author,
        isbn: body.isbn,
        price: body.price,
        published: body.published,
        cover_image: body.cover_image,
    };

    match services.books.create_book(ctx.actor(), draft) {
        Ok(book) => (StatusCode::CREATED, Json(dto::book_to_json(&book))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_books(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListBooksQuery>,
) -> axum::response::Response {
    let items: Vec<_> = match (query.title, query.isbn) {
        (None, None) => services.books.list_books(),
        (Some(title), _) => services
            .books
            .get_book(&BookKey::Title(title))
            .into_iter()
            .collect(),
        (None, Some(isbn)) => services
            .books
            .get_book(&BookKey::Isbn(isbn))
            .into_iter()
            .collect(),
    }
    .iter()
    .map(dto::book_to_json)
    .collect();

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_book(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_book_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.books.get_book(&BookKey::Id(id)) {
        Ok(book) => (StatusCode::OK, Json(dto::book_to_json(&book))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBookRequest>,
) -> axum::response::Response {
    let id = match parse_book_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let patch = BookPatch {
        title: body.title,
        author: body.author,
        isbn: body.isbn,
        price: body.price,
        published: body.published,
        cover_image: body.cover_image,
    };

    match services.books.update_book(ctx.actor(), id, patch) {
        Ok(book) => (StatusCode::OK, Json(dto::book_to_json(&book))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_book_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.books.delete_book(ctx.actor(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
