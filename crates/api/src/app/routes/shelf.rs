//! The caller's own book membership set.

use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_shelf).post(add_book).delete(remove_book))
}

pub async fn list_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.shelf.list_shelf(ctx.actor()) {
        Ok(books) => {
            let items: Vec<_> = books.iter().map(dto::book_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::BookLookupRequest>,
) -> axum::response::Response {
    let key = match body.into_key() {
        Ok(key) => key,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.shelf.add_book(ctx.actor(), &key) {
        Ok(book) => (StatusCode::CREATED, Json(dto::book_to_json(&book))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove_book(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::BookLookupRequest>,
) -> axum::response::Response {
    let key = match body.into_key() {
        Ok(key) => key,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.shelf.remove_book(ctx.actor(), &key) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
