use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use bookshelf_service::Actor;

use crate::app::{dto, errors};
use crate::context::ActorContext;

pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

pub async fn whoami(Extension(ctx): Extension<ActorContext>) -> axum::response::Response {
    match ctx.actor() {
        Actor::Anonymous => errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        Actor::Authenticated(identity) => {
            (StatusCode::OK, Json(dto::identity_to_json(identity))).into_response()
        }
    }
}
