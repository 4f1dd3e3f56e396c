//! Identity administration endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use bookshelf_auth::Role;
use bookshelf_core::UserId;
use bookshelf_service::{IdentityDraft, IdentityPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
    })
}

fn parse_role(raw: &str) -> Result<Role, axum::response::Response> {
    raw.parse().map_err(|e: bookshelf_core::DomainError| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    })
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let role = match parse_role(&body.role) {
        Ok(role) => role,
        Err(resp) => return resp,
    };

    let draft = IdentityDraft {
        username: body.username,
        email: body.email,
        password: body.password,
        role,
        cover_image: body.cover_image,
    };

    match services.accounts.create_identity(ctx.actor(), draft) {
        Ok(identity) => {
            (StatusCode::CREATED, Json(dto::identity_to_json(&identity))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
) -> axum::response::Response {
    match services.accounts.list_identities(ctx.actor()) {
        Ok(identities) => {
            let items: Vec<_> = identities.iter().map(dto::identity_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.accounts.get_identity(ctx.actor(), id) {
        Ok(identity) => (StatusCode::OK, Json(dto::identity_to_json(&identity))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let role = match body.role.as_deref() {
        None => None,
        Some(raw) => match parse_role(raw) {
            Ok(role) => Some(role),
            Err(resp) => return resp,
        },
    };

    let patch = IdentityPatch {
        email: body.email,
        password: body.password,
        role,
        cover_image: body.cover_image,
    };

    match services.accounts.update_identity(ctx.actor(), id, patch) {
        Ok(identity) => (StatusCode::OK, Json(dto::identity_to_json(&identity))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.accounts.delete_identity(ctx.actor(), id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
