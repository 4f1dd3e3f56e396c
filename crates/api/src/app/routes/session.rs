//! Public session endpoints: login, guest session, self-signup.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use bookshelf_auth::Role;
use bookshelf_service::LoginOutcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services
        .accounts
        .login(&body.username, &body.email, &body.password, Utc::now())
    {
        Ok(outcome) => session_response(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Dedicated guest entrypoint: mints a token for the synthetic guest
/// without any credential exchange.
pub async fn guest_session(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.accounts.guest_session(Utc::now()) {
        Ok(outcome) => session_response(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    let role = match body.role.as_deref() {
        None | Some("") => Role::Reader,
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
        },
    };

    let request = bookshelf_service::SignupRequest {
        username: body.username,
        email: body.email,
        password: body.password,
        role,
        cover_image: body.cover_image,
    };

    match services.accounts.signup(request) {
        Ok(identity) => {
            (StatusCode::CREATED, Json(dto::identity_to_json(&identity))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

fn session_response(outcome: LoginOutcome) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": outcome.token,
            "user": dto::identity_to_json(&outcome.identity),
        })),
    )
        .into_response()
}
