use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bookshelf_service::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "authentication required")
        }
        ServiceError::BadCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "bad_credentials", "bad credentials")
        }
        ServiceError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        ServiceError::RoleNotAllowed(msg) => {
            json_error(StatusCode::FORBIDDEN, "role_not_allowed", msg)
        }
        ServiceError::IdentityNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "identity not found")
        }
        ServiceError::BookNotFound => json_error(StatusCode::NOT_FOUND, "not_found", "book not found"),
        ServiceError::NotOnShelf => json_error(StatusCode::NOT_FOUND, "not_found", "book not on shelf"),
        ServiceError::AlreadyOnShelf => {
            json_error(StatusCode::CONFLICT, "conflict", "book already on shelf")
        }
        ServiceError::Duplicate(field) => {
            json_error(StatusCode::CONFLICT, "conflict", format!("duplicate {field}"))
        }
        ServiceError::Conflict => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "concurrent modification detected; retry the operation",
        ),
        ServiceError::UnknownSubject => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_subject",
            "token subject no longer exists",
        ),
        ServiceError::Internal(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
