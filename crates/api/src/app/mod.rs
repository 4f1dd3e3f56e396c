//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store/token/hasher wiring + seed bootstrap
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, routing::post, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `/health`, `/session`, `/session/guest` and `/signup` are public;
/// everything else passes through actor resolution. Absent tokens resolve
/// to the anonymous actor, so catalog reads stay browsable while every
/// role-gated handler fails closed.
pub fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config)?);

    let auth_state = middleware::AuthState {
        sessions: services.sessions.clone(),
    };

    let resolved = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .route("/session", post(routes::session::login))
        .route("/session/guest", post(routes::session::guest_session))
        .route("/signup", post(routes::session::signup))
        .merge(resolved)
        .layer(Extension(services))
        .layer(ServiceBuilder::new()))
}
