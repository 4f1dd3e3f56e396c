use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use bookshelf_service::SessionAuthenticator;
use bookshelf_store::InMemoryStore;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionAuthenticator<InMemoryStore>>,
}

/// Resolve the caller once and stash it in the request extensions.
///
/// A missing token resolves to the anonymous actor (handlers fail closed on
/// role-gated operations); a token that fails validation is rejected here.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = extract_bearer(req.headers());

    let actor = state
        .sessions
        .resolve(bearer, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(ActorContext::new(actor));
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
