use axum::{routing::get, Router};

pub mod accounts;
pub mod books;
pub mod session;
pub mod shelf;
pub mod system;

/// Router for all actor-resolved endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/users", accounts::router())
        .nest("/books", books::router())
        .nest("/shelf", shelf::router())
}
