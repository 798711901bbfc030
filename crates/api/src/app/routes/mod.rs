use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod areas;
pub mod auth;
pub mod system;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
}

/// Router for every session-protected endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/accounts", accounts::router())
        .nest("/areas", areas::router())
}
