//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, bootstrap seed and auth services
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs
//! - `envelope.rs`: the `{success, message, data, paginationInfo}` body
//! - `errors.rs`: failure taxonomy and its status/message mapping
//! - `i18n.rs`: English/Arabic response messages

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod i18n;
pub mod routes;
pub mod services;

/// Build the full HTTP router over already wired services.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let session_state = middleware::SessionState {
        sessions: services.sessions.clone(),
        trust_forwarded_for: services.trust_forwarded_for,
    };

    // Protected routes: a live session is required before any handler runs.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        session_state,
        middleware::session_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

pub use services::AppServices;
