use axum::{extract::Extension, http::StatusCode, response::Response};

use crate::app::envelope;
use crate::app::i18n::Message;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> Response {
    envelope::ok(Message::Done, session.locale(), session.identity())
}
