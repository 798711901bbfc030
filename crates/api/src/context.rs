use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;

use gatehouse_auth::{Account, IdentityContext, ValidatedSession};
use gatehouse_core::Locale;

/// Session context for a request: who is calling, and their account as
/// loaded for this request.
///
/// Inserted by the session middleware and present on every protected route.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: IdentityContext,
    account: Account,
}

impl SessionContext {
    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn locale(&self) -> Locale {
        self.identity.locale
    }
}

impl From<ValidatedSession> for SessionContext {
    fn from(value: ValidatedSession) -> Self {
        Self {
            identity: value.identity,
            account: value.account,
        }
    }
}

/// Response language for routes that run without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
        Ok(RequestLocale(Locale::from_accept_language(header)))
    }
}
