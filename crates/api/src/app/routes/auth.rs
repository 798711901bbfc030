use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    response::Response,
};
use chrono::Utc;

use gatehouse_auth::{SessionClaims, grant_fingerprint, verify_password};
use gatehouse_core::Locale;

use crate::app::dto::{LoginRequest, LoginResponse};
use crate::app::envelope;
use crate::app::errors::ApiError;
use crate::app::i18n::Message;
use crate::app::services::AppServices;
use crate::context::RequestLocale;

/// `username` may be the account's name, email or mobile.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    RequestLocale(locale): RequestLocale,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(body)) => authenticate(&services, body, locale).await,
        Err(_) => Err(ApiError::ValidationFailed(Message::CheckLoginData)),
    };
    result.unwrap_or_else(|err| err.respond(locale))
}

async fn authenticate(services: &AppServices, body: LoginRequest, locale: Locale) -> Result<Response, ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::ValidationFailed(Message::CheckUsername));
    }
    if body.password.is_empty() {
        return Err(ApiError::ValidationFailed(Message::CheckPassword));
    }

    let account = services
        .accounts
        .find_login(username)
        .await
        .map_err(|e| ApiError::UnexpectedFailure(e.to_string()))?
        .ok_or(ApiError::NotFound(Message::UserNotFound))?;

    if !verify_password(&account.password_hash, &body.password) {
        tracing::info!(account_id = %account.id, "login rejected: wrong password");
        return Err(ApiError::ValidationFailed(Message::CheckPassword));
    }

    let claims = SessionClaims::issue(account.id, account.name.clone(), account.is_developer, Utc::now());
    let token = services.tokens.issue(&claims)?;

    let response = LoginResponse {
        token,
        expires_at: claims.expires_at,
        account_id: account.id,
        areas_fingerprint: grant_fingerprint(&account.areas_granted)?,
        actions_fingerprint: grant_fingerprint(&account.actions_granted)?,
        name: account.name,
        language: account.language,
        is_developer: account.is_developer,
    };

    tracing::info!(account_id = %response.account_id, "login succeeded");
    Ok(envelope::ok(Message::Authorized, locale, response))
}
