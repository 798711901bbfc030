//! Session validation: bearer credential -> [`IdentityContext`].

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use gatehouse_core::{AccountId, Locale, Record};

use crate::account::Account;
use crate::client::ClientMetadata;
use crate::identity::IdentityContext;
use crate::token::{JwtValidator, TokenError};

/// Failure to reach the account directory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("account directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Read-only account lookup used by [`SessionValidator`].
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// The account with `id`, whatever its lifecycle state.
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DirectoryError>;
}

#[async_trait]
impl<D> AccountDirectory for Arc<D>
where
    D: AccountDirectory + ?Sized,
{
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        (**self).find_account(id).await
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("missing client metadata")]
    MissingClientMetadata,

    #[error("malformed token")]
    TokenMalformed,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    TokenInvalid,

    /// The token is fine but its account is gone, inactive or deleted.
    #[error("session no longer valid")]
    SessionInvalid,

    #[error("session check unavailable: {0}")]
    Unavailable(String),
}

impl From<TokenError> for SessionError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Malformed => SessionError::TokenMalformed,
            TokenError::Expired => SessionError::TokenExpired,
            TokenError::InvalidSignature | TokenError::InvalidClaims(_) => SessionError::TokenInvalid,
            TokenError::Encoding(e) => SessionError::Unavailable(e),
        }
    }
}

/// Raw request inputs the validator looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialRequest<'a> {
    pub authorization: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub origin: Option<IpAddr>,
    pub accept_language: Option<&'a str>,
}

/// Outcome of a successful validation.
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub identity: IdentityContext,
    /// The account as stored right now; grant checks run against this.
    pub account: Account,
}

/// Turns a bearer credential into an [`IdentityContext`].
///
/// Performs exactly one account read per call.
#[derive(Clone)]
pub struct SessionValidator {
    jwt: Arc<dyn JwtValidator>,
    directory: Arc<dyn AccountDirectory>,
}

impl SessionValidator {
    pub fn new(jwt: Arc<dyn JwtValidator>, directory: Arc<dyn AccountDirectory>) -> Self {
        Self { jwt, directory }
    }

    pub async fn validate(
        &self,
        req: &CredentialRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<ValidatedSession, SessionError> {
        let authorization = req.authorization.ok_or(SessionError::MissingCredentials)?;
        let user_agent = req.user_agent.ok_or(SessionError::MissingClientMetadata)?;
        let token = extract_bearer(authorization)?;

        let claims = self.jwt.validate(token, now)?;

        let account = self
            .directory
            .find_account(claims.sub)
            .await
            .map_err(|e| SessionError::Unavailable(e.0))?
            .filter(|account| account.is_live())
            .ok_or_else(|| {
                tracing::debug!(account_id = %claims.sub, "token names a missing or retired account");
                SessionError::SessionInvalid
            })?;

        let identity = IdentityContext {
            account_id: account.id,
            display_name: account.name.clone(),
            is_admin: account.is_admin,
            is_developer: claims.is_developer,
            client: ClientMetadata::new(req.origin, user_agent),
            locale: Locale::from_accept_language(req.accept_language),
            at: now,
        };

        Ok(ValidatedSession { identity, account })
    }
}

fn extract_bearer(header: &str) -> Result<&str, SessionError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(SessionError::TokenMalformed)?
        .trim();

    if token.is_empty() {
        return Err(SessionError::TokenMalformed);
    }

    Ok(token)
}
