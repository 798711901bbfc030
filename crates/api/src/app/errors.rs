use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use gatehouse_auth::{AccessDenied, PasswordError, SessionError, TokenError};
use gatehouse_core::{DomainError, Locale};
use gatehouse_infra::{CascadeError, StoreError};

use crate::app::envelope;
use crate::app::i18n::Message;

/// Which kind of record a uniqueness conflict was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Area,
    Action,
}

impl Entity {
    /// Catalog conflicts name the colliding key. Action keys start with "action".
    pub fn of_catalog_key(key: &str) -> Self {
        if key.starts_with("action") {
            Entity::Action
        } else {
            Entity::Area
        }
    }

    fn message(self) -> Message {
        match self {
            Entity::Account => Message::AccountExists,
            Entity::Area => Message::AreaExists,
            Entity::Action => Message::ActionExists,
        }
    }
}

/// Every failure a handler can report, mapped onto the envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
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

    #[error("session no longer valid")]
    SessionInvalid,

    #[error("area '{0}' not granted")]
    RouteForbidden(String),

    #[error("action '{0}' not granted")]
    PermissionForbidden(String),

    #[error("duplicate {0:?}")]
    DuplicateEntity(Entity),

    #[error("validation failed: {0:?}")]
    ValidationFailed(Message),

    #[error("not found")]
    NotFound(Message),

    #[error("unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials
            | ApiError::MissingClientMetadata
            | ApiError::TokenMalformed
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::SessionInvalid
            | ApiError::RouteForbidden(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionForbidden(_) | ApiError::DuplicateEntity(_) | ApiError::ValidationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::OK,
            ApiError::UnexpectedFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> Message {
        match self {
            ApiError::MissingCredentials
            | ApiError::TokenMalformed
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::SessionInvalid => Message::AuthorizationProblem,
            ApiError::MissingClientMetadata => Message::BrowserProblem,
            ApiError::RouteForbidden(_) => Message::RouteNotAllowed,
            ApiError::PermissionForbidden(_) => Message::PermissionNotAllowed,
            ApiError::DuplicateEntity(entity) => entity.message(),
            ApiError::ValidationFailed(message) | ApiError::NotFound(message) => *message,
            ApiError::UnexpectedFailure(_) => Message::InvalidData,
        }
    }

    /// Render in the caller's language. Unexpected failures are logged here
    /// and never leak their detail.
    pub fn respond(self, locale: Locale) -> Response {
        if let ApiError::UnexpectedFailure(detail) = &self {
            tracing::error!(error = %detail, "request failed unexpectedly");
        }
        envelope::failure(self.status(), self.message(), locale)
    }

    pub fn from_store(err: StoreError, entity: Entity) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::DuplicateEntity(entity),
            StoreError::NotFound => ApiError::NotFound(Message::NoData),
            StoreError::Rejected(err) => ApiError::from(err),
            other => ApiError::UnexpectedFailure(other.to_string()),
        }
    }

    pub fn from_catalog_store(err: StoreError) -> Self {
        let entity = match &err {
            StoreError::Duplicate(key) => Entity::of_catalog_key(key),
            _ => Entity::Area,
        };
        ApiError::from_store(err, entity)
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::MissingCredentials => ApiError::MissingCredentials,
            SessionError::MissingClientMetadata => ApiError::MissingClientMetadata,
            SessionError::TokenMalformed => ApiError::TokenMalformed,
            SessionError::TokenExpired => ApiError::TokenExpired,
            SessionError::TokenInvalid => ApiError::TokenInvalid,
            SessionError::SessionInvalid => ApiError::SessionInvalid,
            SessionError::Unavailable(e) => ApiError::UnexpectedFailure(e),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(value: AccessDenied) -> Self {
        match value {
            AccessDenied::IdentityMismatch => ApiError::SessionInvalid,
            AccessDenied::RouteForbidden(area) => ApiError::RouteForbidden(area),
            AccessDenied::PermissionForbidden(action) => ApiError::PermissionForbidden(action),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(field) => ApiError::ValidationFailed(Message::for_field(&field)),
            DomainError::InvalidId(_) => ApiError::ValidationFailed(Message::MissingData),
            // Only payloads repeating an action name fail this way before storage.
            DomainError::Duplicate(_) => ApiError::DuplicateEntity(Entity::Action),
        }
    }
}

impl From<CascadeError> for ApiError {
    fn from(value: CascadeError) -> Self {
        ApiError::UnexpectedFailure(value.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(value: PasswordError) -> Self {
        ApiError::UnexpectedFailure(value.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(value: TokenError) -> Self {
        ApiError::UnexpectedFailure(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_are_401() {
        for err in [
            SessionError::MissingCredentials,
            SessionError::TokenMalformed,
            SessionError::TokenExpired,
            SessionError::TokenInvalid,
            SessionError::SessionInvalid,
        ] {
            let api = ApiError::from(err);
            assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(api.message(), Message::AuthorizationProblem);
        }

        let browser = ApiError::from(SessionError::MissingClientMetadata);
        assert_eq!(browser.message(), Message::BrowserProblem);
    }

    #[test]
    fn route_and_permission_denials_differ() {
        let route = ApiError::from(AccessDenied::RouteForbidden("accounts".into()));
        assert_eq!(route.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(route.message(), Message::RouteNotAllowed);

        let permission = ApiError::from(AccessDenied::PermissionForbidden("deleteAccount".into()));
        assert_eq!(permission.status(), StatusCode::BAD_REQUEST);
        assert_eq!(permission.message(), Message::PermissionNotAllowed);
    }

    #[test]
    fn not_found_is_a_soft_failure() {
        let err = ApiError::from_store(StoreError::NotFound, Entity::Account);
        assert_eq!(err.status(), StatusCode::OK);
        assert_eq!(err.message(), Message::NoData);
    }

    #[test]
    fn catalog_duplicates_name_the_entity() {
        let area = ApiError::from_catalog_store(StoreError::Duplicate("areas_name_live".into()));
        assert_eq!(area, ApiError::DuplicateEntity(Entity::Area));

        let action = ApiError::from_catalog_store(StoreError::Duplicate("action name 'addBranch'".into()));
        assert_eq!(action, ApiError::DuplicateEntity(Entity::Action));
        assert_eq!(action.message(), Message::ActionExists);

        let named_like_action = ApiError::from_catalog_store(StoreError::Duplicate("area name 'actions-catalog'".into()));
        assert_eq!(named_like_action, ApiError::DuplicateEntity(Entity::Area));
    }

    #[test]
    fn fixed_catalog_names_are_a_validation_failure() {
        let err = ApiError::from_catalog_store(StoreError::Rejected(DomainError::validation("areaName")));
        assert_eq!(err, ApiError::ValidationFailed(Message::CheckAreaName));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_detail_is_not_exposed() {
        let err = ApiError::from_store(StoreError::Backend("relation missing".into()), Entity::Area);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), Message::InvalidData);
    }
}
