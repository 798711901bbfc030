//! `gatehouse-auth`: authentication and authorization primitives.
//!
//! Transport- and storage-agnostic: session validation goes through the
//! [`AccountDirectory`] port, and every grant check is a pure function over
//! the account loaded for the request.

pub mod account;
pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod client;
pub mod identity;
pub mod matrix;
pub mod password;
pub mod session;
pub mod token;

pub use account::{Account, AccountPatch, NewAccount};
pub use authorize::{AccessDenied, Requirement, authorize, permission_check, route_check};
pub use catalog::{
    Action, ActionDraft, Area, AreaDraft, AreaPatch, BUILTIN_CATALOG, CatalogEntry, is_builtin_action, is_builtin_area,
};
pub use claims::{SessionClaims, TOKEN_LIFETIME_HOURS, TokenValidationError, validate_claims};
pub use client::{ClientMetadata, UserAgentSummary};
pub use identity::IdentityContext;
pub use matrix::{ActionGrant, AreaGrant, PermissionMatrix, build_matrix};
pub use password::{PasswordError, grant_fingerprint, hash_password, verify_password};
pub use session::{
    AccountDirectory, CredentialRequest, DirectoryError, SessionError, SessionValidator, ValidatedSession,
};
pub use token::{Hs256JwtValidator, Hs256TokenIssuer, JwtValidator, TokenError};
