//! Bearer token signing and verification (HS256 JWT).
//!
//! The signature mechanism itself is `jsonwebtoken`; this module only decides
//! the order of checks and maps failures onto [`TokenError`].

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a decodable JWT (bad segments, base64 or claim JSON).
    #[error("malformed token")]
    Malformed,

    /// The embedded `exp` is not after `now`.
    #[error("token has expired")]
    Expired,

    /// Signature does not verify against the server secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Signature verified but the claims are unusable.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HS256 validator bound to the server secret.
pub struct Hs256JwtValidator {
    key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Expiry is judged from the token's own payload before the signature,
        // so an expired token reports `Expired` whoever signed it.
        let unverified = peek_claims(token)?;
        if now >= unverified.expires_at {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked against the caller-supplied clock, not the system one.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &self.key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                TokenError::Malformed
            }
            _ => TokenError::InvalidClaims(e.to_string()),
        })?;

        validate_claims(&data.claims, now).map_err(|e| match e {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::InvalidClaims(other.to_string()),
        })?;

        Ok(data.claims)
    }
}

/// Decode the payload without verifying the signature.
fn peek_claims(token: &str) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| TokenError::Malformed)
}

/// HS256 issuer bound to the server secret.
pub struct Hs256TokenIssuer {
    key: EncodingKey,
}

impl Hs256TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use gatehouse_core::AccountId;

    const SECRET: &str = "test-secret";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn mint(secret: &str, at: DateTime<Utc>) -> (SessionClaims, String) {
        let claims = SessionClaims::issue(AccountId::new(), "developer", true, at);
        let token = Hs256TokenIssuer::new(secret).issue(&claims).unwrap();
        (claims, token)
    }

    #[test]
    fn accepts_fresh_token_signed_with_server_secret() {
        let (claims, token) = mint(SECRET, t0());
        let validator = Hs256JwtValidator::new(SECRET);

        let decoded = validator.validate(&token, t0() + Duration::minutes(5)).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let (_, token) = mint("someone-else", t0());
        let validator = Hs256JwtValidator::new(SECRET);

        assert_eq!(validator.validate(&token, t0()), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn expiry_wins_over_signature() {
        let late = t0() + Duration::hours(10) + Duration::seconds(1);

        let (_, good) = mint(SECRET, t0());
        let (_, forged) = mint("someone-else", t0());
        let validator = Hs256JwtValidator::new(SECRET);

        assert_eq!(validator.validate(&good, late), Err(TokenError::Expired));
        assert_eq!(validator.validate(&forged, late), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_the_future_is_rejected() {
        let (_, token) = mint(SECRET, t0());
        let validator = Hs256JwtValidator::new(SECRET);

        let err = validator.validate(&token, t0() - Duration::minutes(1)).unwrap_err();
        assert!(matches!(err, TokenError::InvalidClaims(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        let validator = Hs256JwtValidator::new(SECRET);

        assert_eq!(validator.validate("abc", t0()), Err(TokenError::Malformed));
        assert_eq!(validator.validate("a.b.c", t0()), Err(TokenError::Malformed));
    }
}
