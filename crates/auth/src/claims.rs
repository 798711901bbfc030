use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatehouse_core::AccountId;

/// Fixed session lifetime, counted from issuance.
pub const TOKEN_LIFETIME_HOURS: i64 = 10;

/// JWT claims model (transport-agnostic).
///
/// Timestamps travel as the registered `iat`/`exp` claims (seconds since the
/// epoch), so any JWT tooling can read the expiry without knowing this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account the session belongs to.
    pub sub: AccountId,

    /// Display name at issuance (informational only).
    pub name: String,

    /// Developer flag at issuance.
    #[serde(rename = "dev", default)]
    pub is_developer: bool,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Claims for a session starting at `now` with the fixed lifetime.
    pub fn issue(sub: AccountId, name: impl Into<String>, is_developer: bool, now: DateTime<Utc>) -> Self {
        Self {
            sub,
            name: name.into(),
            is_developer,
            issued_at: now,
            expires_at: now + Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn lifetime_is_ten_hours() {
        let claims = SessionClaims::issue(AccountId::new(), "dev", false, t0());
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(10));
    }

    #[test]
    fn window_boundaries() {
        let claims = SessionClaims::issue(AccountId::new(), "dev", false, t0());

        assert_eq!(validate_claims(&claims, t0()), Ok(()));
        assert_eq!(
            validate_claims(&claims, t0() - Duration::seconds(1)),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims, t0() + Duration::hours(10)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn serializes_registered_claim_names() {
        let claims = SessionClaims::issue(AccountId::new(), "dev", true, t0());
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iat"], t0().timestamp());
        assert_eq!(json["exp"], (t0() + Duration::hours(10)).timestamp());
        assert_eq!(json["dev"], true);
    }
}
