//! API-side access guard for privileged routes.
//!
//! Handlers call [`require`] first, before touching storage, with the
//! area (and action, for mutations) the route declares.

use gatehouse_auth::{Requirement, authorize};

use crate::app::errors::ApiError;
use crate::context::SessionContext;

/// Check `requirement` against the account loaded for this request.
pub fn require(session: &SessionContext, requirement: &Requirement) -> Result<(), ApiError> {
    authorize(session.identity(), session.account(), requirement).map_err(|denied| {
        tracing::info!(
            account_id = %session.identity().account_id,
            area = %requirement.area,
            action = requirement.action.as_deref().unwrap_or("-"),
            reason = %denied,
            "access denied"
        );
        ApiError::from(denied)
    })
}
