use chrono::{DateTime, Utc};
use serde::Serialize;

use gatehouse_core::{AccountId, AuditStamp, Locale};

use crate::client::ClientMetadata;

/// Per-request identity produced by [`crate::SessionValidator`].
///
/// Request-scoped; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContext {
    pub account_id: AccountId,
    pub display_name: String,
    /// From the stored account, not the token.
    pub is_admin: bool,
    /// From the token claim.
    pub is_developer: bool,
    pub client: ClientMetadata,
    pub locale: Locale,
    pub at: DateTime<Utc>,
}

impl IdentityContext {
    /// Audit stamp for a mutation performed by this identity.
    pub fn stamp(&self) -> AuditStamp {
        AuditStamp::new(self.account_id, self.at, self.client.origin_address.clone())
    }
}
