//! Audit metadata recorded on every mutation (who/when/from where).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Who performed a mutation, when, and from which address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStamp {
    pub actor: AccountId,
    pub at: DateTime<Utc>,
    pub origin_address: Option<String>,
}

impl AuditStamp {
    pub fn new(actor: AccountId, at: DateTime<Utc>, origin_address: Option<String>) -> Self {
        Self {
            actor,
            at,
            origin_address,
        }
    }
}

/// Lifecycle stamps of a soft-deletable record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    pub added: Option<AuditStamp>,
    pub last_updated: Option<AuditStamp>,
    pub removed: Option<AuditStamp>,
}

impl AuditTrail {
    pub fn added(stamp: AuditStamp) -> Self {
        Self {
            added: Some(stamp),
            ..Default::default()
        }
    }
}
