use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_auth::{Account, Action, Area, IdentityContext, PermissionMatrix};
use gatehouse_core::{AccountId, ActionId, AreaId, AuditTrail, BranchId, Locale};
use gatehouse_infra::{AccountQuery, AreaQuery, PageRequest};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

impl AccountListParams {
    pub fn into_query(self) -> AccountQuery {
        AccountQuery {
            page: page_request(self.page, self.limit),
            name: self.name,
            email: self.email,
            mobile: self.mobile,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub en: Option<String>,
    pub ar: Option<String>,
}

impl AreaListParams {
    pub fn into_query(self) -> AreaQuery {
        AreaQuery {
            page: page_request(self.page, self.limit),
            name: self.name,
            en: self.en,
            ar: self.ar,
        }
    }
}

fn page_request(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(defaults.page),
        limit: limit.unwrap_or(defaults.limit),
    }
    .normalized()
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: AccountId,
    pub name: String,
    pub language: Locale,
    pub is_developer: bool,
    /// Argon2 digests of the granted area and action names.
    pub areas_fingerprint: String,
    pub actions_fingerprint: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: AccountId,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub language: Locale,
    pub branch_id: Option<BranchId>,
    pub areas_granted: Vec<String>,
    pub actions_granted: Vec<String>,
    pub active: bool,
    pub is_admin: bool,
    pub permissions: PermissionMatrix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditTrail>,
}

impl AccountView {
    /// Audit trails are shown to administrators only.
    pub fn new(account: Account, permissions: PermissionMatrix, viewer: &IdentityContext) -> Self {
        Self {
            id: account.id,
            name: account.name,
            mobile: account.mobile,
            email: account.email,
            language: account.language,
            branch_id: account.branch_id,
            areas_granted: account.areas_granted.into_iter().collect(),
            actions_granted: account.actions_granted.into_iter().collect(),
            active: account.active,
            is_admin: account.is_admin,
            permissions,
            audit: viewer.is_admin.then_some(account.audit),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionView {
    pub id: ActionId,
    pub name: String,
    pub en: String,
    pub ar: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditTrail>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaView {
    pub id: AreaId,
    pub name: String,
    pub en: String,
    pub ar: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub actions: Vec<ActionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditTrail>,
}

impl AreaView {
    pub fn new(area: Area, actions: Vec<Action>, viewer: &IdentityContext) -> Self {
        let show_audit = viewer.is_admin;
        let mut actions: Vec<ActionView> = actions
            .into_iter()
            .filter(|a| !a.deleted)
            .map(|a| ActionView {
                id: a.id,
                name: a.name,
                en: a.labels.en,
                ar: a.labels.ar,
                active: a.active,
                audit: show_audit.then_some(a.audit),
            })
            .collect();
        actions.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            id: area.id,
            name: area.name,
            en: area.labels.en,
            ar: area.labels.ar,
            active: area.active,
            created_at: area.created_at,
            actions,
            audit: show_audit.then_some(area.audit),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRetired {
    pub id: AreaId,
    pub actions_retired: usize,
}
