//! Account model: credentials, grants and lifecycle flags.

use std::collections::BTreeSet;

use serde::Deserialize;

use gatehouse_core::{AccountId, AuditStamp, AuditTrail, BranchId, DomainError, Locale, Record};

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_MOBILE_LEN: usize = 11;
pub const MIN_PASSWORD_LEN: usize = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// A person who can log in.
///
/// # Invariants
/// - `name`, `mobile` and `email` are unique among non-deleted accounts
///   (enforced by the store).
/// - Grants name areas/actions; they are checked by exact string match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub password_hash: String,
    pub language: Locale,
    pub branch_id: Option<BranchId>,
    pub areas_granted: BTreeSet<String>,
    pub actions_granted: BTreeSet<String>,
    pub active: bool,
    pub deleted: bool,
    pub is_admin: bool,
    pub is_developer: bool,
    pub audit: AuditTrail,
}

impl Account {
    /// Whether `login` is this account's name, email or mobile.
    pub fn answers_to(&self, login: &str) -> bool {
        self.name == login || self.email == login || self.mobile == login
    }

    /// Soft delete.
    pub fn retire(&mut self, stamp: AuditStamp) {
        self.active = false;
        self.deleted = true;
        self.audit.removed = Some(stamp);
    }

    /// Replace `from` with `to` in the area grants. Returns whether anything changed.
    pub fn rename_area_grant(&mut self, from: &str, to: &str) -> bool {
        rename_in(&mut self.areas_granted, from, to)
    }

    /// Replace `from` with `to` in the action grants. Returns whether anything changed.
    pub fn rename_action_grant(&mut self, from: &str, to: &str) -> bool {
        rename_in(&mut self.actions_granted, from, to)
    }
}

fn rename_in(set: &mut BTreeSet<String>, from: &str, to: &str) -> bool {
    if from == to || !set.remove(from) {
        return false;
    }
    set.insert(to.to_string());
    true
}

impl Record for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Payload for creating an account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub language: Locale,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub areas_granted: BTreeSet<String>,
    #[serde(default)]
    pub actions_granted: BTreeSet<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewAccount {
    /// Validate field shapes. The error names the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_name(&self.name)?;
        check_mobile(&self.mobile)?;
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        check_password(&self.password)
    }

    /// Build the stored account. Email defaults to the mobile number.
    pub fn into_account(self, id: AccountId, password_hash: String, stamp: AuditStamp) -> Account {
        let email = match self.email {
            Some(email) if !email.trim().is_empty() => email.trim().to_string(),
            _ => self.mobile.trim().to_string(),
        };

        Account {
            id,
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            email,
            password_hash,
            language: self.language,
            branch_id: self.branch_id,
            areas_granted: self.areas_granted,
            actions_granted: self.actions_granted,
            active: true,
            deleted: false,
            is_admin: self.is_admin,
            is_developer: false,
            audit: AuditTrail::added(stamp),
        }
    }
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub language: Option<Locale>,
    pub branch_id: Option<BranchId>,
    pub areas_granted: Option<BTreeSet<String>>,
    pub actions_granted: Option<BTreeSet<String>>,
    pub active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl AccountPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(mobile) = &self.mobile {
            check_mobile(mobile)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok(())
    }

    /// Apply onto `account`. `password_hash` replaces the stored hash when
    /// present; the caller hashes `self.password` beforehand.
    pub fn apply(self, account: &mut Account, password_hash: Option<String>, stamp: AuditStamp) {
        if let Some(name) = self.name {
            account.name = name.trim().to_string();
        }
        if let Some(mobile) = self.mobile {
            account.mobile = mobile.trim().to_string();
        }
        // Blank keeps the current address.
        if let Some(email) = self.email.filter(|e| !e.trim().is_empty()) {
            account.email = email.trim().to_string();
        }
        if let Some(hash) = password_hash {
            account.password_hash = hash;
        }
        if let Some(language) = self.language {
            account.language = language;
        }
        if let Some(branch_id) = self.branch_id {
            account.branch_id = Some(branch_id);
        }
        if let Some(areas) = self.areas_granted {
            account.areas_granted = areas;
        }
        if let Some(actions) = self.actions_granted {
            account.actions_granted = actions;
        }
        if let Some(active) = self.active {
            account.active = active;
        }
        if let Some(is_admin) = self.is_admin {
            account.is_admin = is_admin;
        }
        account.audit.last_updated = Some(stamp);
    }
}

fn check_name(name: &str) -> Result<(), DomainError> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(DomainError::validation("name"));
    }
    Ok(())
}

fn check_mobile(mobile: &str) -> Result<(), DomainError> {
    if mobile.trim().chars().count() < MIN_MOBILE_LEN {
        return Err(DomainError::validation("mobile"));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if !email.is_empty() && !email.contains('@') {
        return Err(DomainError::validation("email"));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation("password"));
    }
    Ok(())
}
