//! Idempotent bootstrap of the built-in catalog and the bootstrap accounts.
//!
//! Safe to run on every start: a record is inserted only when no live record
//! holds its name, and seeded records use fixed ids so a catalog area that
//! was deliberately retired is not brought back.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use gatehouse_auth::{Account, Action, Area, BUILTIN_CATALOG, PasswordError, hash_password};
use gatehouse_core::{AccountId, ActionId, AreaId, AuditStamp, AuditTrail, Labels, Locale};

use crate::config::BootstrapAccount;
use crate::store::{AccountStore, CatalogStore, StoreError};

pub const SEED_DEVELOPER_ID: AccountId = AccountId::from_u128(0x0192_0000_0000_7000_8000_0000_0000_a001);
pub const SEED_ADMIN_ID: AccountId = AccountId::from_u128(0x0192_0000_0000_7000_8000_0000_0000_a002);
pub const SEED_DEVELOPER_MOBILE: &str = "21002627613";
pub const SEED_ADMIN_MOBILE: &str = "21001185518";

const SEED_AREA_BASE: u128 = 0x0192_0000_0000_7000_8000_0000_0001_0000;
const SEED_ACTION_BASE: u128 = 0x0192_0000_0000_7000_8000_0000_0002_0000;

/// Fixed id of the `index`-th built-in area.
pub const fn seed_area_id(index: usize) -> AreaId {
    AreaId::from_u128(SEED_AREA_BASE + index as u128)
}

/// Fixed id of the `action`-th action of the `area`-th built-in area.
pub const fn seed_action_id(area: usize, action: usize) -> ActionId {
    ActionId::from_u128(SEED_ACTION_BASE + (area as u128) * 0x100 + action as u128)
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub areas_created: usize,
    pub accounts_created: usize,
}

/// Every built-in area and action name.
pub fn all_grants() -> (BTreeSet<String>, BTreeSet<String>) {
    let areas = BUILTIN_CATALOG.iter().map(|e| e.area.0.to_string()).collect();
    let actions = BUILTIN_CATALOG
        .iter()
        .flat_map(|e| e.actions.iter().map(|a| a.0.to_string()))
        .collect();
    (areas, actions)
}

pub async fn bootstrap<S>(
    store: &S,
    developer: &BootstrapAccount,
    admin: Option<&BootstrapAccount>,
    now: DateTime<Utc>,
) -> Result<SeedReport, SeedError>
where
    S: AccountStore + CatalogStore,
{
    let stamp = AuditStamp::new(SEED_DEVELOPER_ID, now, None);
    let mut report = SeedReport::default();

    let live = store.catalog().await?;
    for (index, entry) in BUILTIN_CATALOG.iter().enumerate() {
        let (name, en, ar) = entry.area;
        if live.areas.iter().any(|a| a.name == name) {
            continue;
        }

        let area = Area {
            id: seed_area_id(index),
            name: name.to_string(),
            labels: Labels::new(en, ar),
            active: true,
            deleted: false,
            created_at: now,
            audit: AuditTrail::added(stamp.clone()),
        };
        let actions: Vec<Action> = entry
            .actions
            .iter()
            .enumerate()
            .filter(|(_, (action, _, _))| !live.actions.iter().any(|a| a.name == *action))
            .map(|(i, (action, en, ar))| Action {
                id: seed_action_id(index, i),
                area_id: area.id,
                name: action.to_string(),
                labels: Labels::new(*en, *ar),
                active: true,
                deleted: false,
                created_at: now,
                audit: AuditTrail::added(stamp.clone()),
            })
            .collect();

        match store.create_area(&area, &actions).await {
            Ok(()) => report.areas_created += 1,
            // Seeded before and retired since.
            Err(StoreError::Duplicate(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let seeded = [
        Some((SEED_DEVELOPER_ID, developer, SEED_DEVELOPER_MOBILE, true)),
        admin.map(|admin| (SEED_ADMIN_ID, admin, SEED_ADMIN_MOBILE, false)),
    ];
    for (id, credentials, mobile, is_developer) in seeded.into_iter().flatten() {
        if store.find_login(&credentials.name).await?.is_some() || store.get_account(id).await?.is_some() {
            continue;
        }

        let (areas_granted, actions_granted) = all_grants();
        let account = Account {
            id,
            name: credentials.name.clone(),
            mobile: mobile.to_string(),
            email: mobile.to_string(),
            password_hash: hash_password(&credentials.password)?,
            language: Locale::En,
            branch_id: None,
            areas_granted,
            actions_granted,
            active: true,
            deleted: false,
            is_admin: true,
            is_developer,
            audit: AuditTrail::added(stamp.clone()),
        };

        match store.insert_account(&account).await {
            Ok(()) => report.accounts_created += 1,
            Err(StoreError::Duplicate(key)) => {
                info!(account = %credentials.name, key = %key, "bootstrap account collides with an existing one, skipped");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        areas_created = report.areas_created,
        accounts_created = report.accounts_created,
        "bootstrap complete"
    );
    Ok(report)
}
