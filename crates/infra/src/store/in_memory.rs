use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use gatehouse_auth::{Account, AccountDirectory, Action, ActionDraft, Area, AreaPatch, DirectoryError};
use gatehouse_core::{AccountId, ActionId, AreaId, AuditStamp, Record};

use super::{
    AccountQuery, AccountStore, AreaQuery, CatalogSnapshot, CatalogStore, Page, RetireOutcome, StoreError, contains_ci,
};

#[derive(Debug, Clone, Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    areas: BTreeMap<AreaId, Area>,
    actions: BTreeMap<ActionId, Action>,
}

/// In-memory store for tests/dev.
///
/// All state sits behind one lock, so every multi-record operation is atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

impl State {
    /// First unique key of `candidate` already held by another non-deleted account.
    fn account_conflict(&self, candidate: &Account) -> Option<&'static str> {
        self.accounts
            .values()
            .filter(|other| other.id != candidate.id && !other.deleted)
            .find_map(|other| {
                if other.name == candidate.name {
                    Some("name")
                } else if other.mobile == candidate.mobile {
                    Some("mobile")
                } else if other.email == candidate.email {
                    Some("email")
                } else {
                    None
                }
            })
    }

    fn area_name_taken(&self, name: &str, except: Option<AreaId>) -> bool {
        self.areas
            .values()
            .any(|a| !a.deleted && a.name == name && Some(a.id) != except)
    }

    fn action_name_taken(&self, name: &str, except: Option<ActionId>) -> bool {
        self.actions
            .values()
            .any(|a| !a.deleted && a.name == name && Some(a.id) != except)
    }

    fn rename_area_grants(&mut self, from: &str, to: &str) {
        for account in self.accounts.values_mut().filter(|a| !a.deleted) {
            account.rename_area_grant(from, to);
        }
    }

    fn rename_action_grants(&mut self, from: &str, to: &str) {
        for account in self.accounts.values_mut().filter(|a| !a.deleted) {
            account.rename_action_grant(from, to);
        }
    }

    fn upsert_action(&mut self, area_id: AreaId, draft: &ActionDraft, stamp: &AuditStamp) -> Result<(), StoreError> {
        let name = draft.name.trim();
        let existing = match draft.id {
            Some(id) => Some(
                self.actions
                    .get(&id)
                    .filter(|a| a.area_id == area_id && !a.deleted)
                    .map(|a| a.id)
                    .ok_or(StoreError::NotFound)?,
            ),
            None => self
                .actions
                .values()
                .find(|a| a.area_id == area_id && !a.deleted && a.name == name)
                .map(|a| a.id),
        };

        if self.action_name_taken(name, existing) {
            return Err(StoreError::Duplicate(format!("action name '{name}'")));
        }

        match existing {
            Some(id) => {
                let Some(action) = self.actions.get_mut(&id) else {
                    return Err(StoreError::NotFound);
                };
                draft.check_rename(action)?;
                let previous = draft.apply(action, stamp.clone());
                if previous != name {
                    self.rename_action_grants(&previous, name);
                }
            }
            None => {
                let action = Action::new(area_id, ActionDraft { id: None, ..draft.clone() }, stamp.clone());
                self.actions.insert(action.id, action);
            }
        }
        Ok(())
    }

    fn area_actions(&self, area_id: AreaId) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .actions
            .values()
            .filter(|a| a.area_id == area_id && !a.deleted)
            .cloned()
            .collect();
        actions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        actions
    }
}

#[async_trait]
impl AccountDirectory for InMemoryStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        let state = self.read().map_err(|e| DirectoryError(e.to_string()))?;
        Ok(state.accounts.get(&id).cloned())
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate("id".to_string()));
        }
        if let Some(key) = state.account_conflict(account) {
            return Err(StoreError::Duplicate(key.to_string()));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn save_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        if !account.deleted {
            if let Some(key) = state.account_conflict(account) {
                return Err(StoreError::Duplicate(key.to_string()));
            }
        }
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(&id).cloned())
    }

    async fn find_login(&self, login: &str) -> Result<Option<Account>, StoreError> {
        let state = self.read()?;
        Ok(state
            .accounts
            .values()
            .find(|a| a.is_live() && a.answers_to(login))
            .cloned())
    }

    async fn list_accounts(&self, query: &AccountQuery) -> Result<Page<Account>, StoreError> {
        let state = self.read()?;
        let matching: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| !a.deleted && !a.is_developer)
            .filter(|a| {
                contains_ci(&a.name, &query.name)
                    && contains_ci(&a.email, &query.email)
                    && contains_ci(&a.mobile, &query.mobile)
            })
            .cloned()
            .collect();
        Ok(Page::from_sorted(matching, query.page))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn create_area(&self, area: &Area, actions: &[Action]) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.areas.contains_key(&area.id) || actions.iter().any(|a| state.actions.contains_key(&a.id)) {
            return Err(StoreError::Duplicate("id".to_string()));
        }
        if state.area_name_taken(&area.name, None) {
            return Err(StoreError::Duplicate(format!("area name '{}'", area.name)));
        }
        if let Some(taken) = actions.iter().find(|a| state.action_name_taken(&a.name, None)) {
            return Err(StoreError::Duplicate(format!("action name '{}'", taken.name)));
        }

        state.areas.insert(area.id, area.clone());
        for action in actions {
            state.actions.insert(action.id, action.clone());
        }
        Ok(())
    }

    async fn get_area(&self, id: AreaId) -> Result<Option<Area>, StoreError> {
        Ok(self.read()?.areas.get(&id).filter(|a| !a.deleted).cloned())
    }

    async fn list_areas(&self, query: &AreaQuery) -> Result<Page<Area>, StoreError> {
        let state = self.read()?;
        let mut matching: Vec<Area> = state
            .areas
            .values()
            .filter(|a| !a.deleted)
            .filter(|a| {
                contains_ci(&a.name, &query.name)
                    && contains_ci(&a.labels.en, &query.en)
                    && contains_ci(&a.labels.ar, &query.ar)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(Page::from_sorted(matching, query.page))
    }

    async fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
        let state = self.read()?;
        Ok(CatalogSnapshot {
            areas: state.areas.values().filter(|a| !a.deleted).cloned().collect(),
            actions: state.actions.values().filter(|a| !a.deleted).cloned().collect(),
        })
    }

    async fn update_area(&self, id: AreaId, patch: &AreaPatch, stamp: &AuditStamp) -> Result<(Area, Vec<Action>), StoreError> {
        let mut guard = self.write()?;
        // Work on a copy so a failure half-way leaves nothing behind.
        let mut state = guard.clone();

        let mut area = state
            .areas
            .get(&id)
            .filter(|a| !a.deleted)
            .cloned()
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = &patch.name {
            if state.area_name_taken(name.trim(), Some(id)) {
                return Err(StoreError::Duplicate(format!("area name '{}'", name.trim())));
            }
        }

        patch.check_rename(&area)?;
        let previous_name = area.name.clone();
        patch.apply(&mut area, stamp.clone());
        state.areas.insert(id, area.clone());

        for draft in &patch.actions {
            state.upsert_action(id, draft, stamp)?;
        }

        if !area.active {
            for action in state.actions.values_mut().filter(|a| a.area_id == id && !a.deleted) {
                action.active = false;
            }
        }

        if previous_name != area.name {
            state.rename_area_grants(&previous_name, &area.name);
        }

        let actions = state.area_actions(id);
        *guard = state;
        Ok((area, actions))
    }

    async fn retire_area(&self, id: AreaId, stamp: &AuditStamp) -> Result<RetireOutcome, StoreError> {
        let mut state = self.write()?;

        let Some(area) = state.areas.get_mut(&id) else {
            return Ok(RetireOutcome::Missing);
        };
        let area_newly_retired = !area.deleted;
        if area_newly_retired {
            area.retire(stamp.clone());
        }

        let mut actions_retired = 0;
        for action in state.actions.values_mut().filter(|a| a.area_id == id && !a.deleted) {
            action.retire(stamp.clone());
            actions_retired += 1;
        }

        Ok(RetireOutcome::Retired {
            area_newly_retired,
            actions_retired,
        })
    }

    async fn live_action_count(&self, area_id: AreaId) -> Result<usize, StoreError> {
        let state = self.read()?;
        Ok(state
            .actions
            .values()
            .filter(|a| a.area_id == area_id && !a.deleted)
            .count())
    }
}
