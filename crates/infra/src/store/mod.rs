//! Storage ports for accounts and the area/action catalog.
//!
//! Every mutation that must hold together (uniqueness check + insert, grant
//! renames, the area cascade) is a single store call so each implementation
//! can make it atomic: one write lock in memory, one transaction in Postgres.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use gatehouse_auth::{Account, AccountDirectory, Action, Area, AreaPatch};
use gatehouse_core::{AccountId, AreaId, AuditStamp, DomainError};

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A live record already holds this unique key. The payload names the key.
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    /// The change breaks a catalog rule checked under the store's lock.
    #[error("rejected: {0}")]
    Rejected(#[from] DomainError),

    /// Transient backend failure; the operation may be retried.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries & pages
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn first_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: first_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Page clamped to >= 1, limit clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.request.limit.max(1)))
    }

    pub fn has_prev(&self) -> bool {
        self.request.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.request.page) < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }

    /// Slice an already filtered and ordered list.
    pub(crate) fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let request = request.normalized();
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self { items, total, request }
    }
}

/// Account listing filter. Text filters match case-insensitive substrings.
/// Deleted and developer accounts never appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuery {
    pub page: PageRequest,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

/// Area listing filter. Deleted areas never appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaQuery {
    pub page: PageRequest,
    pub name: Option<String>,
    pub en: Option<String>,
    pub ar: Option<String>,
}

pub(crate) fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Non-deleted areas and actions, as read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub areas: Vec<Area>,
    pub actions: Vec<Action>,
}

impl CatalogSnapshot {
    pub fn actions_of(&self, area_id: AreaId) -> Vec<Action> {
        self.actions.iter().filter(|a| a.area_id == area_id).cloned().collect()
    }
}

/// Result of one cascade pass over an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireOutcome {
    /// No area with this id exists.
    Missing,
    Retired {
        /// `false` when the area was already deleted before this pass.
        area_newly_retired: bool,
        actions_retired: usize,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Ports
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AccountStore: AccountDirectory + Send + Sync {
    /// Insert a new account. `Duplicate` when a live account shares its
    /// name, mobile or email.
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Overwrite an existing account, re-checking uniqueness against others.
    async fn save_account(&self, account: &Account) -> Result<(), StoreError>;

    /// Any lifecycle state.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Live account whose name, email or mobile equals `login`.
    async fn find_login(&self, login: &str) -> Result<Option<Account>, StoreError>;

    async fn list_accounts(&self, query: &AccountQuery) -> Result<Page<Account>, StoreError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert an area with its actions. `Duplicate` when the area name or any
    /// action name is held by a live record.
    async fn create_area(&self, area: &Area, actions: &[Action]) -> Result<(), StoreError>;

    /// Non-deleted area by id.
    async fn get_area(&self, id: AreaId) -> Result<Option<Area>, StoreError>;

    async fn list_areas(&self, query: &AreaQuery) -> Result<Page<Area>, StoreError>;

    async fn catalog(&self) -> Result<CatalogSnapshot, StoreError>;

    /// Apply `patch` to a non-deleted area and upsert its actions.
    ///
    /// Renaming an area or action rewrites that name in every account's
    /// grants within the same operation. Deactivating an area deactivates its
    /// live actions.
    async fn update_area(&self, id: AreaId, patch: &AreaPatch, stamp: &AuditStamp) -> Result<(Area, Vec<Action>), StoreError>;

    /// One atomic cascade pass: retire the area (if still live) and every
    /// non-deleted action scoped to it.
    async fn retire_area(&self, id: AreaId, stamp: &AuditStamp) -> Result<RetireOutcome, StoreError>;

    /// Non-deleted actions still referencing `area_id`.
    async fn live_action_count(&self, area_id: AreaId) -> Result<usize, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn create_area(&self, area: &Area, actions: &[Action]) -> Result<(), StoreError> {
        (**self).create_area(area, actions).await
    }

    async fn get_area(&self, id: AreaId) -> Result<Option<Area>, StoreError> {
        (**self).get_area(id).await
    }

    async fn list_areas(&self, query: &AreaQuery) -> Result<Page<Area>, StoreError> {
        (**self).list_areas(query).await
    }

    async fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
        (**self).catalog().await
    }

    async fn update_area(&self, id: AreaId, patch: &AreaPatch, stamp: &AuditStamp) -> Result<(Area, Vec<Action>), StoreError> {
        (**self).update_area(id, patch, stamp).await
    }

    async fn retire_area(&self, id: AreaId, stamp: &AuditStamp) -> Result<RetireOutcome, StoreError> {
        (**self).retire_area(id, stamp).await
    }

    async fn live_action_count(&self, area_id: AreaId) -> Result<usize, StoreError> {
        (**self).live_action_count(area_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_arithmetic() {
        let page = Page::from_sorted((0..25).collect::<Vec<_>>(), PageRequest { page: 3, limit: 10 });

        assert_eq!(page.items, (20..25).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn page_request_is_clamped() {
        let request = PageRequest { page: 0, limit: 10_000 }.normalized();
        assert_eq!(request, PageRequest { page: 1, limit: MAX_PAGE_LIMIT });
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = Page::<u8>::from_sorted(Vec::new(), PageRequest::default());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }
}
