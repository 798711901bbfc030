//! Area retirement with its scoped actions.
//!
//! The store performs each pass atomically; this component retries transient
//! failures and only reports success once no live action references the area.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use gatehouse_core::{AreaId, AuditStamp};

use crate::store::{CatalogStore, RetireOutcome, StoreError};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    Deleted { actions_retired: usize },
    /// The area never existed or was already fully retired.
    NotFound,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CascadeError {
    #[error("cascade failed: {0}")]
    Store(StoreError),

    #[error("cascade gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: StoreError },

    #[error("{remaining} live actions still reference the area after {attempts} attempts")]
    Incomplete { attempts: u32, remaining: usize },
}

pub struct CascadingSoftDelete<S> {
    store: S,
    max_attempts: u32,
    backoff: Duration,
}

impl<S: CatalogStore> CascadingSoftDelete<S> {
    pub fn new(store: S, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            backoff: Duration::from_millis(25),
        }
    }

    /// Base delay between attempts (multiplied by the attempt number).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn retire(&self, area_id: AreaId, stamp: &AuditStamp) -> Result<CascadeOutcome, CascadeError> {
        let mut actions_retired = 0;
        let mut area_retired = false;
        let mut remaining = 0;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.backoff * (attempt - 1)).await;
            }

            match self.store.retire_area(area_id, stamp).await {
                Ok(RetireOutcome::Missing) => return Ok(CascadeOutcome::NotFound),
                Ok(RetireOutcome::Retired {
                    area_newly_retired,
                    actions_retired: n,
                }) => {
                    area_retired |= area_newly_retired;
                    actions_retired += n;
                }
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(area_id = %area_id, attempt, error = %e, "cascade pass failed, retrying");
                    continue;
                }
                Err(e) if e.is_transient() => {
                    return Err(CascadeError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
                Err(e) => return Err(CascadeError::Store(e)),
            }

            match self.store.live_action_count(area_id).await {
                Ok(0) => {
                    if !area_retired && actions_retired == 0 {
                        return Ok(CascadeOutcome::NotFound);
                    }
                    info!(area_id = %area_id, actions_retired, "area retired");
                    return Ok(CascadeOutcome::Deleted { actions_retired });
                }
                Ok(n) => {
                    warn!(area_id = %area_id, attempt, remaining = n, "live actions survived cascade pass");
                    remaining = n;
                }
                Err(e) if e.is_transient() => {
                    warn!(area_id = %area_id, attempt, error = %e, "cascade verification failed, retrying");
                }
                Err(e) => return Err(CascadeError::Store(e)),
            }
        }

        Err(CascadeError::Incomplete {
            attempts: self.max_attempts,
            remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use gatehouse_auth::{Action, ActionDraft, Area, AreaDraft, AreaPatch};
    use gatehouse_core::{AccountId, Labels, Record};

    use crate::store::{AreaQuery, CatalogSnapshot, InMemoryStore, Page};

    fn stamp() -> AuditStamp {
        AuditStamp::new(AccountId::new(), Utc::now(), None)
    }

    fn records(name: &str, actions: &[&str]) -> (Area, Vec<Action>) {
        AreaDraft {
            name: name.to_string(),
            labels: Labels::new("Label", "تسمية"),
            actions: actions
                .iter()
                .map(|a| ActionDraft {
                    id: None,
                    name: a.to_string(),
                    labels: Labels::new("Label", "تسمية"),
                    active: None,
                })
                .collect(),
        }
        .into_records(stamp())
    }

    /// Wraps a real store; fails the first `failures` cascade passes and can
    /// skip the first pass entirely.
    struct Flaky {
        inner: Arc<InMemoryStore>,
        failures: AtomicU32,
        skip_first_pass: bool,
        passes: AtomicU32,
        error: StoreError,
    }

    impl Flaky {
        fn new(inner: Arc<InMemoryStore>, failures: u32, error: StoreError) -> Self {
            Self {
                inner,
                failures: AtomicU32::new(failures),
                skip_first_pass: false,
                passes: AtomicU32::new(0),
                error,
            }
        }
    }

    #[async_trait]
    impl CatalogStore for Flaky {
        async fn create_area(&self, area: &Area, actions: &[Action]) -> Result<(), StoreError> {
            self.inner.create_area(area, actions).await
        }

        async fn get_area(&self, id: AreaId) -> Result<Option<Area>, StoreError> {
            self.inner.get_area(id).await
        }

        async fn list_areas(&self, query: &AreaQuery) -> Result<Page<Area>, StoreError> {
            self.inner.list_areas(query).await
        }

        async fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
            self.inner.catalog().await
        }

        async fn update_area(&self, id: AreaId, patch: &AreaPatch, stamp: &AuditStamp) -> Result<(Area, Vec<Action>), StoreError> {
            self.inner.update_area(id, patch, stamp).await
        }

        async fn retire_area(&self, id: AreaId, stamp: &AuditStamp) -> Result<RetireOutcome, StoreError> {
            let pass = self.passes.fetch_add(1, Ordering::SeqCst);
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(self.error.clone());
            }
            if self.skip_first_pass && pass == 0 {
                return Ok(RetireOutcome::Retired {
                    area_newly_retired: false,
                    actions_retired: 0,
                });
            }
            self.inner.retire_area(id, stamp).await
        }

        async fn live_action_count(&self, area_id: AreaId) -> Result<usize, StoreError> {
            self.inner.live_action_count(area_id).await
        }
    }

    fn cascade<S: CatalogStore>(store: S, attempts: u32) -> CascadingSoftDelete<S> {
        CascadingSoftDelete::new(store, attempts).with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn retires_area_and_only_its_actions() {
        let store = Arc::new(InMemoryStore::new());
        let (branches, branch_actions) = records("branches", &["addBranch", "updateBranch", "deleteBranch"]);
        let (cities, city_actions) = records("cities", &["addCity"]);
        store.create_area(&branches, &branch_actions).await.unwrap();
        store.create_area(&cities, &city_actions).await.unwrap();

        let outcome = cascade(store.clone(), 3).retire(branches.id, &stamp()).await.unwrap();
        assert_eq!(outcome, CascadeOutcome::Deleted { actions_retired: 3 });

        let snapshot = store.catalog().await.unwrap();
        assert!(snapshot.areas.iter().all(|a| a.id != branches.id));
        assert_eq!(snapshot.actions.len(), 1);
        assert!(snapshot.actions[0].is_live());
        assert_eq!(snapshot.actions[0].area_id, cities.id);
    }

    #[tokio::test]
    async fn second_retire_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let (area, actions) = records("branches", &["addBranch"]);
        store.create_area(&area, &actions).await.unwrap();

        let cascade = cascade(store, 3);
        cascade.retire(area.id, &stamp()).await.unwrap();

        assert_eq!(cascade.retire(area.id, &stamp()).await.unwrap(), CascadeOutcome::NotFound);
        assert_eq!(cascade.retire(AreaId::new(), &stamp()).await.unwrap(), CascadeOutcome::NotFound);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let inner = Arc::new(InMemoryStore::new());
        let (area, actions) = records("branches", &["addBranch", "deleteBranch"]);
        inner.create_area(&area, &actions).await.unwrap();

        let flaky = Flaky::new(inner.clone(), 2, StoreError::Unavailable("connection reset".to_string()));
        let outcome = cascade(flaky, 3).retire(area.id, &stamp()).await.unwrap();

        assert_eq!(outcome, CascadeOutcome::Deleted { actions_retired: 2 });
        assert_eq!(inner.live_action_count(area.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let inner = Arc::new(InMemoryStore::new());
        let (area, actions) = records("branches", &["addBranch"]);
        inner.create_area(&area, &actions).await.unwrap();

        let error = StoreError::Unavailable("connection reset".to_string());
        let flaky = Flaky::new(inner.clone(), 5, error.clone());
        let err = cascade(flaky, 3).retire(area.id, &stamp()).await.unwrap_err();

        assert_eq!(err, CascadeError::Exhausted { attempts: 3, last: error });
        // Nothing was half-applied.
        assert!(inner.get_area(area.id).await.unwrap().is_some());
        assert_eq!(inner.live_action_count(area.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let inner = Arc::new(InMemoryStore::new());
        let (area, actions) = records("branches", &["addBranch"]);
        inner.create_area(&area, &actions).await.unwrap();

        let flaky = Flaky::new(inner, 1, StoreError::Backend("bad row".to_string()));
        let flaky_passes = cascade(flaky, 3);
        let err = flaky_passes.retire(area.id, &stamp()).await.unwrap_err();

        assert_eq!(err, CascadeError::Store(StoreError::Backend("bad row".to_string())));
        assert_eq!(flaky_passes.store.passes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn verification_triggers_another_pass() {
        let inner = Arc::new(InMemoryStore::new());
        let (area, actions) = records("branches", &["addBranch"]);
        inner.create_area(&area, &actions).await.unwrap();

        let mut flaky = Flaky::new(inner.clone(), 0, StoreError::NotFound);
        flaky.skip_first_pass = true;
        let cascade = cascade(flaky, 3);

        let outcome = cascade.retire(area.id, &stamp()).await.unwrap();
        assert_eq!(outcome, CascadeOutcome::Deleted { actions_retired: 1 });
        assert_eq!(cascade.store.passes.load(Ordering::SeqCst), 2);
    }
}
