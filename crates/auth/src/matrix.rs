//! Per-account {area × action} grant grid.

use std::collections::HashMap;

use serde::Serialize;

use gatehouse_core::{ActionId, AreaId, Labels, Record};

use crate::account::Account;
use crate::authorize::{permission_check, route_check};
use crate::catalog::{Action, Area};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGrant {
    pub id: ActionId,
    pub name: String,
    pub labels: Labels,
    pub granted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaGrant {
    pub id: AreaId,
    pub name: String,
    pub labels: Labels,
    pub granted: bool,
    pub actions: Vec<ActionGrant>,
}

/// Derived on demand; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    pub areas: Vec<AreaGrant>,
}

/// Build the grant grid for `account` over the live catalog.
///
/// Retired or inactive areas and actions are skipped, so the raw catalog can
/// be passed in. Areas come out in creation order (ties broken by id);
/// actions keep their creation order within each area.
pub fn build_matrix(account: &Account, areas: &[Area], actions: &[Action]) -> PermissionMatrix {
    let mut by_area: HashMap<AreaId, Vec<&Action>> = HashMap::new();
    for action in actions.iter().filter(|a| a.is_live()) {
        by_area.entry(action.area_id).or_default().push(action);
    }

    let mut live: Vec<&Area> = areas.iter().filter(|a| a.is_live()).collect();
    live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let areas = live
        .into_iter()
        .map(|area| {
            let mut scoped = by_area.remove(&area.id).unwrap_or_default();
            scoped.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

            AreaGrant {
                id: area.id,
                name: area.name.clone(),
                labels: area.labels.clone(),
                granted: route_check(account, &area.name),
                actions: scoped
                    .into_iter()
                    .map(|action| ActionGrant {
                        id: action.id,
                        name: action.name.clone(),
                        labels: action.labels.clone(),
                        granted: permission_check(account, &action.name),
                    })
                    .collect(),
            }
        })
        .collect();

    PermissionMatrix { areas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use gatehouse_core::{AccountId, AuditTrail, Locale};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn area(name: &str, minutes: i64, active: bool, deleted: bool) -> Area {
        Area {
            id: AreaId::new(),
            name: name.to_string(),
            labels: Labels::new(name, name),
            active,
            deleted,
            created_at: t0() + Duration::minutes(minutes),
            audit: AuditTrail::default(),
        }
    }

    fn action(area: &Area, name: &str, minutes: i64, active: bool, deleted: bool) -> Action {
        Action {
            id: ActionId::new(),
            area_id: area.id,
            name: name.to_string(),
            labels: Labels::new(name, name),
            active,
            deleted,
            created_at: t0() + Duration::minutes(minutes),
            audit: AuditTrail::default(),
        }
    }

    fn account(areas: &[&str], actions: &[&str]) -> Account {
        Account {
            id: AccountId::new(),
            name: "clerk".to_string(),
            mobile: "01000000004".to_string(),
            email: "clerk@example.com".to_string(),
            password_hash: String::new(),
            language: Locale::En,
            branch_id: None,
            areas_granted: areas.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            actions_granted: actions.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            active: true,
            deleted: false,
            is_admin: false,
            is_developer: false,
            audit: AuditTrail::default(),
        }
    }

    #[test]
    fn flags_follow_grants_and_order_follows_creation() {
        let branches = area("branches", 2, true, false);
        let accounts = area("accounts", 1, true, false);
        let catalog_actions = vec![
            action(&accounts, "deleteAccount", 2, true, false),
            action(&accounts, "addAccount", 1, true, false),
            action(&branches, "addBranch", 1, true, false),
        ];

        let clerk = account(&["accounts"], &["addAccount"]);
        let matrix = build_matrix(&clerk, &[branches, accounts], &catalog_actions);

        let names: Vec<_> = matrix.areas.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["accounts", "branches"]);

        let accounts = &matrix.areas[0];
        assert!(accounts.granted);
        assert_eq!(accounts.actions[0].name, "addAccount");
        assert!(accounts.actions[0].granted);
        assert!(!accounts.actions[1].granted);

        assert!(!matrix.areas[1].granted);
        assert!(!matrix.areas[1].actions[0].granted);
    }

    #[test]
    fn retired_records_are_skipped() {
        let live = area("cities", 0, true, false);
        let retired = area("governorates", 1, false, true);
        let catalog_actions = vec![
            action(&live, "addCity", 0, true, false),
            action(&live, "deleteCity", 1, false, true),
            action(&retired, "addGovernorate", 0, true, false),
        ];

        let matrix = build_matrix(&account(&[], &[]), &[live, retired], &catalog_actions);

        assert_eq!(matrix.areas.len(), 1);
        assert_eq!(matrix.areas[0].actions.len(), 1);
    }

    #[test]
    fn serializes_as_array_of_areas() {
        let cities = area("cities", 0, true, false);
        let acts = vec![action(&cities, "addCity", 0, true, false)];
        let json = serde_json::to_value(build_matrix(&account(&["cities"], &[]), &[cities], &acts)).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["granted"], true);
        assert_eq!(json[0]["actions"][0]["granted"], false);
    }

    proptest! {
        #[test]
        fn counts_match_live_catalog(
            area_flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..8),
            action_specs in prop::collection::vec((0usize..8, any::<bool>(), any::<bool>()), 0..40),
        ) {
            let areas: Vec<Area> = area_flags
                .iter()
                .enumerate()
                .map(|(i, (active, deleted))| area(&format!("area{i}"), i as i64, *active, *deleted))
                .collect();

            let actions: Vec<Action> = if areas.is_empty() {
                Vec::new()
            } else {
                action_specs
                    .iter()
                    .enumerate()
                    .map(|(i, (idx, active, deleted))| {
                        action(&areas[idx % areas.len()], &format!("action{i}"), i as i64, *active, *deleted)
                    })
                    .collect()
            };

            let matrix = build_matrix(&account(&[], &[]), &areas, &actions);

            let live_areas: Vec<&Area> = areas.iter().filter(|a| a.is_live()).collect();
            prop_assert_eq!(matrix.areas.len(), live_areas.len());

            for grant in &matrix.areas {
                let expected = actions.iter().filter(|a| a.area_id == grant.id && a.is_live()).count();
                prop_assert_eq!(grant.actions.len(), expected);
            }
        }
    }
}
