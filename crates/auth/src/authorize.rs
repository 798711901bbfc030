use std::borrow::Cow;

use thiserror::Error;

use crate::account::Account;
use crate::identity::IdentityContext;

/// What a guarded route needs: one area, plus one action for mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub area: Cow<'static, str>,
    pub action: Option<Cow<'static, str>>,
}

impl Requirement {
    /// Area access only (read routes).
    pub const fn area(area: &'static str) -> Self {
        Self {
            area: Cow::Borrowed(area),
            action: None,
        }
    }

    /// Area access plus one action (mutating routes).
    pub const fn action(area: &'static str, action: &'static str) -> Self {
        Self {
            area: Cow::Borrowed(area),
            action: Some(Cow::Borrowed(action)),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    /// The loaded account is not the session's principal.
    #[error("identity does not match account")]
    IdentityMismatch,

    #[error("area '{0}' not granted")]
    RouteForbidden(String),

    #[error("action '{0}' not granted")]
    PermissionForbidden(String),
}

/// May `account` reach `area`?
pub fn route_check(account: &Account, area: &str) -> bool {
    account.areas_granted.contains(area)
}

/// May `account` perform `action`?
pub fn permission_check(account: &Account, action: &str) -> bool {
    account.actions_granted.contains(action)
}

/// Check `requirement` for the session principal.
///
/// - No IO
/// - No wildcard: `is_admin` does not bypass grants
/// - Short-circuits on the first failing check
pub fn authorize(identity: &IdentityContext, account: &Account, requirement: &Requirement) -> Result<(), AccessDenied> {
    if identity.account_id != account.id {
        return Err(AccessDenied::IdentityMismatch);
    }

    if !route_check(account, &requirement.area) {
        return Err(AccessDenied::RouteForbidden(requirement.area.to_string()));
    }

    if let Some(action) = &requirement.action {
        if !permission_check(account, action) {
            return Err(AccessDenied::PermissionForbidden(action.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::Utc;
    use gatehouse_core::{AccountId, AuditTrail, Locale};

    use crate::catalog::{actions, areas};
    use crate::client::ClientMetadata;

    fn account(areas: &[&str], actions: &[&str], is_admin: bool) -> Account {
        Account {
            id: AccountId::new(),
            name: "clerk".to_string(),
            mobile: "01000000003".to_string(),
            email: "clerk@example.com".to_string(),
            password_hash: String::new(),
            language: Locale::En,
            branch_id: None,
            areas_granted: areas.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            actions_granted: actions.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            active: true,
            deleted: false,
            is_admin,
            is_developer: false,
            audit: AuditTrail::default(),
        }
    }

    fn identity_for(account: &Account) -> IdentityContext {
        IdentityContext {
            account_id: account.id,
            display_name: account.name.clone(),
            is_admin: account.is_admin,
            is_developer: false,
            client: ClientMetadata::default(),
            locale: Locale::En,
            at: Utc::now(),
        }
    }

    #[test]
    fn accounts_scenario() {
        let clerk = account(&[areas::ACCOUNTS], &[actions::ADD_ACCOUNT], false);
        let identity = identity_for(&clerk);

        assert_eq!(authorize(&identity, &clerk, &Requirement::area(areas::ACCOUNTS)), Ok(()));
        assert_eq!(
            authorize(&identity, &clerk, &Requirement::action(areas::ACCOUNTS, actions::ADD_ACCOUNT)),
            Ok(())
        );
        assert_eq!(
            authorize(&identity, &clerk, &Requirement::action(areas::ACCOUNTS, actions::DELETE_ACCOUNT)),
            Err(AccessDenied::PermissionForbidden(actions::DELETE_ACCOUNT.to_string()))
        );
        assert_eq!(
            authorize(&identity, &clerk, &Requirement::area(areas::BRANCHES)),
            Err(AccessDenied::RouteForbidden(areas::BRANCHES.to_string()))
        );
    }

    #[test]
    fn route_failure_short_circuits_permission_check() {
        // Holds the action but not its area.
        let clerk = account(&[], &[actions::ADD_BRANCH], false);
        let identity = identity_for(&clerk);

        assert_eq!(
            authorize(&identity, &clerk, &Requirement::action(areas::BRANCHES, actions::ADD_BRANCH)),
            Err(AccessDenied::RouteForbidden(areas::BRANCHES.to_string()))
        );
    }

    #[test]
    fn admin_flag_is_not_a_bypass() {
        let admin = account(&[], &[], true);
        let identity = identity_for(&admin);

        assert!(matches!(
            authorize(&identity, &admin, &Requirement::area(areas::ACCOUNTS)),
            Err(AccessDenied::RouteForbidden(_))
        ));
    }

    #[test]
    fn identity_must_match_account() {
        let clerk = account(&[areas::ACCOUNTS], &[], false);
        let other = account(&[areas::ACCOUNTS], &[], false);

        assert_eq!(
            authorize(&identity_for(&other), &clerk, &Requirement::area(areas::ACCOUNTS)),
            Err(AccessDenied::IdentityMismatch)
        );
    }

    #[test]
    fn revoking_area_flips_route_check() {
        let mut clerk = account(&[areas::ACCOUNTS], &[], false);
        assert!(route_check(&clerk, areas::ACCOUNTS));

        clerk.areas_granted.remove(areas::ACCOUNTS);
        assert!(!route_check(&clerk, areas::ACCOUNTS));
    }
}
