//! Area ("route") and action ("permission") catalog.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use gatehouse_core::{ActionId, AreaId, AuditStamp, AuditTrail, DomainError, Labels, Record};

pub const MIN_CATALOG_NAME_LEN: usize = 3;
pub const MIN_LABEL_LEN: usize = 3;

/// Area names declared by guarded routes.
pub mod areas {
    pub const ACCOUNTS: &str = "accounts";
    pub const AREAS_CATALOG: &str = "areas-catalog";
    pub const ACTIONS_CATALOG: &str = "actions-catalog";
    pub const BRANCHES: &str = "branches";
    pub const GOVERNORATES: &str = "governorates";
    pub const CITIES: &str = "cities";
    pub const TASK_ITEMS: &str = "task-items";
}

/// Action names declared by guarded mutating routes.
pub mod actions {
    pub const ADD_ACCOUNT: &str = "addAccount";
    pub const UPDATE_ACCOUNT: &str = "updateAccount";
    pub const DELETE_ACCOUNT: &str = "deleteAccount";
    pub const EXPORT_ACCOUNTS: &str = "exportAccounts";

    pub const ADD_AREA: &str = "addArea";
    pub const UPDATE_AREA: &str = "updateArea";
    pub const DELETE_AREA: &str = "deleteArea";

    pub const ADD_ACTION: &str = "addAction";
    pub const UPDATE_ACTION: &str = "updateAction";
    pub const DELETE_ACTION: &str = "deleteAction";

    pub const ADD_BRANCH: &str = "addBranch";
    pub const UPDATE_BRANCH: &str = "updateBranch";
    pub const DELETE_BRANCH: &str = "deleteBranch";
    pub const REPORT_BRANCHES: &str = "reportBranches";

    pub const ADD_GOVERNORATE: &str = "addGovernorate";
    pub const UPDATE_GOVERNORATE: &str = "updateGovernorate";
    pub const DELETE_GOVERNORATE: &str = "deleteGovernorate";

    pub const ADD_CITY: &str = "addCity";
    pub const UPDATE_CITY: &str = "updateCity";
    pub const DELETE_CITY: &str = "deleteCity";

    pub const ADD_TASK_ITEM: &str = "addTaskItem";
    pub const UPDATE_TASK_ITEM: &str = "updateTaskItem";
    pub const DELETE_TASK_ITEM: &str = "deleteTaskItem";
    pub const EXPORT_TASK_ITEMS: &str = "exportTaskItems";
}

/// One area of the built-in catalog with its actions: `(name, en, ar)`.
pub struct CatalogEntry {
    pub area: (&'static str, &'static str, &'static str),
    pub actions: &'static [(&'static str, &'static str, &'static str)],
}

/// The built-in catalog, in creation order.
pub const BUILTIN_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        area: (areas::ACCOUNTS, "Accounts", "الحسابات"),
        actions: &[
            (actions::ADD_ACCOUNT, "Add Account", "إضافة حساب"),
            (actions::UPDATE_ACCOUNT, "Update Account", "تعديل حساب"),
            (actions::DELETE_ACCOUNT, "Delete Account", "حذف حساب"),
            (actions::EXPORT_ACCOUNTS, "Export Accounts", "تصدير الحسابات"),
        ],
    },
    CatalogEntry {
        area: (areas::AREAS_CATALOG, "Areas", "الصفحات"),
        actions: &[
            (actions::ADD_AREA, "Add Area", "إضافة صفحة"),
            (actions::UPDATE_AREA, "Update Area", "تعديل صفحة"),
            (actions::DELETE_AREA, "Delete Area", "حذف صفحة"),
        ],
    },
    CatalogEntry {
        area: (areas::ACTIONS_CATALOG, "Actions", "الصلاحيات"),
        actions: &[
            (actions::ADD_ACTION, "Add Action", "إضافة صلاحية"),
            (actions::UPDATE_ACTION, "Update Action", "تعديل صلاحية"),
            (actions::DELETE_ACTION, "Delete Action", "حذف صلاحية"),
        ],
    },
    CatalogEntry {
        area: (areas::BRANCHES, "Branches", "الفروع"),
        actions: &[
            (actions::ADD_BRANCH, "Add Branch", "إضافة فرع"),
            (actions::UPDATE_BRANCH, "Update Branch", "تعديل فرع"),
            (actions::DELETE_BRANCH, "Delete Branch", "حذف فرع"),
            (actions::REPORT_BRANCHES, "Branches Report", "تقرير الفروع"),
        ],
    },
    CatalogEntry {
        area: (areas::GOVERNORATES, "Governorates", "المحافظات"),
        actions: &[
            (actions::ADD_GOVERNORATE, "Add Governorate", "إضافة محافظة"),
            (actions::UPDATE_GOVERNORATE, "Update Governorate", "تعديل محافظة"),
            (actions::DELETE_GOVERNORATE, "Delete Governorate", "حذف محافظة"),
        ],
    },
    CatalogEntry {
        area: (areas::CITIES, "Cities", "المدن"),
        actions: &[
            (actions::ADD_CITY, "Add City", "إضافة مدينة"),
            (actions::UPDATE_CITY, "Update City", "تعديل مدينة"),
            (actions::DELETE_CITY, "Delete City", "حذف مدينة"),
        ],
    },
    CatalogEntry {
        area: (areas::TASK_ITEMS, "Task Items", "بنود المهام"),
        actions: &[
            (actions::ADD_TASK_ITEM, "Add Task Item", "إضافة بند"),
            (actions::UPDATE_TASK_ITEM, "Update Task Item", "تعديل بند"),
            (actions::DELETE_TASK_ITEM, "Delete Task Item", "حذف بند"),
            (actions::EXPORT_TASK_ITEMS, "Export Task Items", "تصدير البنود"),
        ],
    },
];

/// Whether guarded routes declare `name` as an area.
pub fn is_builtin_area(name: &str) -> bool {
    BUILTIN_CATALOG.iter().any(|e| e.area.0 == name)
}

/// Whether guarded routes declare `name` as an action.
pub fn is_builtin_action(name: &str) -> bool {
    BUILTIN_CATALOG
        .iter()
        .flat_map(|e| e.actions.iter())
        .any(|a| a.0 == name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A functional area that accounts are granted access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub labels: Labels,
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub audit: AuditTrail,
}

/// A fine-grained action scoped to one area.
///
/// # Invariants
/// - While the action is live its owning area is not deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    pub area_id: AreaId,
    pub name: String,
    pub labels: Labels,
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub audit: AuditTrail,
}

impl Area {
    pub fn retire(&mut self, stamp: AuditStamp) {
        self.active = false;
        self.deleted = true;
        self.audit.removed = Some(stamp);
    }
}

impl Action {
    pub fn new(area_id: AreaId, draft: ActionDraft, stamp: AuditStamp) -> Self {
        Self {
            id: draft.id.unwrap_or_default(),
            area_id,
            name: draft.name.trim().to_string(),
            labels: trimmed(&draft.labels),
            active: draft.active.unwrap_or(true),
            deleted: false,
            created_at: stamp.at,
            audit: AuditTrail::added(stamp),
        }
    }

    pub fn retire(&mut self, stamp: AuditStamp) {
        self.active = false;
        self.deleted = true;
        self.audit.removed = Some(stamp);
    }
}

impl Record for Area {
    type Id = AreaId;

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

impl Record for Action {
    type Id = ActionId;

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

/// Payload for creating an area, optionally with its actions.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaDraft {
    pub name: String,
    #[serde(flatten)]
    pub labels: Labels,
    #[serde(default)]
    pub actions: Vec<ActionDraft>,
}

/// An action inside an area payload.
///
/// With `id` set it updates that action (area updates only); without it the
/// action is matched by name within the area, then created.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDraft {
    #[serde(default)]
    pub id: Option<ActionId>,
    pub name: String,
    #[serde(flatten)]
    pub labels: Labels,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Partial update of an area and upsert of its actions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaPatch {
    pub name: Option<String>,
    pub en: Option<String>,
    pub ar: Option<String>,
    pub active: Option<bool>,
    #[serde(default)]
    pub actions: Vec<ActionDraft>,
}

impl AreaDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        check_catalog_name(&self.name, "areaName")?;
        check_labels(&self.labels)?;
        check_action_drafts(&self.actions)
    }

    /// Build the area and its actions, all stamped with `stamp`.
    pub fn into_records(self, stamp: AuditStamp) -> (Area, Vec<Action>) {
        let area = Area {
            id: AreaId::new(),
            name: self.name.trim().to_string(),
            labels: trimmed(&self.labels),
            active: true,
            deleted: false,
            created_at: stamp.at,
            audit: AuditTrail::added(stamp.clone()),
        };
        let actions = self
            .actions
            .into_iter()
            .map(|draft| Action::new(area.id, ActionDraft { id: None, ..draft }, stamp.clone()))
            .collect();
        (area, actions)
    }
}

impl AreaPatch {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            check_catalog_name(name, "areaName")?;
        }
        for label in [&self.en, &self.ar].into_iter().flatten() {
            check_label(label)?;
        }
        check_action_drafts(&self.actions)
    }

    /// Built-in area names are fixed.
    pub fn check_rename(&self, area: &Area) -> Result<(), DomainError> {
        match &self.name {
            Some(name) if name.trim() != area.name && is_builtin_area(&area.name) => {
                Err(DomainError::validation("areaName"))
            }
            _ => Ok(()),
        }
    }

    /// Apply the area's own fields. Actions are upserted by the store.
    pub fn apply(&self, area: &mut Area, stamp: AuditStamp) {
        if let Some(name) = &self.name {
            area.name = name.trim().to_string();
        }
        if let Some(en) = &self.en {
            area.labels.en = en.trim().to_string();
        }
        if let Some(ar) = &self.ar {
            area.labels.ar = ar.trim().to_string();
        }
        if let Some(active) = self.active {
            area.active = active;
        }
        area.audit.last_updated = Some(stamp);
    }
}

impl ActionDraft {
    /// Built-in action names are fixed.
    pub fn check_rename(&self, action: &Action) -> Result<(), DomainError> {
        if self.name.trim() != action.name && is_builtin_action(&action.name) {
            return Err(DomainError::validation("actionName"));
        }
        Ok(())
    }

    /// Update an existing action in place. Returns the previous name.
    pub fn apply(&self, action: &mut Action, stamp: AuditStamp) -> String {
        let previous = std::mem::replace(&mut action.name, self.name.trim().to_string());
        action.labels = trimmed(&self.labels);
        if let Some(active) = self.active {
            action.active = active;
        }
        action.audit.last_updated = Some(stamp);
        previous
    }
}

fn trimmed(labels: &Labels) -> Labels {
    Labels::new(labels.en.trim(), labels.ar.trim())
}

fn check_catalog_name(name: &str, field: &str) -> Result<(), DomainError> {
    if name.trim().chars().count() < MIN_CATALOG_NAME_LEN {
        return Err(DomainError::validation(field));
    }
    Ok(())
}

fn check_label(label: &str) -> Result<(), DomainError> {
    if label.trim().chars().count() < MIN_LABEL_LEN {
        return Err(DomainError::validation("labels"));
    }
    Ok(())
}

fn check_labels(labels: &Labels) -> Result<(), DomainError> {
    check_label(&labels.en)?;
    check_label(&labels.ar)
}

fn check_action_drafts(drafts: &[ActionDraft]) -> Result<(), DomainError> {
    let mut seen = std::collections::HashSet::new();
    for draft in drafts {
        check_catalog_name(&draft.name, "actionName")?;
        check_labels(&draft.labels)?;
        if !seen.insert(draft.name.trim()) {
            return Err(DomainError::duplicate(draft.name.trim()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::AccountId;
    use std::collections::HashSet;

    fn stamp() -> AuditStamp {
        AuditStamp::new(AccountId::new(), Utc::now(), Some("10.0.0.1".to_string()))
    }

    fn draft(name: &str) -> ActionDraft {
        ActionDraft {
            id: None,
            name: name.to_string(),
            labels: Labels::new("Label", "تسمية"),
            active: None,
        }
    }

    #[test]
    fn builtin_catalog_names_are_unique() {
        let area_names: HashSet<_> = BUILTIN_CATALOG.iter().map(|e| e.area.0).collect();
        assert_eq!(area_names.len(), BUILTIN_CATALOG.len());

        let action_names: Vec<_> = BUILTIN_CATALOG.iter().flat_map(|e| e.actions.iter().map(|a| a.0)).collect();
        let unique: HashSet<_> = action_names.iter().collect();
        assert_eq!(unique.len(), action_names.len());
    }

    #[test]
    fn draft_builds_area_with_scoped_actions() {
        let area_draft = AreaDraft {
            name: " branches ".to_string(),
            labels: Labels::new("Branches", "الفروع"),
            actions: vec![draft("addBranch"), draft("deleteBranch")],
        };
        area_draft.validate().unwrap();

        let (area, actions) = area_draft.into_records(stamp());
        assert_eq!(area.name, "branches");
        assert!(area.is_live());
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.area_id == area.id && a.is_live()));
    }

    #[test]
    fn rejects_short_names_and_repeated_actions() {
        let short = AreaDraft {
            name: "ab".to_string(),
            labels: Labels::new("Branches", "الفروع"),
            actions: vec![],
        };
        assert_eq!(short.validate(), Err(DomainError::validation("areaName")));

        let repeated = AreaDraft {
            name: "branches".to_string(),
            labels: Labels::new("Branches", "الفروع"),
            actions: vec![draft("addBranch"), draft("addBranch")],
        };
        assert_eq!(repeated.validate(), Err(DomainError::duplicate("addBranch")));
    }

    #[test]
    fn builtin_names_cannot_be_renamed() {
        let builtin = AreaDraft {
            name: areas::AREAS_CATALOG.to_string(),
            labels: Labels::new("Areas", "الصفحات"),
            actions: vec![draft(actions::UPDATE_AREA)],
        };
        let (area, mut built_actions) = builtin.into_records(stamp());

        let rename = AreaPatch {
            name: Some("areas-renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(rename.check_rename(&area), Err(DomainError::validation("areaName")));

        let relabel = AreaPatch {
            name: Some(format!(" {} ", areas::AREAS_CATALOG)),
            en: Some("Pages".to_string()),
            ..Default::default()
        };
        assert_eq!(relabel.check_rename(&area), Ok(()));

        let action = built_actions.remove(0);
        assert_eq!(
            draft("editArea").check_rename(&action),
            Err(DomainError::validation("actionName"))
        );
        assert_eq!(draft(actions::UPDATE_AREA).check_rename(&action), Ok(()));
    }

    #[test]
    fn custom_names_can_be_renamed() {
        let custom = AreaDraft {
            name: "warehouses".to_string(),
            labels: Labels::new("Warehouses", "المخازن"),
            actions: vec![draft("addWarehouse")],
        };
        let (area, built_actions) = custom.into_records(stamp());

        let rename = AreaPatch {
            name: Some("stores".to_string()),
            ..Default::default()
        };
        assert_eq!(rename.check_rename(&area), Ok(()));
        assert_eq!(draft("addStore").check_rename(&built_actions[0]), Ok(()));
        assert!(is_builtin_area(areas::ACCOUNTS));
        assert!(!is_builtin_action("addWarehouse"));
    }

    #[test]
    fn deserializes_flat_labels() {
        let json = r#"{"name":"cities","en":"Cities","ar":"المدن","actions":[{"name":"addCity","en":"Add City","ar":"إضافة مدينة"}]}"#;
        let parsed: AreaDraft = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.labels.en, "Cities");
        assert_eq!(parsed.actions[0].name, "addCity");
    }
}
