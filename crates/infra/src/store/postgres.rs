//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx error | SQLSTATE | StoreError |
//! |------------|----------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` (payload: violated index) |
//! | Database (serialization / deadlock / connection) | `40xxx`, `08xxx`, `57P01` | `Unavailable` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | anything else | N/A | `Backend` |
//!
//! Uniqueness among live rows is enforced by the partial unique indexes in
//! `migrations/0001_init.sql`, so concurrent creates race inside Postgres and
//! exactly one wins.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use gatehouse_auth::{Account, AccountDirectory, Action, ActionDraft, Area, AreaPatch, DirectoryError};
use gatehouse_core::{AccountId, ActionId, AreaId, AuditStamp, AuditTrail, BranchId, Labels};

use super::{AccountQuery, AccountStore, AreaQuery, CatalogSnapshot, CatalogStore, Page, RetireOutcome, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const ACCOUNT_COLUMNS: &str = "id, name, mobile, email, password_hash, language, branch_id, areas_granted, \
     actions_granted, active, deleted, is_admin, is_developer, audit";
const AREA_COLUMNS: &str = "id, name, label_en, label_ar, active, deleted, created_at, audit";
const ACTION_COLUMNS: &str = "id, area_id, name, label_en, label_ar, active, deleted, created_at, audit";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AccountDirectory for PostgresStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        self.get_account(id).await.map_err(|e| DirectoryError(e.to_string()))
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, name, mobile, email, password_hash, language, branch_id,
                areas_granted, actions_granted, active, deleted, is_admin, is_developer, audit
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.mobile)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.language.as_str())
        .bind(account.branch_id.map(uuid::Uuid::from))
        .bind(account.areas_granted.iter().cloned().collect::<Vec<_>>())
        .bind(account.actions_granted.iter().cloned().collect::<Vec<_>>())
        .bind(account.active)
        .bind(account.deleted)
        .bind(account.is_admin)
        .bind(account.is_developer)
        .bind(Json(&account.audit))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn save_account(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                name = $2, mobile = $3, email = $4, password_hash = $5, language = $6,
                branch_id = $7, areas_granted = $8, actions_granted = $9, active = $10,
                deleted = $11, is_admin = $12, is_developer = $13, audit = $14
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.mobile)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.language.as_str())
        .bind(account.branch_id.map(uuid::Uuid::from))
        .bind(account.areas_granted.iter().cloned().collect::<Vec<_>>())
        .bind(account.actions_granted.iter().cloned().collect::<Vec<_>>())
        .bind(account.active)
        .bind(account.deleted)
        .bind(account.is_admin)
        .bind(account.is_developer)
        .bind(Json(&account.audit))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_account", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;

        row.map(|row| decode::<AccountRow>(&row).map(|r| r.0)).transpose()
    }

    #[instrument(skip(self, login), err)]
    async fn find_login(&self, login: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE active = TRUE AND deleted = FALSE AND (name = $1 OR email = $1 OR mobile = $1) \
             ORDER BY id LIMIT 1"
        ))
        .bind(login)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_login", e))?;

        row.map(|row| decode::<AccountRow>(&row).map(|r| r.0)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_accounts(&self, query: &AccountQuery) -> Result<Page<Account>, StoreError> {
        const FILTER: &str = "deleted = FALSE AND is_developer = FALSE \
             AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%') \
             AND ($3::text IS NULL OR mobile ILIKE '%' || $3 || '%')";
        let request = query.page.normalized();

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) AS total FROM accounts WHERE {FILTER}"))
            .bind(query.name.as_deref())
            .bind(query.email.as_deref())
            .bind(query.mobile.as_deref())
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_accounts", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {FILTER} ORDER BY id LIMIT $4 OFFSET $5"
        ))
        .bind(query.name.as_deref())
        .bind(query.email.as_deref())
        .bind(query.mobile.as_deref())
        .bind(i64::from(request.limit))
        .bind(request.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_accounts", e))?;

        let items = rows
            .iter()
            .map(|row| decode::<AccountRow>(row).map(|r| r.0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
            request,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CatalogStore for PostgresStore {
    #[instrument(skip(self, area, actions), fields(area_id = %area.id, area_name = %area.name), err)]
    async fn create_area(&self, area: &Area, actions: &[Action]) -> Result<(), StoreError> {
        let mut tx = self.begin().await?;

        insert_area(&mut tx, area).await?;
        for action in actions {
            insert_action(&mut tx, action).await?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), fields(area_id = %id), err)]
    async fn get_area(&self, id: AreaId) -> Result<Option<Area>, StoreError> {
        let row = sqlx::query(&format!("SELECT {AREA_COLUMNS} FROM areas WHERE id = $1 AND deleted = FALSE"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_area", e))?;

        row.map(|row| decode::<AreaRow>(&row).map(|r| r.0)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_areas(&self, query: &AreaQuery) -> Result<Page<Area>, StoreError> {
        const FILTER: &str = "deleted = FALSE \
             AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR label_en ILIKE '%' || $2 || '%') \
             AND ($3::text IS NULL OR label_ar ILIKE '%' || $3 || '%')";
        let request = query.page.normalized();

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) AS total FROM areas WHERE {FILTER}"))
            .bind(query.name.as_deref())
            .bind(query.en.as_deref())
            .bind(query.ar.as_deref())
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_areas", e))?;

        let rows = sqlx::query(&format!(
            "SELECT {AREA_COLUMNS} FROM areas WHERE {FILTER} ORDER BY created_at, id LIMIT $4 OFFSET $5"
        ))
        .bind(query.name.as_deref())
        .bind(query.en.as_deref())
        .bind(query.ar.as_deref())
        .bind(i64::from(request.limit))
        .bind(request.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_areas", e))?;

        let items = rows
            .iter()
            .map(|row| decode::<AreaRow>(row).map(|r| r.0))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
            request,
        })
    }

    #[instrument(skip(self), err)]
    async fn catalog(&self) -> Result<CatalogSnapshot, StoreError> {
        // One snapshot so areas and actions agree with each other.
        let mut tx = self.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let area_rows = sqlx::query(&format!(
            "SELECT {AREA_COLUMNS} FROM areas WHERE deleted = FALSE ORDER BY created_at, id"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("catalog_areas", e))?;

        let action_rows = sqlx::query(&format!(
            "SELECT {ACTION_COLUMNS} FROM actions WHERE deleted = FALSE ORDER BY created_at, id"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("catalog_actions", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(CatalogSnapshot {
            areas: area_rows
                .iter()
                .map(|row| decode::<AreaRow>(row).map(|r| r.0))
                .collect::<Result<_, _>>()?,
            actions: action_rows
                .iter()
                .map(|row| decode::<ActionRow>(row).map(|r| r.0))
                .collect::<Result<_, _>>()?,
        })
    }

    #[instrument(skip(self, patch, stamp), fields(area_id = %id), err)]
    async fn update_area(&self, id: AreaId, patch: &AreaPatch, stamp: &AuditStamp) -> Result<(Area, Vec<Action>), StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {AREA_COLUMNS} FROM areas WHERE id = $1 AND deleted = FALSE FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_area", e))?;

        let Some(row) = row else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        };
        let mut area = decode::<AreaRow>(&row)?.0;
        patch.check_rename(&area)?;
        let previous_name = area.name.clone();

        patch.apply(&mut area, stamp.clone());
        sqlx::query(
            "UPDATE areas SET name = $2, label_en = $3, label_ar = $4, active = $5, audit = $6 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&area.name)
        .bind(&area.labels.en)
        .bind(&area.labels.ar)
        .bind(area.active)
        .bind(Json(&area.audit))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_area", e))?;

        for draft in &patch.actions {
            upsert_action(&mut tx, id, draft, stamp).await?;
        }

        if !area.active {
            sqlx::query("UPDATE actions SET active = FALSE WHERE area_id = $1 AND deleted = FALSE")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("deactivate_actions", e))?;
        }

        if previous_name != area.name {
            rename_grants(&mut tx, "areas_granted", &previous_name, &area.name).await?;
        }

        let action_rows = sqlx::query(&format!(
            "SELECT {ACTION_COLUMNS} FROM actions WHERE area_id = $1 AND deleted = FALSE ORDER BY created_at, id"
        ))
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("area_actions", e))?;
        let actions = action_rows
            .iter()
            .map(|row| decode::<ActionRow>(row).map(|r| r.0))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok((area, actions))
    }

    #[instrument(skip(self, stamp), fields(area_id = %id), err)]
    async fn retire_area(&self, id: AreaId, stamp: &AuditStamp) -> Result<RetireOutcome, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query("SELECT deleted FROM areas WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_area", e))?;

        let Some(row) = row else {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(RetireOutcome::Missing);
        };
        let already_deleted: bool = row.try_get("deleted").map_err(|e| map_sqlx_error("decode_area", e))?;

        if !already_deleted {
            sqlx::query(
                r#"
                UPDATE areas
                SET active = FALSE, deleted = TRUE, audit = jsonb_set(audit, '{removed}', $2::jsonb)
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .bind(Json(stamp))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("retire_area", e))?;
        }

        let retired = sqlx::query(
            r#"
            UPDATE actions
            SET active = FALSE, deleted = TRUE, audit = jsonb_set(audit, '{removed}', $2::jsonb)
            WHERE area_id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(stamp))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("retire_actions", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(RetireOutcome::Retired {
            area_newly_retired: !already_deleted,
            actions_retired: retired.rows_affected() as usize,
        })
    }

    #[instrument(skip(self), fields(area_id = %area_id), err)]
    async fn live_action_count(&self, area_id: AreaId) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS live FROM actions WHERE area_id = $1 AND deleted = FALSE")
            .bind(area_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("live"))
            .map_err(|e| map_sqlx_error("live_action_count", e))?;
        Ok(count.max(0) as usize)
    }
}

async fn insert_area(tx: &mut Transaction<'_, Postgres>, area: &Area) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO areas (id, name, label_en, label_ar, active, deleted, created_at, audit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(area.id.as_uuid())
    .bind(&area.name)
    .bind(&area.labels.en)
    .bind(&area.labels.ar)
    .bind(area.active)
    .bind(area.deleted)
    .bind(area.created_at)
    .bind(Json(&area.audit))
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_area", e))?;
    Ok(())
}

async fn insert_action(tx: &mut Transaction<'_, Postgres>, action: &Action) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO actions (id, area_id, name, label_en, label_ar, active, deleted, created_at, audit)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(action.id.as_uuid())
    .bind(action.area_id.as_uuid())
    .bind(&action.name)
    .bind(&action.labels.en)
    .bind(&action.labels.ar)
    .bind(action.active)
    .bind(action.deleted)
    .bind(action.created_at)
    .bind(Json(&action.audit))
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_action", e))?;
    Ok(())
}

/// Update the matching action of `area_id` or create it.
async fn upsert_action(
    tx: &mut Transaction<'_, Postgres>,
    area_id: AreaId,
    draft: &ActionDraft,
    stamp: &AuditStamp,
) -> Result<(), StoreError> {
    let row = match draft.id {
        Some(id) => {
            let row = sqlx::query(&format!(
                "SELECT {ACTION_COLUMNS} FROM actions WHERE id = $1 AND area_id = $2 AND deleted = FALSE FOR UPDATE"
            ))
            .bind(id.as_uuid())
            .bind(area_id.as_uuid())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_action", e))?;
            Some(row.ok_or(StoreError::NotFound)?)
        }
        None => sqlx::query(&format!(
            "SELECT {ACTION_COLUMNS} FROM actions WHERE area_id = $1 AND name = $2 AND deleted = FALSE FOR UPDATE"
        ))
        .bind(area_id.as_uuid())
        .bind(draft.name.trim())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_action", e))?,
    };

    let Some(row) = row else {
        let action = Action::new(area_id, ActionDraft { id: None, ..draft.clone() }, stamp.clone());
        return insert_action(tx, &action).await;
    };

    let mut action = decode::<ActionRow>(&row)?.0;
    draft.check_rename(&action)?;
    let previous = draft.apply(&mut action, stamp.clone());

    sqlx::query("UPDATE actions SET name = $2, label_en = $3, label_ar = $4, active = $5, audit = $6 WHERE id = $1")
        .bind(action.id.as_uuid())
        .bind(&action.name)
        .bind(&action.labels.en)
        .bind(&action.labels.ar)
        .bind(action.active)
        .bind(Json(&action.audit))
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_action", e))?;

    if previous != action.name {
        rename_grants(tx, "actions_granted", &previous, &action.name).await?;
    }
    Ok(())
}

/// Rewrite `from` to `to` in one grant column of every non-deleted account.
async fn rename_grants(
    tx: &mut Transaction<'_, Postgres>,
    column: &'static str,
    from: &str,
    to: &str,
) -> Result<(), StoreError> {
    sqlx::query(&format!(
        "UPDATE accounts \
         SET {column} = ARRAY(SELECT DISTINCT unnest(array_replace({column}, $1::text, $2::text))) \
         WHERE deleted = FALSE AND $1::text = ANY({column})"
    ))
    .bind(from)
    .bind(to)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("rename_grants", e))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(db_err.constraint().unwrap_or("unique key").to_string()),
                Some(code) if code.starts_with("40") || code.starts_with("08") || code == "57P01" => {
                    StoreError::Unavailable(msg)
                }
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("connection failure in {}: {}", operation, err))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> Result<T, StoreError> {
    T::from_row(row).map_err(|e| StoreError::Backend(format!("failed to decode row: {}", e)))
}

// SQLx row types

struct AccountRow(Account);

impl<'r> FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let language: String = row.try_get("language")?;
        let branch_id: Option<uuid::Uuid> = row.try_get("branch_id")?;
        let areas: Vec<String> = row.try_get("areas_granted")?;
        let actions: Vec<String> = row.try_get("actions_granted")?;
        let audit: Json<AuditTrail> = row.try_get("audit")?;

        Ok(AccountRow(Account {
            id: AccountId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            mobile: row.try_get("mobile")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            language: language.parse().unwrap_or_default(),
            branch_id: branch_id.map(BranchId::from_uuid),
            areas_granted: areas.into_iter().collect(),
            actions_granted: actions.into_iter().collect(),
            active: row.try_get("active")?,
            deleted: row.try_get("deleted")?,
            is_admin: row.try_get("is_admin")?,
            is_developer: row.try_get("is_developer")?,
            audit: audit.0,
        }))
    }
}

struct AreaRow(Area);

impl<'r> FromRow<'r, PgRow> for AreaRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let audit: Json<AuditTrail> = row.try_get("audit")?;
        Ok(AreaRow(Area {
            id: AreaId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            labels: Labels::new(row.try_get::<String, _>("label_en")?, row.try_get::<String, _>("label_ar")?),
            active: row.try_get("active")?,
            deleted: row.try_get("deleted")?,
            created_at: row.try_get("created_at")?,
            audit: audit.0,
        }))
    }
}

struct ActionRow(Action);

impl<'r> FromRow<'r, PgRow> for ActionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let audit: Json<AuditTrail> = row.try_get("audit")?;
        Ok(ActionRow(Action {
            id: ActionId::from_uuid(row.try_get("id")?),
            area_id: AreaId::from_uuid(row.try_get("area_id")?),
            name: row.try_get("name")?,
            labels: Labels::new(row.try_get::<String, _>("label_en")?, row.try_get::<String, _>("label_ar")?),
            active: row.try_get("active")?,
            deleted: row.try_get("deleted")?,
            created_at: row.try_get("created_at")?,
            audit: audit.0,
        }))
    }
}
