use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    response::Response,
    routing::get,
};

use gatehouse_auth::catalog::{actions, areas};
use gatehouse_auth::{Account, AccountPatch, NewAccount, PermissionMatrix, Requirement, build_matrix, hash_password};
use gatehouse_core::{AccountId, Record};

use crate::app::dto::{AccountListParams, AccountView};
use crate::app::envelope;
use crate::app::errors::{ApiError, Entity};
use crate::app::i18n::Message;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::SessionContext;

const VIEW: Requirement = Requirement::area(areas::ACCOUNTS);
const ADD: Requirement = Requirement::action(areas::ACCOUNTS, actions::ADD_ACCOUNT);
const UPDATE: Requirement = Requirement::action(areas::ACCOUNTS, actions::UPDATE_ACCOUNT);
const DELETE: Requirement = Requirement::action(areas::ACCOUNTS, actions::DELETE_ACCOUNT);

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/:id", get(get_account).patch(update_account).delete(delete_account))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> Response {
    create(&services, &session, body).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<AccountListParams>,
) -> Response {
    list(&services, &session, params).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    fetch(&services, &session, &id).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    body: Result<Json<AccountPatch>, JsonRejection>,
) -> Response {
    update(&services, &session, &id, body).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    delete(&services, &session, &id).await.unwrap_or_else(|e| e.respond(session.locale()))
}

async fn create(
    services: &AppServices,
    session: &SessionContext,
    body: Result<Json<NewAccount>, JsonRejection>,
) -> Result<Response, ApiError> {
    require(session, &ADD)?;
    let Json(body) = body.map_err(|_| ApiError::ValidationFailed(Message::InvalidData))?;
    body.validate()?;

    let password_hash = hash_password(&body.password)?;
    let account = body.into_account(AccountId::new(), password_hash, session.identity().stamp());
    services
        .accounts
        .insert_account(&account)
        .await
        .map_err(|e| ApiError::from_store(e, Entity::Account))?;

    tracing::info!(account_id = %account.id, by = %session.identity().account_id, "account created");
    let view = view_of(services, session, account).await?;
    Ok(envelope::ok(Message::Saved, session.locale(), view))
}

async fn list(services: &AppServices, session: &SessionContext, params: AccountListParams) -> Result<Response, ApiError> {
    require(session, &VIEW)?;

    let page = services
        .accounts
        .list_accounts(&params.into_query())
        .await
        .map_err(|e| ApiError::from_store(e, Entity::Account))?;
    if page.total == 0 {
        return Err(ApiError::NotFound(Message::NoData));
    }

    let catalog = services
        .catalog
        .catalog()
        .await
        .map_err(ApiError::from_catalog_store)?;
    let identity = session.identity();
    let page = page.map(|account| {
        let matrix = build_matrix(&account, &catalog.areas, &catalog.actions);
        AccountView::new(account, matrix, identity)
    });

    Ok(envelope::page(Message::Done, session.locale(), page))
}

async fn fetch(services: &AppServices, session: &SessionContext, id: &str) -> Result<Response, ApiError> {
    require(session, &VIEW)?;
    let account = load(services, session, id).await?;
    let view = view_of(services, session, account).await?;
    Ok(envelope::ok(Message::Done, session.locale(), view))
}

async fn update(
    services: &AppServices,
    session: &SessionContext,
    id: &str,
    body: Result<Json<AccountPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    require(session, &UPDATE)?;
    let Json(patch) = body.map_err(|_| ApiError::ValidationFailed(Message::InvalidData))?;
    patch.validate()?;

    let mut account = load(services, session, id).await?;
    let password_hash = patch.password.as_deref().map(hash_password).transpose()?;
    patch.apply(&mut account, password_hash, session.identity().stamp());

    services
        .accounts
        .save_account(&account)
        .await
        .map_err(|e| ApiError::from_store(e, Entity::Account))?;

    tracing::info!(account_id = %account.id, by = %session.identity().account_id, "account updated");
    let view = view_of(services, session, account).await?;
    Ok(envelope::ok(Message::Updated, session.locale(), view))
}

async fn delete(services: &AppServices, session: &SessionContext, id: &str) -> Result<Response, ApiError> {
    require(session, &DELETE)?;

    let mut account = load(services, session, id).await?;
    account.retire(session.identity().stamp());
    services
        .accounts
        .save_account(&account)
        .await
        .map_err(|e| ApiError::from_store(e, Entity::Account))?;

    tracing::info!(account_id = %account.id, by = %session.identity().account_id, "account retired");
    Ok(envelope::ok(Message::Deleted, session.locale(), serde_json::json!({ "id": account.id })))
}

/// Non-deleted account visible to the caller. Developer accounts are hidden
/// from everyone but developers.
async fn load(services: &AppServices, session: &SessionContext, id: &str) -> Result<Account, ApiError> {
    let id: AccountId = id
        .parse()
        .map_err(|_| ApiError::ValidationFailed(Message::MissingData))?;

    services
        .accounts
        .get_account(id)
        .await
        .map_err(|e| ApiError::from_store(e, Entity::Account))?
        .filter(|account| !account.is_deleted())
        .filter(|account| !account.is_developer || session.identity().is_developer)
        .ok_or(ApiError::NotFound(Message::NoData))
}

async fn view_of(services: &AppServices, session: &SessionContext, account: Account) -> Result<AccountView, ApiError> {
    let catalog = services
        .catalog
        .catalog()
        .await
        .map_err(ApiError::from_catalog_store)?;
    let matrix: PermissionMatrix = build_matrix(&account, &catalog.areas, &catalog.actions);
    Ok(AccountView::new(account, matrix, session.identity()))
}
