use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    response::Response,
    routing::{get, patch},
};

use gatehouse_auth::catalog::{actions, areas};
use gatehouse_auth::{AreaDraft, AreaPatch, Requirement};
use gatehouse_core::{AreaId, Record};
use gatehouse_infra::CascadeOutcome;

use crate::app::dto::{AreaListParams, AreaRetired, AreaView};
use crate::app::envelope;
use crate::app::errors::ApiError;
use crate::app::i18n::Message;
use crate::app::services::AppServices;
use crate::authz::require;
use crate::context::SessionContext;

const VIEW: Requirement = Requirement::area(areas::AREAS_CATALOG);
const ADD: Requirement = Requirement::action(areas::AREAS_CATALOG, actions::ADD_AREA);
const UPDATE: Requirement = Requirement::action(areas::AREAS_CATALOG, actions::UPDATE_AREA);
const DELETE: Requirement = Requirement::action(areas::AREAS_CATALOG, actions::DELETE_AREA);

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/active", get(active_areas))
        .route("/:id", patch(update_area).delete(delete_area))
}

pub async fn create_area(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<AreaDraft>, JsonRejection>,
) -> Response {
    create(&services, &session, body).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn list_areas(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<AreaListParams>,
) -> Response {
    list(&services, &session, params).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn active_areas(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Response {
    active(&services, &session).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn update_area(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    body: Result<Json<AreaPatch>, JsonRejection>,
) -> Response {
    update(&services, &session, &id, body).await.unwrap_or_else(|e| e.respond(session.locale()))
}

pub async fn delete_area(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Response {
    delete(&services, &session, &id).await.unwrap_or_else(|e| e.respond(session.locale()))
}

async fn create(
    services: &AppServices,
    session: &SessionContext,
    body: Result<Json<AreaDraft>, JsonRejection>,
) -> Result<Response, ApiError> {
    require(session, &ADD)?;
    let Json(draft) = body.map_err(|_| ApiError::ValidationFailed(Message::InvalidData))?;
    draft.validate()?;

    let (area, actions) = draft.into_records(session.identity().stamp());
    services
        .catalog
        .create_area(&area, &actions)
        .await
        .map_err(ApiError::from_catalog_store)?;

    tracing::info!(area_id = %area.id, area = %area.name, actions = actions.len(), "area created");
    let view = AreaView::new(area, actions, session.identity());
    Ok(envelope::ok(Message::Saved, session.locale(), view))
}

async fn list(services: &AppServices, session: &SessionContext, params: AreaListParams) -> Result<Response, ApiError> {
    require(session, &VIEW)?;

    let page = services
        .catalog
        .list_areas(&params.into_query())
        .await
        .map_err(ApiError::from_catalog_store)?;
    if page.total == 0 {
        return Err(ApiError::NotFound(Message::NoData));
    }

    let catalog = services.catalog.catalog().await.map_err(ApiError::from_catalog_store)?;
    let identity = session.identity();
    let page = page.map(|area| {
        let actions = catalog.actions_of(area.id);
        AreaView::new(area, actions, identity)
    });

    Ok(envelope::page(Message::Done, session.locale(), page))
}

async fn active(services: &AppServices, session: &SessionContext) -> Result<Response, ApiError> {
    require(session, &VIEW)?;

    let catalog = services.catalog.catalog().await.map_err(ApiError::from_catalog_store)?;
    let identity = session.identity();
    let views: Vec<AreaView> = catalog
        .areas
        .iter()
        .filter(|area| area.is_live())
        .map(|area| {
            let actions = catalog.actions_of(area.id).into_iter().filter(|a| a.is_live()).collect();
            AreaView::new(area.clone(), actions, identity)
        })
        .collect();

    if views.is_empty() {
        return Err(ApiError::NotFound(Message::NoData));
    }
    Ok(envelope::ok(Message::Done, session.locale(), views))
}

async fn update(
    services: &AppServices,
    session: &SessionContext,
    id: &str,
    body: Result<Json<AreaPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    require(session, &UPDATE)?;
    let id = parse_id(id)?;
    let Json(patch) = body.map_err(|_| ApiError::ValidationFailed(Message::InvalidData))?;
    patch.validate()?;

    let (area, actions) = services
        .catalog
        .update_area(id, &patch, &session.identity().stamp())
        .await
        .map_err(ApiError::from_catalog_store)?;

    tracing::info!(area_id = %area.id, by = %session.identity().account_id, "area updated");
    let view = AreaView::new(area, actions, session.identity());
    Ok(envelope::ok(Message::Updated, session.locale(), view))
}

async fn delete(services: &AppServices, session: &SessionContext, id: &str) -> Result<Response, ApiError> {
    require(session, &DELETE)?;
    let id = parse_id(id)?;

    match services.cascade.retire(id, &session.identity().stamp()).await? {
        CascadeOutcome::Deleted { actions_retired } => Ok(envelope::ok(
            Message::Deleted,
            session.locale(),
            AreaRetired { id, actions_retired },
        )),
        CascadeOutcome::NotFound => Err(ApiError::NotFound(Message::NoData)),
    }
}

fn parse_id(id: &str) -> Result<AreaId, ApiError> {
    id.parse().map_err(|_| ApiError::ValidationFailed(Message::MissingData))
}
