//! Asset HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::error::AssetError;
use super::queries;
use super::resource;
use super::types::{
    AssetQuery, AssetResponse, AssetRow, CategoryRow, CreateAssetRequest, CreateCategoryRequest,
    CreateDeviceTypeRequest, DeviceTypeRow, UpdateAssetRequest,
};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::permissions::{find_station_view, ActorScope, AssetAction};

fn validate<T: Validate>(body: &T) -> Result<(), AssetError> {
    body.validate()
        .map_err(|e| AssetError::Validation(e.to_string()))
}

/// Load an asset the caller may see. Assets outside the scope are missing.
async fn scoped_asset(
    state: &AppState,
    actor: &ActorScope,
    id: Uuid,
) -> Result<AssetRow, AssetError> {
    let row = queries::find_asset(&state.db, id)
        .await?
        .ok_or(AssetError::NotFound)?;

    if !resource().permits(&actor.scope, row.station_view()) {
        tracing::debug!(asset_id = %id, scope = ?actor.scope, "Asset outside scope");
        return Err(AssetError::NotFound);
    }
    Ok(row)
}

/// Require `station_id` to exist and lie inside the caller's scope.
async fn require_station_in_scope(
    state: &AppState,
    actor: &ActorScope,
    station_id: Uuid,
) -> Result<(), AssetError> {
    let station = find_station_view(&state.db, station_id)
        .await?
        .ok_or(AssetError::StationNotFound)?;

    if resource().permits(&actor.scope, Some(station)) {
        Ok(())
    } else {
        tracing::debug!(%station_id, scope = ?actor.scope, "Target station outside scope");
        Err(AssetError::StationOutOfScope)
    }
}

// ============================================================================
// Categories and device types
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/assets/categories",
    tag = "assets",
    responses((status = 200, body = Vec<CategoryRow>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<CategoryRow>>, AssetError> {
    Ok(Json(queries::list_categories(&state.db).await?))
}

#[utoipa::path(
    post,
    path = "/api/assets/categories",
    tag = "assets",
    request_body = CreateCategoryRequest,
    responses((status = 201, body = CategoryRow)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_category(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryRow>), AssetError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row = queries::insert_category(
        &state.db,
        body.name.trim(),
        body.description.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct DeviceTypeQuery {
    pub category_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/assets/device-types",
    tag = "assets",
    params(DeviceTypeQuery),
    responses((status = 200, body = Vec<DeviceTypeRow>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn list_device_types(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<DeviceTypeQuery>,
) -> Result<Json<Vec<DeviceTypeRow>>, AssetError> {
    Ok(Json(
        queries::list_device_types(&state.db, query.category_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/assets/device-types",
    tag = "assets",
    request_body = CreateDeviceTypeRequest,
    responses((status = 201, body = DeviceTypeRow)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_device_type(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<CreateDeviceTypeRequest>,
) -> Result<(StatusCode, Json<DeviceTypeRow>), AssetError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row = queries::insert_device_type(&state.db, body.name.trim(), body.category_id).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

// ============================================================================
// Assets
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "assets",
    params(AssetQuery),
    responses((status = 200, body = Vec<AssetResponse>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn list_assets(
    State(state): State<AppState>,
    actor: ActorScope,
    Query(query): Query<AssetQuery>,
) -> Result<Json<Vec<AssetResponse>>, AssetError> {
    AssetAction::List.authorize(&actor.scope)?;

    let rows = queries::list_assets(&state.db, &resource(), &actor.scope, &query).await?;
    Ok(Json(rows.into_iter().map(AssetResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses((status = 200, body = AssetResponse), (status = 404)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn get_asset(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetResponse>, AssetError> {
    AssetAction::Read.authorize(&actor.scope)?;

    let row = scoped_asset(&state, &actor, id).await?;
    Ok(Json(row.into()))
}

#[utoipa::path(
    post,
    path = "/api/assets",
    tag = "assets",
    request_body = CreateAssetRequest,
    responses((status = 201, body = AssetResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_asset(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<CreateAssetRequest>,
) -> Result<(StatusCode, Json<AssetResponse>), AssetError> {
    AssetAction::Create.authorize(&actor.scope)?;
    validate(&body)?;
    body.check_details().map_err(AssetError::Validation)?;

    if let Some(station_id) = body.current_station_id {
        require_station_in_scope(&state, &actor, station_id).await?;
    }

    let id = queries::insert_asset(&state.db, &body).await?;
    tracing::info!(asset_id = %id, "Asset created");

    let row = queries::find_asset(&state.db, id)
        .await?
        .ok_or(AssetError::NotFound)?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    patch,
    path = "/api/assets/{id}",
    tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses((status = 200, body = AssetResponse), (status = 404)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn update_asset(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAssetRequest>,
) -> Result<Json<AssetResponse>, AssetError> {
    AssetAction::Update.authorize(&actor.scope)?;
    validate(&body)?;

    let current = scoped_asset(&state, &actor, id).await?;

    if let Some(station_id) = body.current_station_id {
        require_station_in_scope(&state, &actor, station_id).await?;
    }

    queries::update_asset(&state.db, id, current.asset_type, &body).await?;

    let row = queries::find_asset(&state.db, id)
        .await?
        .ok_or(AssetError::NotFound)?;
    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "assets",
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses((status = 204), (status = 404)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn delete_asset(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AssetError> {
    AssetAction::Delete.authorize(&actor.scope)?;

    queries::delete_asset(&state.db, id).await?;
    tracing::info!(asset_id = %id, "Asset deleted");

    Ok(StatusCode::NO_CONTENT)
}
