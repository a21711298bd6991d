//! Hierarchy HTTP Handlers
//!
//! Reads are open to every authenticated user. Mutations need the
//! unrestricted scope.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::error::HierarchyError;
use super::queries;
use super::types::{
    CodeCheckResponse, CreateRegionRequest, CreateSubRegionRequest, RegionResponse,
    StationQuery, StationRequest, StationResponse, SubRegionQuery, SubRegionResponse,
    UpdateRegionRequest, UpdateSubRegionRequest,
};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::permissions::ActorScope;

fn validate<T: Validate>(body: &T) -> Result<(), HierarchyError> {
    body.validate()
        .map_err(|e| HierarchyError::Validation(e.to_string()))
}

async fn station_response(state: &AppState, id: Uuid) -> Result<StationResponse, HierarchyError> {
    queries::find_station_row(&state.db, id)
        .await?
        .map(StationResponse::from)
        .ok_or(HierarchyError::StationNotFound)
}

// ============================================================================
// Regions
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/locations/regions",
    tag = "locations",
    responses((status = 200, body = Vec<RegionResponse>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn list_regions(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<RegionResponse>>, HierarchyError> {
    let rows = queries::list_regions(&state.db).await?;
    Ok(Json(rows.into_iter().map(RegionResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/locations/regions",
    tag = "locations",
    request_body = CreateRegionRequest,
    responses((status = 201, body = RegionResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_region(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<RegionResponse>), HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row = queries::insert_region(&state.db, body.name.trim(), body.suffix.as_ref()).await?;
    tracing::info!(region_id = %row.id, "Region created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    patch,
    path = "/api/locations/regions/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Region ID")),
    request_body = UpdateRegionRequest,
    responses((status = 200, body = RegionResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn update_region(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRegionRequest>,
) -> Result<Json<RegionResponse>, HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row = queries::update_region(
        &state.db,
        id,
        body.name.as_deref().map(str::trim),
        body.suffix.as_ref(),
    )
    .await?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/api/locations/regions/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Region ID")),
    responses((status = 204)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn delete_region(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HierarchyError> {
    actor.require_unrestricted()?;
    queries::delete_region(&state.db, id).await?;
    tracing::info!(region_id = %id, "Region deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sub-regions
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/locations/subregions",
    tag = "locations",
    params(SubRegionQuery),
    responses((status = 200, body = Vec<SubRegionResponse>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn list_subregions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SubRegionQuery>,
) -> Result<Json<Vec<SubRegionResponse>>, HierarchyError> {
    let rows = queries::list_subregions(&state.db, query.region_id).await?;
    Ok(Json(rows.into_iter().map(SubRegionResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/locations/subregions",
    tag = "locations",
    request_body = CreateSubRegionRequest,
    responses((status = 201, body = SubRegionResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_subregion(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<CreateSubRegionRequest>,
) -> Result<(StatusCode, Json<SubRegionResponse>), HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row =
        queries::insert_subregion(&state.db, body.name.trim(), &body.suffix, body.region_id)
            .await?;
    tracing::info!(subregion_id = %row.id, "Sub-region created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    patch,
    path = "/api/locations/subregions/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Sub-region ID")),
    request_body = UpdateSubRegionRequest,
    responses((status = 200, body = SubRegionResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn update_subregion(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSubRegionRequest>,
) -> Result<Json<SubRegionResponse>, HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let row = queries::update_subregion(
        &state.db,
        id,
        body.name.as_deref().map(str::trim),
        body.suffix.as_ref(),
    )
    .await?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/api/locations/subregions/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Sub-region ID")),
    responses((status = 204)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn delete_subregion(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HierarchyError> {
    actor.require_unrestricted()?;
    queries::delete_subregion(&state.db, id).await?;
    tracing::info!(subregion_id = %id, "Sub-region deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Stations
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/locations/stations",
    tag = "locations",
    params(StationQuery),
    responses((status = 200, body = Vec<StationResponse>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn list_stations(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<StationQuery>,
) -> Result<Json<Vec<StationResponse>>, HierarchyError> {
    let rows = queries::list_stations(&state.db, &query).await?;
    Ok(Json(rows.into_iter().map(StationResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/locations/stations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Station ID")),
    responses((status = 200, body = StationResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn get_station(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StationResponse>, HierarchyError> {
    Ok(Json(station_response(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/locations/stations",
    tag = "locations",
    request_body = StationRequest,
    responses(
        (status = 201, body = StationResponse),
        (status = 400, description = "Tier rules violated"),
        (status = 409, description = "Code or address already taken"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn create_station(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<StationRequest>,
) -> Result<(StatusCode, Json<StationResponse>), HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let station = queries::save_station(&state.db, None, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(station_response(&state, station.id).await?),
    ))
}

#[utoipa::path(
    put,
    path = "/api/locations/stations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Station ID")),
    request_body = StationRequest,
    responses((status = 200, body = StationResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn update_station(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
    Json(body): Json<StationRequest>,
) -> Result<Json<StationResponse>, HierarchyError> {
    actor.require_unrestricted()?;
    validate(&body)?;

    let station = queries::save_station(&state.db, Some(id), &body).await?;

    Ok(Json(station_response(&state, station.id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/locations/stations/{id}",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Station ID")),
    responses((status = 204)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn delete_station(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HierarchyError> {
    actor.require_unrestricted()?;
    queries::delete_station(&state.db, id).await?;
    tracing::info!(station_id = %id, "Station deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Compare a station's stored code with one re-derived from its parents.
#[utoipa::path(
    get,
    path = "/api/locations/stations/{id}/code",
    tag = "locations",
    params(("id" = Uuid, Path, description = "Station ID")),
    responses((status = 200, body = CodeCheckResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, _auth))]
pub async fn check_station_code(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CodeCheckResponse>, HierarchyError> {
    let (station, generated) = queries::regenerate_station_code(&state.db, id).await?;

    let consistent = station.code == generated.code;
    if !consistent {
        tracing::warn!(station_id = %id, stored = %station.code, derived = %generated.code, "Station code drifted from its parents");
    }

    Ok(Json(CodeCheckResponse {
        station_id: station.id,
        stored: station.code.to_string(),
        derived: generated.code.to_string(),
        consistent,
    }))
}
