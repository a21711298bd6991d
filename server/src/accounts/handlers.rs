//! Account HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::error::AccountError;
use super::queries;
use super::resource;
use super::types::{ProfileRequest, UserResponse};
use crate::api::AppState;
use crate::auth::AuthUser;
use crate::permissions::{find_station_view, ActorScope};

/// Ministry administrators may only move their own placement inside their
/// current scope. Other placements confer no scope.
async fn check_station_move(
    state: &AppState,
    actor: &ActorScope,
    station_id: Uuid,
) -> Result<(), AccountError> {
    let user = &actor.user;
    if !user.is_admin || !user.category.is_hierarchy_bearing() || actor.scope.is_unrestricted() {
        return Ok(());
    }

    let current = queries::find_user_detail(&state.db, user.id)
        .await?
        .and_then(|row| row.station_id);
    if current == Some(station_id) {
        return Ok(());
    }

    if actor.scope.is_denied() {
        tracing::debug!(%station_id, "Unplaced administrator cannot place themselves");
        return Err(AccountError::StationOutOfScope);
    }

    let station = find_station_view(&state.db, station_id)
        .await?
        .ok_or(AccountError::StationNotFound)?;

    if resource().permits(&actor.scope, Some(station)) {
        Ok(())
    } else {
        tracing::debug!(%station_id, scope = ?actor.scope, "Placement outside scope");
        Err(AccountError::StationOutOfScope)
    }
}

async fn own_account(state: &AppState, user_id: Uuid) -> Result<UserResponse, AccountError> {
    queries::find_user_detail(&state.db, user_id)
        .await?
        .map(UserResponse::from)
        .ok_or(AccountError::NotFound)
}

#[utoipa::path(
    get,
    path = "/api/me/profile",
    tag = "accounts",
    responses((status = 200, body = UserResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AccountError> {
    Ok(Json(own_account(&state, auth.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/me/profile",
    tag = "accounts",
    request_body = ProfileRequest,
    responses((status = 200, body = UserResponse), (status = 403)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    actor: ActorScope,
    Json(body): Json<ProfileRequest>,
) -> Result<Json<UserResponse>, AccountError> {
    body.validate()
        .map_err(|e| AccountError::Validation(e.to_string()))?;

    if let Some(station_id) = body.station_id {
        check_station_move(&state, &actor, station_id).await?;
    }

    let user = &actor.user;
    queries::save_profile(&state.db, user.id, user.category, &body).await?;
    tracing::info!(category = %user.category, "Profile saved");

    Ok(Json(own_account(&state, user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "accounts",
    responses((status = 200, body = Vec<UserResponse>)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn list_users(
    State(state): State<AppState>,
    actor: ActorScope,
) -> Result<Json<Vec<UserResponse>>, AccountError> {
    let rows = queries::list_users_in_scope(&state.db, &resource(), &actor.scope, None).await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

/// One user inside the caller's scope. Users outside it are reported missing.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "accounts",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, body = UserResponse), (status = 404)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, actor), fields(user_id = %actor.user.id))]
pub async fn get_user(
    State(state): State<AppState>,
    actor: ActorScope,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AccountError> {
    let row = queries::list_users_in_scope(&state.db, &resource(), &actor.scope, Some(id))
        .await?
        .into_iter()
        .next();

    let Some(row) = row else {
        tracing::debug!(target_id = %id, scope = ?actor.scope, "User absent or outside scope");
        return Err(AccountError::NotFound);
    };

    Ok(Json(row.into()))
}
