//! Scope endpoints.

use axum::Json;
use serde::Serialize;
use sr_common::Scope;
use uuid::Uuid;

use super::ActorScope;

/// Caller's resolved scope.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScopeResponse {
    pub user_id: Uuid,
    #[schema(value_type = Object)]
    pub scope: Scope,
}

/// Return the caller's resolved scope.
#[utoipa::path(
    get,
    path = "/api/me/scope",
    tag = "permissions",
    responses((status = 200, body = ScopeResponse)),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(actor), fields(user_id = %actor.user.id))]
pub async fn get_my_scope(actor: ActorScope) -> Json<ScopeResponse> {
    Json(ScopeResponse {
        user_id: actor.user_id(),
        scope: actor.scope,
    })
}
