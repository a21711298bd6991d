//! Per-request scope extraction.

use axum::{extract::FromRequestParts, http::request::Parts};
use sr_common::{resolve_scope, Scope};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::AuthUser;

use super::{load_actor_view, PermissionError};

/// Resolved scope of the authenticated caller.
///
/// Use behind `require_auth`:
///
/// ```ignore
/// async fn handler(actor: ActorScope) -> impl IntoResponse {
///     format!("{:?}", actor.scope)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActorScope {
    pub user: AuthUser,
    pub scope: Scope,
}

impl ActorScope {
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Require the whole hierarchy.
    pub fn require_unrestricted(&self) -> Result<(), PermissionError> {
        if self.scope.is_unrestricted() {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.user.id, scope = ?self.scope, "Unrestricted scope required");
            Err(PermissionError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for ActorScope {
    type Rejection = PermissionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let scope = load_actor_view(&state.db, user.id)
            .await?
            .map_or(Scope::Denied, |actor| resolve_scope(&actor));

        tracing::debug!(user_id = %user.id, ?scope, "Resolved actor scope");

        Ok(Self { user, scope })
    }
}
