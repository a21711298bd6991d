//! Access scoping.
//!
//! Loads an actor's hierarchy position, resolves it to a [`Scope`] and applies
//! that scope to resource collections:
//! - `ActorScope`: per-request extractor holding the resolved scope
//! - `ResourceScope`: how one resource reaches stations, plus its SQL columns
//! - `AssetAction`: which asset operations a scope permits

mod error;
pub mod extract;
pub mod handlers;
pub mod policy;
pub mod queries;
pub mod sql;

use axum::{routing::get, Router};

use crate::api::AppState;

pub use error::PermissionError;
pub use extract::ActorScope;
pub use policy::AssetAction;
pub use queries::{find_station_view, load_actor_view};
pub use sql::{push_predicate, ColumnMap, ResourceScope};

pub use sr_common::Scope;

/// Routes mounted under `/api/me`.
pub fn router() -> Router<AppState> {
    Router::new().route("/scope", get(handlers::get_my_scope))
}
