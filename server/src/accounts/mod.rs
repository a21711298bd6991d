//! Accounts and profiles.
//!
//! Ministry profiles place a user at a station; that placement drives both
//! the user's own scope and which administrators can see them.

pub mod error;
pub mod handlers;
pub mod queries;
pub mod types;

use axum::{routing::get, Router};
use sr_common::{FieldRemap, StationPath};

use crate::api::AppState;
use crate::permissions::{ColumnMap, ResourceScope};

pub use error::AccountError;

const USER_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("profile.station", "p.station_id"),
    ("profile.station.region", "s.region_id"),
    ("profile.station.subregion", "s.subregion_id"),
]);

/// Users reach stations through their ministry profile.
#[must_use]
pub fn resource() -> ResourceScope {
    ResourceScope {
        name: "user",
        path: StationPath::through("profile"),
        remap: FieldRemap::new(),
        columns: USER_COLUMNS,
    }
}

/// Routes mounted under `/api/me`.
pub fn me_router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(handlers::get_my_profile).put(handlers::update_my_profile),
    )
}

/// Routes mounted under `/api/admin/users`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/{id}", get(handlers::get_user))
}
