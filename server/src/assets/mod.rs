//! Physical assets placed at stations.

pub mod error;
pub mod handlers;
pub mod queries;
pub mod types;

use axum::{routing::get, Router};
use sr_common::{FieldRemap, StationPath};

use crate::api::AppState;
use crate::permissions::{ColumnMap, ResourceScope};

pub use error::AssetError;

const ASSET_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("current_station", "a.current_station_id"),
    ("current_station.region", "s.region_id"),
    ("current_station.subregion", "s.subregion_id"),
]);

/// Assets reference their station directly, as `current_station`.
#[must_use]
pub fn resource() -> ResourceScope {
    ResourceScope {
        name: "asset",
        path: StationPath::Direct,
        remap: FieldRemap::new().with("station", "current_station"),
        columns: ASSET_COLUMNS,
    }
}

/// Routes mounted under `/api/assets`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_assets).post(handlers::create_asset),
        )
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/device-types",
            get(handlers::list_device_types).post(handlers::create_device_type),
        )
        .route(
            "/{id}",
            get(handlers::get_asset)
                .patch(handlers::update_asset)
                .delete(handlers::delete_asset),
        )
}
