//! Administrative hierarchy: regions, sub-regions and stations.
//!
//! Station codes are generated by `sr_common::generate_code` and assigned in
//! `queries::save_station`.

pub mod error;
pub mod handlers;
pub mod queries;
pub mod types;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::api::AppState;

pub use error::HierarchyError;

/// Routes mounted under `/api/locations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/regions",
            get(handlers::list_regions).post(handlers::create_region),
        )
        .route(
            "/regions/{id}",
            patch(handlers::update_region).delete(handlers::delete_region),
        )
        .route(
            "/subregions",
            get(handlers::list_subregions).post(handlers::create_subregion),
        )
        .route(
            "/subregions/{id}",
            patch(handlers::update_subregion).delete(handlers::delete_subregion),
        )
        .route(
            "/stations",
            get(handlers::list_stations).post(handlers::create_station),
        )
        .route(
            "/stations/{id}",
            get(handlers::get_station)
                .put(handlers::update_station)
                .delete(handlers::delete_station),
        )
        .route("/stations/{id}/code", get(handlers::check_station_code))
}
