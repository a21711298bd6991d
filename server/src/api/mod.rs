//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::{
    extract::DefaultBodyLimit, middleware::from_fn_with_state, routing::get, Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{accounts, assets, auth, config::Config, hierarchy, permissions};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// `OpenAPI` document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        hierarchy::handlers::list_regions,
        hierarchy::handlers::create_region,
        hierarchy::handlers::update_region,
        hierarchy::handlers::delete_region,
        hierarchy::handlers::list_subregions,
        hierarchy::handlers::create_subregion,
        hierarchy::handlers::update_subregion,
        hierarchy::handlers::delete_subregion,
        hierarchy::handlers::list_stations,
        hierarchy::handlers::get_station,
        hierarchy::handlers::create_station,
        hierarchy::handlers::update_station,
        hierarchy::handlers::delete_station,
        hierarchy::handlers::check_station_code,
        permissions::handlers::get_my_scope,
        accounts::handlers::get_my_profile,
        accounts::handlers::update_my_profile,
        accounts::handlers::list_users,
        accounts::handlers::get_user,
        assets::handlers::list_categories,
        assets::handlers::create_category,
        assets::handlers::list_device_types,
        assets::handlers::create_device_type,
        assets::handlers::list_assets,
        assets::handlers::get_asset,
        assets::handlers::create_asset,
        assets::handlers::update_asset,
        assets::handlers::delete_asset,
    ),
    tags(
        (name = "locations", description = "Regions, sub-regions and stations"),
        (name = "permissions", description = "Caller scope"),
        (name = "accounts", description = "Profiles and scoped user administration"),
        (name = "assets", description = "Scoped asset management"),
    )
)]
pub struct ApiDoc;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_size = state.config.max_body_size;

    let me_routes = Router::new()
        .merge(permissions::router())
        .merge(accounts::me_router());

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .nest("/api/locations", hierarchy::router())
        .nest("/api/me", me_routes)
        .nest("/api/admin/users", accounts::admin_router())
        .nest("/api/assets", assets::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // API documentation
        .route("/api/openapi.json", get(openapi_json))
        .merge(protected_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
