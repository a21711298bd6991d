//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending requests through the full axum router, plus
//! fixtures for the hierarchy, accounts and tokens. Every test gets its own
//! migrated database from `#[sqlx::test]`.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use sr_common::{StationTier, Suffix};
use sr_server::api::{create_router, AppState};
use sr_server::auth::jwt;
use sr_server::config::Config;
use sr_server::hierarchy::queries;
use sr_server::hierarchy::types::StationRequest;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: Config,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        let config = Config::default_for_test();
        let router = create_router(AppState::new(pool.clone(), config.clone()));
        Self {
            router,
            pool,
            config,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Authenticated request without a body.
    pub async fn send(&self, method: Method, uri: &str, user_id: Uuid) -> Response<Body> {
        let req = Self::request(method, uri)
            .header("Authorization", format!("Bearer {}", self.token(user_id)))
            .body(Body::empty())
            .unwrap();
        self.oneshot(req).await
    }

    /// Authenticated request with a JSON body.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        user_id: Uuid,
        body: &serde_json::Value,
    ) -> Response<Body> {
        let req = Self::request(method, uri)
            .header("Authorization", format!("Bearer {}", self.token(user_id)))
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap();
        self.oneshot(req).await
    }

    pub fn token(&self, user_id: Uuid) -> String {
        jwt::generate_access_token(user_id, &self.config.jwt_secret, self.config.jwt_access_expiry)
            .expect("Failed to generate access token")
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

// ============================================================================
// Hierarchy fixtures
// ============================================================================

pub fn suffix(value: &str) -> Suffix {
    Suffix::parse(value).expect("valid suffix")
}

pub async fn create_region(pool: &PgPool, name: &str, code: &str) -> Uuid {
    queries::insert_region(pool, name, Some(&suffix(code)))
        .await
        .expect("Failed to create region")
        .id
}

pub async fn create_subregion(pool: &PgPool, region_id: Uuid, name: &str, code: &str) -> Uuid {
    queries::insert_subregion(pool, name, &suffix(code), region_id)
        .await
        .expect("Failed to create sub-region")
        .id
}

pub fn station_request(
    tier: StationTier,
    region_id: Option<Uuid>,
    subregion_id: Option<Uuid>,
    station_suffix: Option<&str>,
) -> StationRequest {
    let label = Uuid::new_v4().simple().to_string();
    StationRequest {
        name: format!("{tier} {}", &label[..6]),
        address: format!("Plot {label}"),
        tier,
        region_id,
        subregion_id,
        suffix: station_suffix.map(suffix),
    }
}

pub async fn create_station(
    pool: &PgPool,
    tier: StationTier,
    region_id: Option<Uuid>,
    subregion_id: Option<Uuid>,
    station_suffix: Option<&str>,
) -> Uuid {
    let request = station_request(tier, region_id, subregion_id, station_suffix);
    queries::save_station(pool, None, &request)
        .await
        .expect("Failed to create station")
        .id
}

/// Two regions, one sub-region each, and a station at every tier.
pub struct Hierarchy {
    pub region_a: Uuid,
    pub region_b: Uuid,
    pub subregion_a1: Uuid,
    pub subregion_b1: Uuid,
    pub national: Uuid,
    pub regional_a: Uuid,
    pub district_a1: Uuid,
    pub facility_a1: Uuid,
    pub facility_a1_other: Uuid,
    pub facility_b1: Uuid,
}

pub async fn build_hierarchy(pool: &PgPool) -> Hierarchy {
    let region_a = create_region(pool, "Region A", "01").await;
    let region_b = create_region(pool, "Region B", "02").await;
    let subregion_a1 = create_subregion(pool, region_a, "District A1", "11").await;
    let subregion_b1 = create_subregion(pool, region_b, "District B1", "21").await;

    Hierarchy {
        region_a,
        region_b,
        subregion_a1,
        subregion_b1,
        national: create_station(pool, StationTier::National, None, None, None).await,
        regional_a: create_station(pool, StationTier::Regional, Some(region_a), None, None).await,
        district_a1: create_station(
            pool,
            StationTier::SubRegional,
            Some(region_a),
            Some(subregion_a1),
            None,
        )
        .await,
        facility_a1: create_station(
            pool,
            StationTier::Facility,
            Some(region_a),
            Some(subregion_a1),
            None,
        )
        .await,
        facility_a1_other: create_station(
            pool,
            StationTier::Facility,
            Some(region_a),
            Some(subregion_a1),
            Some("1B"),
        )
        .await,
        facility_b1: create_station(
            pool,
            StationTier::Facility,
            Some(region_b),
            Some(subregion_b1),
            None,
        )
        .await,
    }
}

// ============================================================================
// Account fixtures
// ============================================================================

/// Create a user of `user_type` (`moh` or `ngo`).
pub async fn create_user(pool: &PgPool, user_type: &str, is_admin: bool) -> Uuid {
    let id = Uuid::now_v7();
    let handle = &id.simple().to_string()[..12];
    sqlx::query(
        "INSERT INTO users (id, username, email, user_type, is_admin) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(format!("user_{handle}"))
    .bind(format!("{handle}@example.org"))
    .bind(user_type)
    .bind(is_admin)
    .execute(pool)
    .await
    .expect("Failed to create user");
    id
}

/// Place a ministry user at a station.
pub async fn assign_station(pool: &PgPool, user_id: Uuid, station_id: Option<Uuid>) {
    sqlx::query(
        r"INSERT INTO moh_profiles (user_id, department, position, station_id)
          VALUES ($1, 'Health', 'Officer', $2)
          ON CONFLICT (user_id) DO UPDATE SET station_id = EXCLUDED.station_id",
    )
    .bind(user_id)
    .bind(station_id)
    .execute(pool)
    .await
    .expect("Failed to assign station");
}

/// Ministry administrator placed at `station_id`.
pub async fn create_admin_at(pool: &PgPool, station_id: Uuid) -> Uuid {
    let id = create_user(pool, "moh", true).await;
    assign_station(pool, id, Some(station_id)).await;
    id
}

/// Ministry staff member (not an administrator) placed at `station_id`.
pub async fn create_staff_at(pool: &PgPool, station_id: Uuid) -> Uuid {
    let id = create_user(pool, "moh", false).await;
    assign_station(pool, id, Some(station_id)).await;
    id
}

// ============================================================================
// Asset fixtures
// ============================================================================

pub async fn create_category(pool: &PgPool, name: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO asset_categories (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to create category");
    id
}

/// Non-device asset placed at `station_id`.
pub async fn create_item_at(pool: &PgPool, category_id: Uuid, station_id: Option<Uuid>) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query(
        r"INSERT INTO assets (id, asset_code, asset_type, category_id, current_station_id)
          VALUES ($1, $2, 'non_device', $3, $4)",
    )
    .bind(id)
    .bind(format!("AST-{}", &id.simple().to_string()[..10]))
    .bind(category_id)
    .bind(station_id)
    .execute(pool)
    .await
    .expect("Failed to create asset");

    sqlx::query("INSERT INTO non_device_assets (asset_id, name, quantity) VALUES ($1, 'Cold box', 2)")
        .bind(id)
        .execute(pool)
        .await
        .expect("Failed to create asset details");
    id
}
