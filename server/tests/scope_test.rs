//! Access scope integration tests.
//!
//! Checks that accounts and assets are filtered by the caller's position in
//! the hierarchy, end to end through the HTTP router.
//!
//! Run with: `cargo test --test scope_test`

mod helpers;

use std::collections::HashSet;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use helpers::{
    body_to_json, build_hierarchy, create_admin_at, create_category, create_item_at,
    create_staff_at, create_user, TestApp,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

fn ids(json: &Value) -> HashSet<Uuid> {
    json.as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

// ============================================================================
// Basics
// ============================================================================

#[sqlx::test]
async fn test_health_is_public(pool: PgPool) {
    let app = TestApp::new(pool);

    let req = TestApp::request(Method::GET, "/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_to_json(resp).await["status"], "ok");
}

#[sqlx::test]
async fn test_openapi_lists_routes(pool: PgPool) {
    let app = TestApp::new(pool);

    let req = TestApp::request(Method::GET, "/api/openapi.json")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_to_json(resp).await;
    assert!(json["paths"]["/api/locations/stations"].is_object());
    assert!(json["paths"]["/api/assets/{id}"].is_object());
}

#[sqlx::test]
async fn test_requests_without_token_rejected(pool: PgPool) {
    let app = TestApp::new(pool);

    let req = TestApp::request(Method::GET, "/api/admin/users")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestApp::request(Method::GET, "/api/assets")
        .header("Authorization", "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Own scope
// ============================================================================

#[sqlx::test]
async fn test_my_scope_per_tier(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());

    let cases = [
        (h.national, json!({ "kind": "unrestricted" })),
        (
            h.regional_a,
            json!({ "kind": "region_filtered", "region_id": h.region_a }),
        ),
        (
            h.district_a1,
            json!({ "kind": "sub_region_filtered", "subregion_id": h.subregion_a1 }),
        ),
        (
            h.facility_b1,
            json!({ "kind": "station_filtered", "station_id": h.facility_b1 }),
        ),
    ];

    for (station, expected) in cases {
        let admin = create_admin_at(&pool, station).await;
        let resp = app.send(Method::GET, "/api/me/scope", admin).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_to_json(resp).await;
        assert_eq!(json["user_id"], admin.to_string());
        assert_eq!(json["scope"], expected);
    }
}

#[sqlx::test]
async fn test_my_scope_denied_cases(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());

    let staff = create_staff_at(&pool, h.national).await;
    let partner_admin = create_user(&pool, "ngo", true).await;
    let unplaced_admin = create_user(&pool, "moh", true).await;

    for user in [staff, partner_admin, unplaced_admin] {
        let resp = app.send(Method::GET, "/api/me/scope", user).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_to_json(resp).await["scope"], json!({ "kind": "denied" }));
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[sqlx::test]
async fn test_user_listing_follows_scope(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());

    let at_facility_a1 = create_staff_at(&pool, h.facility_a1).await;
    let at_district_a1 = create_staff_at(&pool, h.district_a1).await;
    let at_regional_a = create_staff_at(&pool, h.regional_a).await;
    let at_facility_b1 = create_staff_at(&pool, h.facility_b1).await;
    let partner = create_user(&pool, "ngo", false).await;

    let national_admin = create_admin_at(&pool, h.national).await;
    let regional_admin = create_admin_at(&pool, h.regional_a).await;
    let district_admin = create_admin_at(&pool, h.district_a1).await;
    let facility_admin = create_admin_at(&pool, h.facility_a1).await;

    // National: everyone, including partner staff.
    let resp = app.send(Method::GET, "/api/admin/users", national_admin).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let seen = ids(&body_to_json(resp).await);
    for user in [at_facility_a1, at_facility_b1, partner, regional_admin] {
        assert!(seen.contains(&user));
    }

    // Regional: every station in region A.
    let resp = app.send(Method::GET, "/api/admin/users", regional_admin).await;
    let seen = ids(&body_to_json(resp).await);
    assert_eq!(
        seen,
        HashSet::from([
            at_facility_a1,
            at_district_a1,
            at_regional_a,
            regional_admin,
            district_admin,
            facility_admin,
        ])
    );

    // Sub-regional: the district office and facilities below it.
    let resp = app.send(Method::GET, "/api/admin/users", district_admin).await;
    let seen = ids(&body_to_json(resp).await);
    assert_eq!(
        seen,
        HashSet::from([at_facility_a1, at_district_a1, district_admin, facility_admin])
    );

    // Facility: that station only.
    let resp = app.send(Method::GET, "/api/admin/users", facility_admin).await;
    let seen = ids(&body_to_json(resp).await);
    assert_eq!(seen, HashSet::from([at_facility_a1, facility_admin]));
}

#[sqlx::test]
async fn test_denied_actor_sees_no_users(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());
    create_staff_at(&pool, h.facility_a1).await;

    let staff = create_staff_at(&pool, h.national).await;
    let partner_admin = create_user(&pool, "ngo", true).await;

    for user in [staff, partner_admin] {
        let resp = app.send(Method::GET, "/api/admin/users", user).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_to_json(resp).await, json!([]));
    }
}

#[sqlx::test]
async fn test_out_of_scope_user_reported_missing(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());

    let inside = create_staff_at(&pool, h.facility_a1).await;
    let outside = create_staff_at(&pool, h.facility_b1).await;
    let regional_admin = create_admin_at(&pool, h.regional_a).await;

    let resp = app
        .send(Method::GET, &format!("/api/admin/users/{inside}"), regional_admin)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_to_json(resp).await;
    assert_eq!(json["profile"]["kind"], "moh");
    assert_eq!(json["profile"]["station_id"], h.facility_a1.to_string());

    let resp = app
        .send(Method::GET, &format!("/api/admin/users/{outside}"), regional_admin)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_profile_update_places_user(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());
    let user = create_user(&pool, "moh", false).await;

    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            user,
            &json!({
                "first_name": "Amina",
                "department": "Logistics",
                "position": "Store Manager",
                "station_id": h.district_a1,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_to_json(resp).await;
    assert_eq!(json["first_name"], "Amina");
    assert_eq!(json["profile_complete"], true);
    assert_eq!(json["profile"]["station_id"], h.district_a1.to_string());
    assert_eq!(json["profile"]["station_code"], "0111DC");

    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            user,
            &json!({
                "department": "Logistics",
                "position": "Store Manager",
                "station_id": Uuid::new_v4(),
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

fn placement(station_id: Uuid) -> Value {
    json!({
        "department": "Logistics",
        "position": "Store Manager",
        "station_id": station_id,
    })
}

#[sqlx::test]
async fn test_admin_cannot_place_self_outside_scope(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());
    let facility_admin = create_admin_at(&pool, h.facility_a1).await;

    for target in [h.national, h.regional_a, h.facility_b1] {
        let resp = app
            .send_json(Method::PUT, "/api/me/profile", facility_admin, &placement(target))
            .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_to_json(resp).await["error"], "station_out_of_scope");
    }

    let resp = app.send(Method::GET, "/api/me/scope", facility_admin).await;
    assert_eq!(
        body_to_json(resp).await["scope"],
        json!({ "kind": "station_filtered", "station_id": h.facility_a1 })
    );

    let resp = app
        .send_json(
            Method::POST,
            "/api/locations/regions",
            facility_admin,
            &json!({ "name": "Rogue Region", "suffix": "09" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Keeping the current station is always allowed.
    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            facility_admin,
            &placement(h.facility_a1),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[sqlx::test]
async fn test_admin_moves_within_scope(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let app = TestApp::new(pool.clone());
    let regional_admin = create_admin_at(&pool, h.regional_a).await;
    let national_admin = create_admin_at(&pool, h.national).await;
    let unplaced_admin = create_user(&pool, "moh", true).await;

    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            regional_admin,
            &placement(h.district_a1),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.send(Method::GET, "/api/me/scope", regional_admin).await;
    assert_eq!(
        body_to_json(resp).await["scope"]["kind"],
        "sub_region_filtered"
    );

    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            national_admin,
            &placement(h.facility_b1),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .send_json(
            Method::PUT,
            "/api/me/profile",
            unplaced_admin,
            &placement(h.national),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Assets
// ============================================================================

struct Items {
    facility_a1: Uuid,
    district_a1: Uuid,
    facility_b1: Uuid,
    unplaced: Uuid,
}

async fn seed_items(pool: &PgPool, h: &helpers::Hierarchy) -> Items {
    let category = create_category(pool, "Cold chain").await;
    Items {
        facility_a1: create_item_at(pool, category, Some(h.facility_a1)).await,
        district_a1: create_item_at(pool, category, Some(h.district_a1)).await,
        facility_b1: create_item_at(pool, category, Some(h.facility_b1)).await,
        unplaced: create_item_at(pool, category, None).await,
    }
}

#[sqlx::test]
async fn test_asset_listing_follows_scope(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let items = seed_items(&pool, &h).await;
    let app = TestApp::new(pool.clone());

    let national_admin = create_admin_at(&pool, h.national).await;
    let regional_admin = create_admin_at(&pool, h.regional_a).await;
    let facility_admin = create_admin_at(&pool, h.facility_a1).await;

    let resp = app.send(Method::GET, "/api/assets", national_admin).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        ids(&body_to_json(resp).await),
        HashSet::from([
            items.facility_a1,
            items.district_a1,
            items.facility_b1,
            items.unplaced
        ])
    );

    let resp = app.send(Method::GET, "/api/assets", regional_admin).await;
    assert_eq!(
        ids(&body_to_json(resp).await),
        HashSet::from([items.facility_a1, items.district_a1])
    );

    let resp = app.send(Method::GET, "/api/assets", facility_admin).await;
    assert_eq!(
        ids(&body_to_json(resp).await),
        HashSet::from([items.facility_a1])
    );
}

#[sqlx::test]
async fn test_denied_actor_cannot_list_assets(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    seed_items(&pool, &h).await;
    let app = TestApp::new(pool.clone());
    let staff = create_staff_at(&pool, h.national).await;

    let resp = app.send(Method::GET, "/api/assets", staff).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test]
async fn test_out_of_scope_asset_reported_missing(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let items = seed_items(&pool, &h).await;
    let app = TestApp::new(pool.clone());
    let regional_admin = create_admin_at(&pool, h.regional_a).await;

    let resp = app
        .send(
            Method::GET,
            &format!("/api/assets/{}", items.district_a1),
            regional_admin,
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_to_json(resp).await;
    assert_eq!(json["asset_type"], "NON_DEVICE");
    assert_eq!(json["non_device"]["name"], "Cold box");
    assert_eq!(json["station_code"], "0111DC");

    for hidden in [items.facility_b1, items.unplaced] {
        let resp = app
            .send(Method::GET, &format!("/api/assets/{hidden}"), regional_admin)
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}

#[sqlx::test]
async fn test_asset_move_limited_to_scope(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let items = seed_items(&pool, &h).await;
    let app = TestApp::new(pool.clone());
    let regional_admin = create_admin_at(&pool, h.regional_a).await;
    let uri = format!("/api/assets/{}", items.facility_a1);

    let resp = app
        .send_json(
            Method::PATCH,
            &uri,
            regional_admin,
            &json!({ "current_station_id": h.facility_b1 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_to_json(resp).await["error"], "station_out_of_scope");

    let resp = app
        .send_json(
            Method::PATCH,
            &uri,
            regional_admin,
            &json!({ "current_station_id": h.facility_a1_other, "status": "assigned" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_to_json(resp).await;
    assert_eq!(json["current_station_id"], h.facility_a1_other.to_string());
    assert_eq!(json["status"], "assigned");
}

#[sqlx::test]
async fn test_asset_create_and_delete_need_national_admin(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let items = seed_items(&pool, &h).await;
    let category = create_category(&pool, "Furniture").await;
    let app = TestApp::new(pool.clone());

    let national_admin = create_admin_at(&pool, h.national).await;
    let regional_admin = create_admin_at(&pool, h.regional_a).await;

    let body = json!({
        "asset_code": "AST-CHAIR-01",
        "asset_type": "NON_DEVICE",
        "category_id": category,
        "current_station_id": h.facility_a1,
        "non_device": { "name": "Chair", "quantity": 12 },
    });

    let resp = app
        .send_json(Method::POST, "/api/assets", regional_admin, &body)
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .send_json(Method::POST, "/api/assets", national_admin, &body)
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_to_json(resp).await;
    assert_eq!(json["non_device"]["quantity"], 12);
    assert_eq!(json["status"], "in_stock");

    let resp = app
        .send_json(Method::POST, "/api/assets", national_admin, &body)
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let uri = format!("/api/assets/{}", items.facility_a1);
    let resp = app.send(Method::DELETE, &uri, regional_admin).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.send(Method::DELETE, &uri, national_admin).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test]
async fn test_device_asset_requires_details(pool: PgPool) {
    let h = build_hierarchy(&pool).await;
    let category = create_category(&pool, "Computers").await;
    let app = TestApp::new(pool.clone());
    let admin = create_admin_at(&pool, h.national).await;

    let resp = app
        .send_json(
            Method::POST,
            "/api/assets",
            admin,
            &json!({
                "asset_code": "AST-LAPTOP-01",
                "asset_type": "DEVICE",
                "category_id": category,
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_to_json(resp).await["error"], "validation_error");
}
