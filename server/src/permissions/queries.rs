//! Actor and station lookups used for scope resolution.

use sqlx::{FromRow, PgPool};
use sr_common::{ActorView, StationTier, StationView, UserCategory};
use uuid::Uuid;

use super::PermissionError;

#[derive(Debug, FromRow)]
struct ActorRow {
    is_admin: bool,
    user_type: String,
    station_id: Option<Uuid>,
    tier: Option<String>,
    region_id: Option<Uuid>,
    subregion_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct StationViewRow {
    id: Uuid,
    tier: String,
    region_id: Option<Uuid>,
    subregion_id: Option<Uuid>,
}

fn station_view(
    id: Uuid,
    tier: &str,
    region_id: Option<Uuid>,
    subregion_id: Option<Uuid>,
) -> Option<StationView> {
    match tier.parse::<StationTier>() {
        Ok(tier) => Some(StationView {
            id,
            tier,
            region_id,
            subregion_id,
        }),
        Err(err) => {
            tracing::warn!(station_id = %id, %err, "Station has unreadable tier");
            None
        }
    }
}

/// Build the actor view for `user_id`.
///
/// Returns `None` when the user does not exist. A missing profile, a profile
/// without a station, or an unreadable station all yield `station: None`.
#[tracing::instrument(skip(pool))]
pub async fn load_actor_view(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ActorView>, PermissionError> {
    let row = sqlx::query_as::<_, ActorRow>(
        r"SELECT u.is_admin, u.user_type,
                 s.id AS station_id, s.tier, s.region_id, s.subregion_id
          FROM users u
          LEFT JOIN moh_profiles p ON p.user_id = u.id
          LEFT JOIN stations s ON s.id = p.station_id
          WHERE u.id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let category: UserCategory = row
        .user_type
        .parse()
        .map_err(PermissionError::InvalidAccount)?;

    let station = match (row.station_id, row.tier.as_deref()) {
        (Some(id), Some(tier)) => station_view(id, tier, row.region_id, row.subregion_id),
        _ => None,
    };

    Ok(Some(ActorView {
        is_admin: row.is_admin,
        category,
        station,
    }))
}

/// Load the scope-relevant fields of one station.
#[tracing::instrument(skip(pool))]
pub async fn find_station_view(
    pool: &PgPool,
    station_id: Uuid,
) -> Result<Option<StationView>, sqlx::Error> {
    let row = sqlx::query_as::<_, StationViewRow>(
        "SELECT id, tier, region_id, subregion_id FROM stations WHERE id = $1",
    )
    .bind(station_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|r| station_view(r.id, &r.tier, r.region_id, r.subregion_id)))
}
