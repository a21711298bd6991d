//! Hierarchy persistence.
//!
//! Station writes are the only place station codes are assigned. Each write
//! runs in a transaction holding an advisory lock on the generated code, so
//! two writers deriving the same code are serialized and the second sees the
//! first's row.

use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use sr_common::{generate_code, GeneratedCode, Region, Station, SubRegion, Suffix};
use uuid::Uuid;

use super::error::HierarchyError;
use super::types::{
    RegionRow, StationListRow, StationQuery, StationRequest, StationRow, SubRegionRow,
};
use crate::db::STATION_CODE_LOCK_SEED;

const REGION_COLUMNS: &str = "id, name, suffix, created_at, updated_at";

const SUBREGION_SELECT: &str = r"SELECT sr.id, sr.name, sr.suffix, sr.region_id, r.name AS region_name,
                 sr.created_at, sr.updated_at
          FROM subregions sr
          JOIN regions r ON r.id = sr.region_id";

const STATION_COLUMNS: &str = "id, name, address, tier, region_id, subregion_id, suffix, code";

const STATION_SELECT: &str = r"SELECT s.id, s.name, s.address, s.tier,
                 s.region_id, r.name AS region_name,
                 s.subregion_id, sr.name AS subregion_name,
                 s.suffix, s.code, s.created_at, s.updated_at
          FROM stations s
          LEFT JOIN regions r ON r.id = s.region_id
          LEFT JOIN subregions sr ON sr.id = s.subregion_id";

// ============================================================================
// Regions
// ============================================================================

/// `00` marks an absent parent in codes, so no stored parent may use it.
fn reject_filler(suffix: Option<&Suffix>) -> Result<(), HierarchyError> {
    match suffix {
        Some(suffix) if suffix.is_filler() => Err(HierarchyError::Validation(format!(
            "suffix '{suffix}' is reserved for codes without that parent"
        ))),
        _ => Ok(()),
    }
}

#[tracing::instrument(skip(pool))]
pub async fn list_regions(pool: &PgPool) -> Result<Vec<RegionRow>, sqlx::Error> {
    sqlx::query_as::<_, RegionRow>(&format!(
        "SELECT {REGION_COLUMNS} FROM regions ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_region_row<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<RegionRow>, sqlx::Error> {
    sqlx::query_as::<_, RegionRow>(&format!(
        "SELECT {REGION_COLUMNS} FROM regions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_region<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Region>, HierarchyError> {
    find_region_row(executor, id)
        .await?
        .map(Region::try_from)
        .transpose()
        .map_err(HierarchyError::from)
}

#[tracing::instrument(skip(pool))]
pub async fn insert_region(
    pool: &PgPool,
    name: &str,
    suffix: Option<&Suffix>,
) -> Result<RegionRow, HierarchyError> {
    reject_filler(suffix)?;

    sqlx::query_as::<_, RegionRow>(&format!(
        "INSERT INTO regions (id, name, suffix) VALUES ($1, $2, $3) RETURNING {REGION_COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(suffix.map(Suffix::as_str))
    .fetch_one(pool)
    .await
    .map_err(|e| HierarchyError::from_write(e, None))
}

/// Rename a region and/or change its suffix.
///
/// The suffix cannot change once a station code embeds it.
#[tracing::instrument(skip(pool))]
pub async fn update_region(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    suffix: Option<&Suffix>,
) -> Result<RegionRow, HierarchyError> {
    reject_filler(suffix)?;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, RegionRow>(&format!(
        "SELECT {REGION_COLUMNS} FROM regions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(HierarchyError::RegionNotFound)?;

    let suffix_changes =
        suffix.is_some_and(|s| current.suffix.as_deref() != Some(s.as_str()));
    if suffix_changes {
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stations WHERE region_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if referenced {
            tracing::debug!(region_id = %id, "Refusing suffix change on referenced region");
            return Err(HierarchyError::SuffixLocked);
        }
    }

    let row = sqlx::query_as::<_, RegionRow>(&format!(
        r"UPDATE regions
          SET name = COALESCE($2, name), suffix = COALESCE($3, suffix), updated_at = NOW()
          WHERE id = $1
          RETURNING {REGION_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(suffix.map(Suffix::as_str))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| HierarchyError::from_write(e, None))?;

    tx.commit().await?;
    Ok(row)
}

/// Delete a region. Refused while sub-regions or stations reference it.
#[tracing::instrument(skip(pool))]
pub async fn delete_region(pool: &PgPool, id: Uuid) -> Result<(), HierarchyError> {
    let dependents: bool = sqlx::query_scalar(
        r"SELECT EXISTS(SELECT 1 FROM subregions WHERE region_id = $1)
              OR EXISTS(SELECT 1 FROM stations WHERE region_id = $1)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if dependents {
        return Err(HierarchyError::HasDependents("Region"));
    }

    let result = sqlx::query("DELETE FROM regions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| HierarchyError::from_write(e, None))?;

    if result.rows_affected() == 0 {
        return Err(HierarchyError::RegionNotFound);
    }
    Ok(())
}

// ============================================================================
// Sub-regions
// ============================================================================

#[tracing::instrument(skip(pool))]
pub async fn list_subregions(
    pool: &PgPool,
    region_id: Option<Uuid>,
) -> Result<Vec<SubRegionRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(SUBREGION_SELECT);
    if let Some(region_id) = region_id {
        builder.push(" WHERE sr.region_id = ");
        builder.push_bind(region_id);
    }
    builder.push(" ORDER BY sr.name");

    builder.build_query_as().fetch_all(pool).await
}

pub async fn find_subregion_row<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<SubRegionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubRegionRow>(&format!("{SUBREGION_SELECT} WHERE sr.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_subregion<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<SubRegion>, HierarchyError> {
    find_subregion_row(executor, id)
        .await?
        .as_ref()
        .map(SubRegion::try_from)
        .transpose()
        .map_err(HierarchyError::from)
}

#[tracing::instrument(skip(pool))]
pub async fn insert_subregion(
    pool: &PgPool,
    name: &str,
    suffix: &Suffix,
    region_id: Uuid,
) -> Result<SubRegionRow, HierarchyError> {
    reject_filler(Some(suffix))?;

    if find_region_row(pool, region_id).await?.is_none() {
        return Err(HierarchyError::RegionNotFound);
    }

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO subregions (id, name, suffix, region_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(suffix.as_str())
    .bind(region_id)
    .fetch_one(pool)
    .await
    .map_err(|e| HierarchyError::from_write(e, None))?;

    find_subregion_row(pool, id)
        .await?
        .ok_or(HierarchyError::SubRegionNotFound)
}

/// Rename a sub-region and/or change its suffix.
///
/// The suffix cannot change once a station code embeds it.
#[tracing::instrument(skip(pool))]
pub async fn update_subregion(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    suffix: Option<&Suffix>,
) -> Result<SubRegionRow, HierarchyError> {
    reject_filler(suffix)?;
    let mut tx = pool.begin().await?;

    let current: Option<String> =
        sqlx::query_scalar("SELECT suffix FROM subregions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let current = current.ok_or(HierarchyError::SubRegionNotFound)?;

    if suffix.is_some_and(|s| s.as_str() != current) {
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stations WHERE subregion_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if referenced {
            tracing::debug!(subregion_id = %id, "Refusing suffix change on referenced sub-region");
            return Err(HierarchyError::SuffixLocked);
        }
    }

    sqlx::query(
        r"UPDATE subregions
          SET name = COALESCE($2, name), suffix = COALESCE($3, suffix), updated_at = NOW()
          WHERE id = $1",
    )
    .bind(id)
    .bind(name)
    .bind(suffix.map(Suffix::as_str))
    .execute(&mut *tx)
    .await
    .map_err(|e| HierarchyError::from_write(e, None))?;

    let row = find_subregion_row(&mut *tx, id)
        .await?
        .ok_or(HierarchyError::SubRegionNotFound)?;

    tx.commit().await?;
    Ok(row)
}

/// Delete a sub-region. Refused while stations reference it.
#[tracing::instrument(skip(pool))]
pub async fn delete_subregion(pool: &PgPool, id: Uuid) -> Result<(), HierarchyError> {
    let dependents: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stations WHERE subregion_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if dependents {
        return Err(HierarchyError::HasDependents("Sub-region"));
    }

    let result = sqlx::query("DELETE FROM subregions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| HierarchyError::from_write(e, None))?;

    if result.rows_affected() == 0 {
        return Err(HierarchyError::SubRegionNotFound);
    }
    Ok(())
}

// ============================================================================
// Stations
// ============================================================================

#[tracing::instrument(skip(pool))]
pub async fn list_stations(
    pool: &PgPool,
    query: &StationQuery,
) -> Result<Vec<StationListRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(STATION_SELECT);
    builder.push(" WHERE TRUE");

    if let Some(region_id) = query.region_id {
        builder.push(" AND s.region_id = ");
        builder.push_bind(region_id);
    }
    if let Some(subregion_id) = query.subregion_id {
        builder.push(" AND s.subregion_id = ");
        builder.push_bind(subregion_id);
    }
    if let Some(tier) = query.tier {
        builder.push(" AND s.tier = ");
        builder.push_bind(tier.as_str());
    }
    builder.push(" ORDER BY s.name");

    builder.build_query_as().fetch_all(pool).await
}

pub async fn find_station_row<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<StationListRow>, sqlx::Error> {
    sqlx::query_as::<_, StationListRow>(&format!("{STATION_SELECT} WHERE s.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_station<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Station>, HierarchyError> {
    sqlx::query_as::<_, StationRow>(&format!(
        "SELECT {STATION_COLUMNS} FROM stations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .map(Station::try_from)
    .transpose()
    .map_err(HierarchyError::from)
}

/// Parent region for a station write, held `FOR SHARE` until commit.
///
/// A concurrent suffix change takes `FOR UPDATE` on the same row, so it either
/// waits for this write and then sees the station, or commits first and this
/// read returns the new suffix.
async fn share_region(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Region>, HierarchyError> {
    sqlx::query_as::<_, RegionRow>(&format!(
        "SELECT {REGION_COLUMNS} FROM regions WHERE id = $1 FOR SHARE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .map(Region::try_from)
    .transpose()
    .map_err(HierarchyError::from)
}

/// Parent sub-region for a station write, held `FOR SHARE` until commit.
async fn share_subregion(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<SubRegion>, HierarchyError> {
    sqlx::query_as::<_, SubRegionRow>(&format!(
        "{SUBREGION_SELECT} WHERE sr.id = $1 FOR SHARE OF sr"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .as_ref()
    .map(SubRegion::try_from)
    .transpose()
    .map_err(HierarchyError::from)
}

/// Create (`id = None`) or replace a station, assigning its code.
///
/// On replace, a station keeping its tier and given no suffix keeps its
/// stored suffix. A replace that keeps both parents must derive the stored
/// code; otherwise it fails with `CodeLocked`.
#[tracing::instrument(skip(pool, request), fields(tier = %request.tier))]
pub async fn save_station(
    pool: &PgPool,
    id: Option<Uuid>,
    request: &StationRequest,
) -> Result<Station, HierarchyError> {
    let mut tx = pool.begin().await?;

    let existing = match id {
        Some(id) => Some(
            find_station(&mut *tx, id)
                .await?
                .ok_or(HierarchyError::StationNotFound)?,
        ),
        None => None,
    };

    let region = match request.region_id {
        Some(region_id) => Some(
            share_region(&mut tx, region_id)
                .await?
                .ok_or(HierarchyError::RegionNotFound)?,
        ),
        None => None,
    };
    let subregion = match request.subregion_id {
        Some(subregion_id) => Some(
            share_subregion(&mut tx, subregion_id)
                .await?
                .ok_or(HierarchyError::SubRegionNotFound)?,
        ),
        None => None,
    };

    let suffix = request.suffix.clone().or_else(|| {
        existing
            .as_ref()
            .filter(|s| s.tier == request.tier)
            .map(|s| s.suffix.clone())
    });

    let GeneratedCode { code, suffix } = generate_code(
        request.tier,
        region.as_ref(),
        subregion.as_ref(),
        suffix.as_ref(),
    )?;

    if let Some(existing) = &existing {
        let same_parents = existing.region_id == request.region_id
            && existing.subregion_id == request.subregion_id;
        if same_parents && existing.code != code {
            tracing::debug!(station_id = %existing.id, stored = %existing.code, derived = %code, "Refusing code change without a parent change");
            return Err(HierarchyError::CodeLocked {
                stored: existing.code.to_string(),
                derived: code.to_string(),
            });
        }
    }

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, $2))")
        .bind(code.as_str())
        .bind(STATION_CODE_LOCK_SEED)
        .execute(&mut *tx)
        .await?;

    let holder: Option<Uuid> = sqlx::query_scalar("SELECT id FROM stations WHERE code = $1")
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await?;
    if holder.is_some_and(|holder| Some(holder) != id) {
        tracing::debug!(code = %code, "Station code already assigned");
        return Err(HierarchyError::DuplicateCode(code.to_string()));
    }

    let sql = if id.is_some() {
        format!(
            r"UPDATE stations
              SET name = $2, address = $3, tier = $4, region_id = $5, subregion_id = $6,
                  suffix = $7, code = $8, updated_at = NOW()
              WHERE id = $1
              RETURNING {STATION_COLUMNS}"
        )
    } else {
        format!(
            r"INSERT INTO stations (id, name, address, tier, region_id, subregion_id, suffix, code)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
              RETURNING {STATION_COLUMNS}"
        )
    };

    let row = sqlx::query_as::<_, StationRow>(&sql)
        .bind(id.unwrap_or_else(Uuid::now_v7))
        .bind(&request.name)
        .bind(&request.address)
        .bind(request.tier.as_str())
        .bind(request.region_id)
        .bind(request.subregion_id)
        .bind(suffix.as_str())
        .bind(code.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| HierarchyError::from_write(e, Some(code.as_str())))?;

    tx.commit().await?;

    let station = Station::try_from(row)?;
    tracing::info!(station_id = %station.id, code = %station.code, "Station saved");
    Ok(station)
}

/// Delete a station. Profiles and assets placed there are left unplaced.
#[tracing::instrument(skip(pool))]
pub async fn delete_station(pool: &PgPool, id: Uuid) -> Result<(), HierarchyError> {
    let result = sqlx::query("DELETE FROM stations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| HierarchyError::from_write(e, None))?;

    if result.rows_affected() == 0 {
        return Err(HierarchyError::StationNotFound);
    }
    Ok(())
}

/// Re-derive a stored station's code from its persisted parents and suffix.
#[tracing::instrument(skip(pool))]
pub async fn regenerate_station_code(
    pool: &PgPool,
    id: Uuid,
) -> Result<(Station, GeneratedCode), HierarchyError> {
    let station = find_station(pool, id)
        .await?
        .ok_or(HierarchyError::StationNotFound)?;

    let region = match station.region_id {
        Some(region_id) => find_region(pool, region_id).await?,
        None => None,
    };
    let subregion = match station.subregion_id {
        Some(subregion_id) => find_subregion(pool, subregion_id).await?,
        None => None,
    };

    let generated = generate_code(
        station.tier,
        region.as_ref(),
        subregion.as_ref(),
        Some(&station.suffix),
    )?;

    Ok((station, generated))
}
