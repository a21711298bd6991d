//! Asset persistence.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use sr_common::Scope;
use uuid::Uuid;

use super::error::AssetError;
use super::types::{
    AssetCondition, AssetQuery, AssetRow, AssetStatus, AssetType, CategoryRow,
    CreateAssetRequest, DeviceInput, DeviceTypeRow, NonDeviceInput, UpdateAssetRequest,
};
use crate::permissions::ResourceScope;

const ASSET_SELECT: &str = r"SELECT a.id, a.asset_code, a.asset_type, a.category_id,
                 c.name AS category_name,
                 a.current_station_id, s.name AS station_name, s.code AS station_code,
                 s.tier AS station_tier, s.region_id AS station_region_id,
                 s.subregion_id AS station_subregion_id,
                 a.status, a.condition, a.created_at,
                 d.device_type_id, dt.name AS device_type_name, d.serial_number,
                 d.program, d.partner, d.partner_number, d.additional_notes AS device_notes,
                 nd.name AS item_name, nd.quantity, nd.additional_notes AS item_notes
          FROM assets a
          JOIN asset_categories c ON c.id = a.category_id
          LEFT JOIN stations s ON s.id = a.current_station_id
          LEFT JOIN devices d ON d.asset_id = a.id
          LEFT JOIN device_types dt ON dt.id = d.device_type_id
          LEFT JOIN non_device_assets nd ON nd.asset_id = a.id";

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 200;

// ============================================================================
// Categories and device types
// ============================================================================

#[tracing::instrument(skip(pool))]
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, description FROM asset_categories ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

#[tracing::instrument(skip(pool))]
pub async fn insert_category(
    pool: &PgPool,
    name: &str,
    description: &str,
) -> Result<CategoryRow, AssetError> {
    sqlx::query_as::<_, CategoryRow>(
        r"INSERT INTO asset_categories (id, name, description) VALUES ($1, $2, $3)
          RETURNING id, name, description",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
    .map_err(AssetError::from_write)
}

#[tracing::instrument(skip(pool))]
pub async fn list_device_types(
    pool: &PgPool,
    category_id: Option<Uuid>,
) -> Result<Vec<DeviceTypeRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r"SELECT dt.id, dt.name, dt.category_id, c.name AS category_name
          FROM device_types dt
          JOIN asset_categories c ON c.id = dt.category_id",
    );
    if let Some(category_id) = category_id {
        builder.push(" WHERE dt.category_id = ");
        builder.push_bind(category_id);
    }
    builder.push(" ORDER BY dt.name");

    builder.build_query_as().fetch_all(pool).await
}

#[tracing::instrument(skip(pool))]
pub async fn insert_device_type(
    pool: &PgPool,
    name: &str,
    category_id: Uuid,
) -> Result<DeviceTypeRow, AssetError> {
    sqlx::query_as::<_, DeviceTypeRow>(
        r"WITH inserted AS (
              INSERT INTO device_types (id, name, category_id) VALUES ($1, $2, $3)
              RETURNING id, name, category_id
          )
          SELECT i.id, i.name, i.category_id, c.name AS category_name
          FROM inserted i
          JOIN asset_categories c ON c.id = i.category_id",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .map_err(AssetError::from_write)
}

// ============================================================================
// Assets
// ============================================================================

/// Substring `ILIKE` pattern matching `search` literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{escaped}%")
}

/// Assets visible under `scope`, filtered by `query`, newest first.
#[tracing::instrument(skip(pool, resource))]
pub async fn list_assets(
    pool: &PgPool,
    resource: &ResourceScope,
    scope: &Scope,
    query: &AssetQuery,
) -> Result<Vec<AssetRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(ASSET_SELECT);
    builder.push(" WHERE ");
    resource.push_filter(&mut builder, scope);

    if let Some(asset_type) = query.asset_type {
        builder.push(" AND a.asset_type = ");
        builder.push_bind(asset_type);
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND a.category_id = ");
        builder.push_bind(category_id);
    }
    if let Some(station_id) = query.station_id {
        builder.push(" AND a.current_station_id = ");
        builder.push_bind(station_id);
    }
    if let Some(status) = query.status {
        builder.push(" AND a.status = ");
        builder.push_bind(status);
    }
    if let Some(condition) = query.condition {
        builder.push(" AND a.condition = ");
        builder.push_bind(condition);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        builder.push(" AND (a.asset_code ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR d.serial_number ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR d.program ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let offset = query.offset.unwrap_or(0).max(0);

    builder.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    builder.build_query_as().fetch_all(pool).await
}

/// Load one asset regardless of scope. Callers check placement themselves.
pub async fn find_asset(pool: &PgPool, id: Uuid) -> Result<Option<AssetRow>, sqlx::Error> {
    sqlx::query_as::<_, AssetRow>(&format!("{ASSET_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn write_device(
    conn: &mut PgConnection,
    asset_id: Uuid,
    device: &DeviceInput,
) -> Result<(), AssetError> {
    sqlx::query(
        r"INSERT INTO devices
              (asset_id, device_type_id, serial_number, program, partner, partner_number, additional_notes)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          ON CONFLICT (asset_id) DO UPDATE
          SET device_type_id = EXCLUDED.device_type_id, serial_number = EXCLUDED.serial_number,
              program = EXCLUDED.program, partner = EXCLUDED.partner,
              partner_number = EXCLUDED.partner_number,
              additional_notes = EXCLUDED.additional_notes",
    )
    .bind(asset_id)
    .bind(device.device_type_id)
    .bind(device.serial_number.trim())
    .bind(device.program.as_deref())
    .bind(device.partner.as_deref())
    .bind(device.partner_number.as_deref())
    .bind(device.additional_notes.as_deref().unwrap_or_default())
    .execute(conn)
    .await
    .map_err(AssetError::from_write)?;
    Ok(())
}

async fn write_non_device(
    conn: &mut PgConnection,
    asset_id: Uuid,
    item: &NonDeviceInput,
) -> Result<(), AssetError> {
    sqlx::query(
        r"INSERT INTO non_device_assets (asset_id, name, quantity, additional_notes)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (asset_id) DO UPDATE
          SET name = EXCLUDED.name, quantity = EXCLUDED.quantity,
              additional_notes = EXCLUDED.additional_notes",
    )
    .bind(asset_id)
    .bind(item.name.trim())
    .bind(item.quantity)
    .bind(item.additional_notes.as_deref().unwrap_or_default())
    .execute(conn)
    .await
    .map_err(AssetError::from_write)?;
    Ok(())
}

#[tracing::instrument(skip(pool, request), fields(asset_code = %request.asset_code))]
pub async fn insert_asset(pool: &PgPool, request: &CreateAssetRequest) -> Result<Uuid, AssetError> {
    let mut tx = pool.begin().await?;
    let id = Uuid::now_v7();

    sqlx::query(
        r"INSERT INTO assets (id, asset_code, asset_type, category_id, current_station_id, status, condition)
          VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(request.asset_code.trim())
    .bind(request.asset_type)
    .bind(request.category_id)
    .bind(request.current_station_id)
    .bind(request.status.unwrap_or(AssetStatus::InStock))
    .bind(request.condition.unwrap_or(AssetCondition::Good))
    .execute(&mut *tx)
    .await
    .map_err(AssetError::from_write)?;

    match (request.asset_type, &request.device, &request.non_device) {
        (AssetType::Device, Some(device), _) => write_device(&mut tx, id, device).await?,
        (AssetType::NonDevice, _, Some(item)) => write_non_device(&mut tx, id, item).await?,
        _ => {
            return Err(AssetError::Validation(
                "details do not match the asset type".into(),
            ))
        }
    }

    tx.commit().await?;
    Ok(id)
}

#[tracing::instrument(skip(pool, request))]
pub async fn update_asset(
    pool: &PgPool,
    id: Uuid,
    asset_type: AssetType,
    request: &UpdateAssetRequest,
) -> Result<(), AssetError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r"UPDATE assets
          SET category_id = COALESCE($2, category_id),
              current_station_id = COALESCE($3, current_station_id),
              status = COALESCE($4, status),
              condition = COALESCE($5, condition)
          WHERE id = $1",
    )
    .bind(id)
    .bind(request.category_id)
    .bind(request.current_station_id)
    .bind(request.status)
    .bind(request.condition)
    .execute(&mut *tx)
    .await
    .map_err(AssetError::from_write)?;

    if result.rows_affected() == 0 {
        return Err(AssetError::NotFound);
    }

    match asset_type {
        AssetType::Device => {
            if request.non_device.is_some() {
                return Err(AssetError::Validation(
                    "a DEVICE asset cannot carry non_device details".into(),
                ));
            }
            if let Some(device) = &request.device {
                write_device(&mut tx, id, device).await?;
            }
        }
        AssetType::NonDevice => {
            if request.device.is_some() {
                return Err(AssetError::Validation(
                    "a NON_DEVICE asset cannot carry device details".into(),
                ));
            }
            if let Some(item) = &request.non_device {
                write_non_device(&mut tx, id, item).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(())
}

#[tracing::instrument(skip(pool))]
pub async fn delete_asset(pool: &PgPool, id: Uuid) -> Result<(), AssetError> {
    let result = sqlx::query("DELETE FROM assets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AssetError::NotFound);
    }
    Ok(())
}
