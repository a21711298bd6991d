//! Account persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};
use sr_common::{Scope, UserCategory};
use uuid::Uuid;

use super::error::AccountError;
use super::types::{ProfileRequest, UserDetailRow, UserRow};
use crate::permissions::ResourceScope;

const USER_DETAIL_SELECT: &str = r"SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                 u.user_type, u.is_admin, u.profile_complete, u.created_at,
                 (p.user_id IS NOT NULL) AS has_moh_profile,
                 p.department, p.position AS moh_position,
                 p.station_id, s.name AS station_name, s.code AS station_code,
                 (n.user_id IS NOT NULL) AS has_ngo_profile,
                 n.organization_name, n.position AS ngo_position
          FROM users u
          LEFT JOIN moh_profiles p ON p.user_id = u.id
          LEFT JOIN stations s ON s.id = p.station_id
          LEFT JOIN ngo_profiles n ON n.user_id = u.id";

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r"SELECT id, username, email, first_name, last_name, user_type, is_admin,
                 profile_complete, created_at
          FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(skip(pool))]
pub async fn find_user_detail(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<UserDetailRow>, sqlx::Error> {
    sqlx::query_as::<_, UserDetailRow>(&format!("{USER_DETAIL_SELECT} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Users visible under `scope`, optionally narrowed to one id.
#[tracing::instrument(skip(pool, resource))]
pub async fn list_users_in_scope(
    pool: &PgPool,
    resource: &ResourceScope,
    scope: &Scope,
    id: Option<Uuid>,
) -> Result<Vec<UserDetailRow>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(USER_DETAIL_SELECT);
    builder.push(" WHERE ");
    resource.push_filter(&mut builder, scope);
    if let Some(id) = id {
        builder.push(" AND u.id = ");
        builder.push_bind(id);
    }
    builder.push(" ORDER BY u.username");

    builder.build_query_as().fetch_all(pool).await
}

/// Create or replace the profile matching `category` and mark it complete.
#[tracing::instrument(skip(pool, request))]
pub async fn save_profile(
    pool: &PgPool,
    user_id: Uuid,
    category: UserCategory,
    request: &ProfileRequest,
) -> Result<(), AccountError> {
    let mut tx = pool.begin().await?;

    match category {
        UserCategory::Moh => {
            let department = request
                .department
                .as_deref()
                .ok_or_else(|| AccountError::Validation("department is required".into()))?;
            let station_id = request
                .station_id
                .ok_or_else(|| AccountError::Validation("station_id is required".into()))?;

            let station_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stations WHERE id = $1)")
                    .bind(station_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !station_exists {
                return Err(AccountError::StationNotFound);
            }

            sqlx::query(
                r"INSERT INTO moh_profiles (user_id, department, position, station_id)
                  VALUES ($1, $2, $3, $4)
                  ON CONFLICT (user_id) DO UPDATE
                  SET department = EXCLUDED.department, position = EXCLUDED.position,
                      station_id = EXCLUDED.station_id, updated_at = NOW()",
            )
            .bind(user_id)
            .bind(department.trim())
            .bind(request.position.trim())
            .bind(station_id)
            .execute(&mut *tx)
            .await?;
        }
        UserCategory::Ngo => {
            let organization_name = request.organization_name.as_deref().ok_or_else(|| {
                AccountError::Validation("organization_name is required".into())
            })?;

            sqlx::query(
                r"INSERT INTO ngo_profiles (user_id, organization_name, position)
                  VALUES ($1, $2, $3)
                  ON CONFLICT (user_id) DO UPDATE
                  SET organization_name = EXCLUDED.organization_name,
                      position = EXCLUDED.position, updated_at = NOW()",
            )
            .bind(user_id)
            .bind(organization_name.trim())
            .bind(request.position.trim())
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query(
        r"UPDATE users
          SET first_name = COALESCE($2, first_name), last_name = COALESCE($3, last_name),
              profile_complete = TRUE
          WHERE id = $1",
    )
    .bind(user_id)
    .bind(request.first_name.as_deref().map(str::trim))
    .bind(request.last_name.as_deref().map(str::trim))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
