//! Hierarchy Request/Response Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sr_common::types::hierarchy::ParseError;
use sr_common::{Region, Station, StationCode, StationTier, SubRegion, Suffix};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, FromRow)]
pub struct RegionRow {
    pub id: Uuid,
    pub name: String,
    pub suffix: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RegionRow> for Region {
    type Error = ParseError;

    fn try_from(row: RegionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            suffix: row.suffix.as_deref().map(Suffix::parse).transpose()?,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SubRegionRow {
    pub id: Uuid,
    pub name: String,
    pub suffix: String,
    pub region_id: Uuid,
    pub region_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&SubRegionRow> for SubRegion {
    type Error = ParseError;

    fn try_from(row: &SubRegionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name.clone(),
            suffix: Suffix::parse(&row.suffix)?,
            region_id: row.region_id,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct StationRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tier: String,
    pub region_id: Option<Uuid>,
    pub subregion_id: Option<Uuid>,
    pub suffix: String,
    pub code: String,
}

impl TryFrom<StationRow> for Station {
    type Error = ParseError;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            tier: row.tier.parse()?,
            region_id: row.region_id,
            subregion_id: row.subregion_id,
            suffix: Suffix::parse(&row.suffix)?,
            code: StationCode::parse(&row.code)?,
        })
    }
}

/// Station joined with its parents' names.
#[derive(Debug, FromRow)]
pub struct StationListRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tier: String,
    pub region_id: Option<Uuid>,
    pub region_name: Option<String>,
    pub subregion_id: Option<Uuid>,
    pub subregion_name: Option<String>,
    pub suffix: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegionResponse {
    pub id: Uuid,
    pub name: String,
    pub suffix: Option<String>,
    /// Suffix used in station codes (`00` for the national region).
    pub code_suffix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RegionRow> for RegionResponse {
    fn from(row: RegionRow) -> Self {
        let code_suffix = row
            .suffix
            .clone()
            .unwrap_or_else(|| sr_common::NATIONAL_REGION_SUFFIX.to_string());
        Self {
            id: row.id,
            name: row.name,
            suffix: row.suffix,
            code_suffix,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubRegionResponse {
    pub id: Uuid,
    pub name: String,
    pub suffix: String,
    pub region_id: Uuid,
    pub region_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubRegionRow> for SubRegionResponse {
    fn from(row: SubRegionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            suffix: row.suffix,
            region_id: row.region_id,
            region_name: row.region_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StationResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub tier: String,
    pub tier_display: String,
    pub region_id: Option<Uuid>,
    pub region_name: Option<String>,
    pub subregion_id: Option<Uuid>,
    pub subregion_name: Option<String>,
    pub suffix: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StationListRow> for StationResponse {
    fn from(row: StationListRow) -> Self {
        let tier_display = row
            .tier
            .parse::<StationTier>()
            .map_or_else(|_| row.tier.clone(), |t| t.display_name().to_string());
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            tier: row.tier,
            tier_display,
            region_id: row.region_id,
            region_name: row.region_name,
            subregion_id: row.subregion_id,
            subregion_name: row.subregion_name,
            suffix: row.suffix,
            code: row.code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Code re-derived from a station's stored parents.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CodeCheckResponse {
    pub station_id: Uuid,
    pub stored: String,
    pub derived: String,
    pub consistent: bool,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateRegionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[schema(value_type = Option<String>, example = "01")]
    pub suffix: Option<Suffix>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateRegionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub suffix: Option<Suffix>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSubRegionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[schema(value_type = String, example = "02")]
    pub suffix: Suffix,
    pub region_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSubRegionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub suffix: Option<Suffix>,
}

/// Full station definition, used for both create and replace.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct StationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[schema(value_type = String, example = "FACILITY")]
    pub tier: StationTier,
    pub region_id: Option<Uuid>,
    pub subregion_id: Option<Uuid>,
    /// Facility suffix. Office tiers fill theirs automatically.
    #[schema(value_type = Option<String>, example = "0A")]
    pub suffix: Option<Suffix>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct SubRegionQuery {
    pub region_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct StationQuery {
    pub region_id: Option<Uuid>,
    pub subregion_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub tier: Option<StationTier>,
}
