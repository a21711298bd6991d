//! Asset Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sr_common::{StationTier, StationView};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Database Enums
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "asset_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Device,
    NonDevice,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "asset_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    InStock,
    Assigned,
    Maintenance,
    Disposed,
    Stolen,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[sqlx(type_name = "asset_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    New,
    Good,
    Fair,
    Damaged,
    BeyondRepair,
}

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct DeviceTypeRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub category_name: String,
}

/// Asset joined with its category, station and type-specific details.
#[derive(Debug, FromRow)]
pub struct AssetRow {
    pub id: Uuid,
    pub asset_code: String,
    pub asset_type: AssetType,
    pub category_id: Uuid,
    pub category_name: String,
    pub current_station_id: Option<Uuid>,
    pub station_name: Option<String>,
    pub station_code: Option<String>,
    pub station_tier: Option<String>,
    pub station_region_id: Option<Uuid>,
    pub station_subregion_id: Option<Uuid>,
    pub status: AssetStatus,
    pub condition: AssetCondition,
    pub created_at: DateTime<Utc>,
    pub device_type_id: Option<Uuid>,
    pub device_type_name: Option<String>,
    pub serial_number: Option<String>,
    pub program: Option<String>,
    pub partner: Option<String>,
    pub partner_number: Option<String>,
    pub device_notes: Option<String>,
    pub item_name: Option<String>,
    pub quantity: Option<i32>,
    pub item_notes: Option<String>,
}

impl AssetRow {
    /// Where the asset currently sits, for scope checks.
    pub fn station_view(&self) -> Option<StationView> {
        let id = self.current_station_id?;
        let tier = self.station_tier.as_deref()?.parse::<StationTier>().ok()?;
        Some(StationView {
            id,
            tier,
            region_id: self.station_region_id,
            subregion_id: self.station_subregion_id,
        })
    }
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeviceDetails {
    pub device_type_id: Uuid,
    pub device_type_name: String,
    pub serial_number: String,
    pub program: Option<String>,
    pub partner: Option<String>,
    pub partner_number: Option<String>,
    pub additional_notes: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NonDeviceDetails {
    pub name: String,
    pub quantity: i32,
    pub additional_notes: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AssetResponse {
    pub id: Uuid,
    pub asset_code: String,
    pub asset_type: AssetType,
    pub category_id: Uuid,
    pub category_name: String,
    pub current_station_id: Option<Uuid>,
    pub station_name: Option<String>,
    pub station_code: Option<String>,
    pub status: AssetStatus,
    pub condition: AssetCondition,
    pub created_at: DateTime<Utc>,
    pub device: Option<DeviceDetails>,
    pub non_device: Option<NonDeviceDetails>,
}

impl From<AssetRow> for AssetResponse {
    fn from(row: AssetRow) -> Self {
        let device = match (row.device_type_id, row.serial_number) {
            (Some(device_type_id), Some(serial_number)) => Some(DeviceDetails {
                device_type_id,
                device_type_name: row.device_type_name.unwrap_or_default(),
                serial_number,
                program: row.program,
                partner: row.partner,
                partner_number: row.partner_number,
                additional_notes: row.device_notes.unwrap_or_default(),
            }),
            _ => None,
        };
        let non_device = row.item_name.map(|name| NonDeviceDetails {
            name,
            quantity: row.quantity.unwrap_or_default(),
            additional_notes: row.item_notes.unwrap_or_default(),
        });

        Self {
            id: row.id,
            asset_code: row.asset_code,
            asset_type: row.asset_type,
            category_id: row.category_id,
            category_name: row.category_name,
            current_station_id: row.current_station_id,
            station_name: row.station_name,
            station_code: row.station_code,
            status: row.status,
            condition: row.condition,
            created_at: row.created_at,
            device,
            non_device,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateDeviceTypeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct DeviceInput {
    pub device_type_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub serial_number: String,
    #[validate(length(max = 100))]
    pub program: Option<String>,
    #[validate(length(max = 100))]
    pub partner: Option<String>,
    #[validate(length(max = 100))]
    pub partner_number: Option<String>,
    #[validate(length(max = 2000))]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct NonDeviceInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(length(max = 2000))]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 50))]
    pub asset_code: String,
    pub asset_type: AssetType,
    pub category_id: Uuid,
    pub current_station_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    #[validate(nested)]
    pub device: Option<DeviceInput>,
    #[validate(nested)]
    pub non_device: Option<NonDeviceInput>,
}

impl CreateAssetRequest {
    /// The details block must match the asset type.
    pub fn check_details(&self) -> Result<(), String> {
        match self.asset_type {
            AssetType::Device if self.device.is_none() => {
                Err("device details are required for a DEVICE asset".into())
            }
            AssetType::NonDevice if self.non_device.is_none() => {
                Err("non_device details are required for a NON_DEVICE asset".into())
            }
            AssetType::Device if self.non_device.is_some() => {
                Err("a DEVICE asset cannot carry non_device details".into())
            }
            AssetType::NonDevice if self.device.is_some() => {
                Err("a NON_DEVICE asset cannot carry device details".into())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateAssetRequest {
    pub category_id: Option<Uuid>,
    pub current_station_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    #[validate(nested)]
    pub device: Option<DeviceInput>,
    #[validate(nested)]
    pub non_device: Option<NonDeviceInput>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct AssetQuery {
    pub asset_type: Option<AssetType>,
    pub category_id: Option<Uuid>,
    pub station_id: Option<Uuid>,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    /// Matches asset code, serial number or program.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(asset_type: AssetType) -> CreateAssetRequest {
        CreateAssetRequest {
            asset_code: "AST-001".into(),
            asset_type,
            category_id: Uuid::new_v4(),
            current_station_id: None,
            status: None,
            condition: None,
            device: None,
            non_device: None,
        }
    }

    fn device() -> DeviceInput {
        DeviceInput {
            device_type_id: Uuid::new_v4(),
            serial_number: "SN-1".into(),
            program: None,
            partner: None,
            partner_number: None,
            additional_notes: None,
        }
    }

    #[test]
    fn test_device_requires_device_details() {
        let mut req = request(AssetType::Device);
        assert!(req.check_details().is_err());
        req.device = Some(device());
        assert!(req.check_details().is_ok());
    }

    #[test]
    fn test_non_device_requires_item_details() {
        let mut req = request(AssetType::NonDevice);
        assert!(req.check_details().is_err());
        req.non_device = Some(NonDeviceInput {
            name: "Cold box".into(),
            quantity: 3,
            additional_notes: None,
        });
        assert!(req.check_details().is_ok());
        req.device = Some(device());
        assert!(req.check_details().is_err());
    }

    #[test]
    fn test_nested_validation() {
        let mut req = request(AssetType::Device);
        let mut details = device();
        details.serial_number = String::new();
        req.device = Some(details);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(
            serde_json::to_value(AssetType::NonDevice).unwrap(),
            "NON_DEVICE"
        );
        assert_eq!(
            serde_json::to_value(AssetCondition::BeyondRepair).unwrap(),
            "beyond_repair"
        );
    }
}
