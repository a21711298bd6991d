//! Account Request/Response Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sr_common::UserCategory;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Database Row Types
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub is_admin: bool,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn category(&self) -> Result<UserCategory, String> {
        self.user_type.parse()
    }
}

/// User joined with whichever profile they have.
#[derive(Debug, FromRow)]
pub struct UserDetailRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub is_admin: bool,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub has_moh_profile: bool,
    pub department: Option<String>,
    pub moh_position: Option<String>,
    pub station_id: Option<Uuid>,
    pub station_name: Option<String>,
    pub station_code: Option<String>,
    pub has_ngo_profile: bool,
    pub organization_name: Option<String>,
    pub ngo_position: Option<String>,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileResponse {
    Moh {
        department: String,
        position: String,
        station_id: Option<Uuid>,
        station_name: Option<String>,
        station_code: Option<String>,
    },
    Ngo {
        organization_name: String,
        position: String,
    },
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub is_admin: bool,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub profile: Option<ProfileResponse>,
}

impl From<UserDetailRow> for UserResponse {
    fn from(row: UserDetailRow) -> Self {
        let profile = if row.has_moh_profile {
            Some(ProfileResponse::Moh {
                department: row.department.unwrap_or_default(),
                position: row.moh_position.unwrap_or_default(),
                station_id: row.station_id,
                station_name: row.station_name,
                station_code: row.station_code,
            })
        } else if row.has_ngo_profile {
            Some(ProfileResponse::Ngo {
                organization_name: row.organization_name.unwrap_or_default(),
                position: row.ngo_position.unwrap_or_default(),
            })
        } else {
            None
        };

        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            user_type: row.user_type,
            is_admin: row.is_admin,
            profile_complete: row.profile_complete,
            created_at: row.created_at,
            profile,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Profile completion for the caller's category.
///
/// Ministry accounts send `department`, `position` and `station_id`;
/// partner accounts send `organization_name` and `position`.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProfileRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub position: String,
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    pub station_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub organization_name: Option<String>,
}
