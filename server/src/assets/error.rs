//! Asset Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::permissions::PermissionError;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found")]
    NotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Device type not found")]
    DeviceTypeNotFound,

    #[error("Station not found")]
    StationNotFound,

    #[error("Station is outside your scope")]
    StationOutOfScope,

    #[error("Asset code already in use")]
    DuplicateCode,

    #[error("Serial number already registered")]
    DuplicateSerial,

    #[error("Name already in use")]
    DuplicateName,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AssetError {
    /// Map constraint violations raised by a write onto domain errors.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        let Some(db) = err.as_database_error() else {
            return Self::Database(err);
        };

        if db.is_foreign_key_violation() {
            return match db.constraint() {
                Some("assets_category_id_fkey" | "device_types_category_id_fkey") => {
                    Self::CategoryNotFound
                }
                Some("devices_device_type_id_fkey") => Self::DeviceTypeNotFound,
                Some("assets_current_station_id_fkey") => Self::StationNotFound,
                _ => Self::Database(err),
            };
        }
        if !db.is_unique_violation() {
            return Self::Database(err);
        }

        match db.constraint() {
            Some("assets_asset_code_key") => Self::DuplicateCode,
            Some("devices_serial_number_key") => Self::DuplicateSerial,
            Some("asset_categories_name_key" | "device_types_name_key") => Self::DuplicateName,
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> axum::response::Response {
        if let Self::Permission(err) = self {
            return err.into_response();
        }

        let (status, code) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "asset_not_found"),
            Self::CategoryNotFound => (StatusCode::BAD_REQUEST, "category_not_found"),
            Self::DeviceTypeNotFound => (StatusCode::BAD_REQUEST, "device_type_not_found"),
            Self::StationNotFound => (StatusCode::BAD_REQUEST, "station_not_found"),
            Self::StationOutOfScope => (StatusCode::FORBIDDEN, "station_out_of_scope"),
            Self::DuplicateCode => (StatusCode::CONFLICT, "duplicate_asset_code"),
            Self::DuplicateSerial => (StatusCode::CONFLICT, "duplicate_serial_number"),
            Self::DuplicateName => (StatusCode::CONFLICT, "duplicate_name"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Permission(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::Database(err) => {
                tracing::error!(%err, "Asset database error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal_error", "message": "Internal server error" })),
                )
                    .into_response();
            }
        };

        (
            status,
            Json(json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}
