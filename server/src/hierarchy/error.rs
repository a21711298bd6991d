//! Hierarchy Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use sr_common::types::hierarchy::ParseError;
use sr_common::CodeError;

use crate::permissions::PermissionError;

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error("Region not found")]
    RegionNotFound,

    #[error("Sub-region not found")]
    SubRegionNotFound,

    #[error("Station not found")]
    StationNotFound,

    #[error("Station code {0} is already assigned")]
    DuplicateCode(String),

    #[error("A station with this address already exists")]
    DuplicateAddress,

    #[error("Name already in use")]
    DuplicateName,

    #[error("Suffix already in use")]
    DuplicateSuffix,

    #[error("Suffix is part of existing station codes and cannot change")]
    SuffixLocked,

    #[error("Station code {stored} cannot become {derived} without a parent change")]
    CodeLocked { stored: String, derived: String },

    #[error("{0} still has dependent records")]
    HasDependents(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(#[from] ParseError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl HierarchyError {
    /// Map constraint violations raised by a write onto domain conflicts.
    pub(crate) fn from_write(err: sqlx::Error, code: Option<&str>) -> Self {
        let Some(db) = err.as_database_error() else {
            return Self::Database(err);
        };

        if db.is_foreign_key_violation() {
            return Self::HasDependents("Record");
        }
        if !db.is_unique_violation() {
            return Self::Database(err);
        }

        match db.constraint() {
            Some("stations_code_key") => {
                Self::DuplicateCode(code.unwrap_or_default().to_string())
            }
            Some("stations_address_key") => Self::DuplicateAddress,
            Some("regions_name_key") => Self::DuplicateName,
            Some(
                "regions_suffix_key"
                | "regions_single_national"
                | "subregions_region_id_suffix_key",
            ) => {
                Self::DuplicateSuffix
            }
            _ => Self::Database(err),
        }
    }
}

impl IntoResponse for HierarchyError {
    fn into_response(self) -> axum::response::Response {
        if let Self::Permission(err) = self {
            return err.into_response();
        }

        let (status, code) = match &self {
            Self::Code(err) => (StatusCode::BAD_REQUEST, err.reason()),
            Self::RegionNotFound => (StatusCode::NOT_FOUND, "region_not_found"),
            Self::SubRegionNotFound => (StatusCode::NOT_FOUND, "subregion_not_found"),
            Self::StationNotFound => (StatusCode::NOT_FOUND, "station_not_found"),
            Self::DuplicateCode(_) => (StatusCode::CONFLICT, "duplicate_code"),
            Self::DuplicateAddress => (StatusCode::CONFLICT, "duplicate_address"),
            Self::DuplicateName => (StatusCode::CONFLICT, "duplicate_name"),
            Self::DuplicateSuffix => (StatusCode::CONFLICT, "duplicate_suffix"),
            Self::SuffixLocked => (StatusCode::CONFLICT, "suffix_locked"),
            Self::CodeLocked { .. } => (StatusCode::CONFLICT, "code_locked"),
            Self::HasDependents(_) => (StatusCode::CONFLICT, "has_dependents"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Permission(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Self::InvalidRecord(err) => {
                tracing::error!(%err, "Unreadable hierarchy record");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            Self::Database(err) => {
                tracing::error!(%err, "Hierarchy database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = match &self {
            Self::InvalidRecord(_) | Self::Database(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
