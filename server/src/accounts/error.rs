//! Account Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::permissions::PermissionError;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User not found")]
    NotFound,

    #[error("Station not found")]
    StationNotFound,

    #[error("Station is outside your scope")]
    StationOutOfScope,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("Stored account is invalid: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AccountError {
    fn into_response(self) -> axum::response::Response {
        if let Self::Permission(err) = self {
            return err.into_response();
        }

        let (status, code, message) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "user_not_found", self.to_string()),
            Self::StationNotFound => (
                StatusCode::BAD_REQUEST,
                "station_not_found",
                self.to_string(),
            ),
            Self::StationOutOfScope => (
                StatusCode::FORBIDDEN,
                "station_out_of_scope",
                self.to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::Permission(_) => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            Self::InvalidRecord(reason) => {
                tracing::error!(%reason, "Unreadable account record");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            Self::Database(err) => {
                tracing::error!(%err, "Account database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
