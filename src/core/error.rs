// Centralized error handling for the service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::api::ErrorResponse;

/// Persistence-layer failure, surfaced at the store seam so callers can
/// decide whether it is fatal for the operation it blocks.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Login failures. Unknown email and wrong password map to the same
/// variant so the response never leaks which one failed.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Internal(detail) => {
                tracing::error!(detail = %detail, "login failed with internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
                code: None,
            }),
        )
            .into_response()
    }
}

/// Guard-chain failures, checked in front of every privileged operation.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Please log in")]
    Unauthenticated,

    #[error("You do not have permission to access this resource")]
    Forbidden,

    /// Distinct from Forbidden so clients can present a renew path.
    #[error("Your license is inactive or has expired")]
    LicenseInactive,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GateError::Unauthenticated => (StatusCode::UNAUTHORIZED, None),
            GateError::Forbidden => (StatusCode::FORBIDDEN, None),
            GateError::LicenseInactive => (StatusCode::FORBIDDEN, Some("license_expired")),
            GateError::Internal(detail) => {
                tracing::error!(detail = %detail, "gate check failed with internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
                code: code.map(str::to_string),
            }),
        )
            .into_response()
    }
}

/// Handler-level errors for everything past the guards.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to communicate with bot service: {0}")]
    BotUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Gate(gate) => {
                // Gate errors carry their own body (license code etc.)
                return match gate {
                    GateError::Unauthenticated => GateError::Unauthenticated.into_response(),
                    GateError::Forbidden => GateError::Forbidden.into_response(),
                    GateError::LicenseInactive => GateError::LicenseInactive.into_response(),
                    GateError::Internal(d) => GateError::Internal(d.clone()).into_response(),
                };
            }
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BotUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "request failed with internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error_message = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_message,
                code: None,
            }),
        )
            .into_response()
    }
}
