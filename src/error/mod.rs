//! Unified error handling for Farmgate Core

use crate::domain::DenialReason;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Error types.
///
/// `UnknownPermission` and `UnknownRole` are configuration errors: the caller
/// asked about an identifier the catalog does not define. They are never a
/// DENY. A DENY is a [`crate::domain::Decision`] value; `Forbidden` only exists
/// for callers that opt into [`crate::policy::DecisionEngine::enforce`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(DenialReason),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason_code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut reason_code = None;
        let (status, error_type, message) = match &self {
            AppError::Forbidden(reason) => {
                // Only the reason is exposed; nothing about the target resource.
                reason_code = Some(reason.code().to_string());
                (StatusCode::FORBIDDEN, "forbidden", reason.message())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::UnknownPermission(_) | AppError::UnknownRole(_) => {
                tracing::error!("Authorization configuration error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "Authorization is misconfigured for this operation".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            reason_code,
        });

        (status, body).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
