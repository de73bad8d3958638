use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use sitepulse_core::error::{IngestError, StatsError};

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("site not allowed: {0}")]
    SiteNotAllowed(String),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingField(field) => AppError::MissingField(field),
            IngestError::SiteNotAllowed(site) => AppError::SiteNotAllowed(site),
            IngestError::Store(e) => AppError::Internal(e),
        }
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Store(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "missing_field",
                format!("Missing required field: {field}"),
                Some(*field),
            ),
            AppError::SiteNotAllowed(_) => (
                StatusCode::FORBIDDEN,
                "site_not_allowed",
                "Site not allowed".to_string(),
                None,
            ),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Payload exceeds size limit".to_string(),
                None,
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}
