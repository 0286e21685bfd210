//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type.
///
/// The first three variants are the terminal outcomes for a single scanner
/// file: nothing recognised it, a builder could not interpret it, or the
/// import endpoint refused it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("File format not recognized")]
    UnrecognizedFormat,

    #[error("Build error: {0}")]
    Build(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Short machine-readable code used in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedFormat => "UNRECOGNIZED_FORMAT",
            Self::Build(_) => "BUILD_ERROR",
            Self::Import(_) => "IMPORT_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        Self::Import(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::UnrecognizedFormat | AppError::Build(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Import(msg) => {
                tracing::warn!(error = %msg, "Import error");
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Config(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, code = self.code(), "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, ApiResponse::<()>::error(self.code(), &message)).into_response()
    }
}
