//! API error types.
//!
//! Errors render as plain-text bodies. Internal failures carry a generic
//! message; the detail is only logged.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use gifcast_media::MediaError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Body for a `/convert` request without a `video` file.
pub const MISSING_FILE_MESSAGE: &str = "No file was uploaded.";

/// Body for a failed conversion.
pub const CONVERSION_FAILED_MESSAGE: &str = "An error occurred during conversion.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("File too large: limit is {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] MediaError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Multipart(e) => e.status(),
            ApiError::Conversion(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> String {
        match self {
            ApiError::MissingFile => MISSING_FILE_MESSAGE.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::PayloadTooLarge { limit_bytes } => format!(
                "File too large. The maximum upload size is {} MiB.",
                limit_bytes / (1024 * 1024)
            ),
            ApiError::Multipart(e) => e.body_text(),
            ApiError::Conversion(_) => CONVERSION_FAILED_MESSAGE.to_string(),
            // Don't expose internal error details
            ApiError::Io(_) | ApiError::Internal(_) => "An internal error occurred.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.body()).into_response()
    }
}
