use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlateError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("Cannot read image: {0}")]
    InvalidImage(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Upload exceeds the maximum file size of {max} bytes")]
    UploadTooLarge { max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: String,
}

impl PlateError {
    pub fn status_code(&self) -> (StatusCode, &'static str) {
        match self {
            PlateError::Initialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            PlateError::InvalidImage(_) => (StatusCode::BAD_REQUEST, "INVALID_IMAGE"),
            PlateError::ImageTooLarge { .. } | PlateError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            PlateError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            PlateError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            PlateError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for PlateError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            detail: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
