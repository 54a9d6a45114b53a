//! Error responses for the API

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use label_sheet::LabelSheetError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message shown to the user
    pub error: String,
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// The form carried no label file
    #[error("Please upload a label PDF")]
    MissingUpload,

    /// The request body went past the configured size limit
    #[error("Upload is larger than the {} limit", human_size(.limit))]
    UploadTooLarge { limit: usize },

    /// The multipart body could not be read
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// Validation, rasterization or encoding failures from label-sheet
    #[error(transparent)]
    Label(#[from] LabelSheetError),

    /// The blocking worker panicked or was cancelled
    #[error("Processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A response header or body could not be built
    #[error("Failed to build response: {0}")]
    Response(String),
}

impl AppError {
    /// Classify a multipart failure, naming `limit` when the body was too large
    pub fn from_multipart(error: MultipartError, limit: usize) -> Self {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge { limit }
        } else {
            AppError::Multipart(error)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingUpload => StatusCode::BAD_REQUEST,
            AppError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Multipart(e) => e.status(),
            AppError::Label(LabelSheetError::InvalidPdf(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Label(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            AppError::Label(_) | AppError::Task(_) | AppError::Response(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let error_response = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

fn human_size(bytes: &usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    match *bytes {
        b if b >= MB && b % MB == 0 => format!("{} MB", b / MB),
        b if b >= KB && b % KB == 0 => format!("{} KB", b / KB),
        b => format!("{b} bytes"),
    }
}
