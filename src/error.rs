use axum::{Json, http::StatusCode, response::IntoResponse};
use qrcode::types::QrError;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum QrgenError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("table '{name}' not found")]
    UnknownTable {
        name: String,
        available: Vec<String>,
    },

    #[error("record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Storage(#[from] SqlxError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("QR encoding error: {0}")]
    Encoding(#[from] QrError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl QrgenError {
    pub fn status(&self) -> StatusCode {
        match self {
            QrgenError::Validation(_) => StatusCode::BAD_REQUEST,
            QrgenError::UnknownTable { .. } | QrgenError::NotFound => StatusCode::NOT_FOUND,
            QrgenError::InvalidCredentials | QrgenError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            QrgenError::Storage(_)
            | QrgenError::Encoding(_)
            | QrgenError::Image(_)
            | QrgenError::Json(_)
            | QrgenError::Template(_)
            | QrgenError::Config(_)
            | QrgenError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Backend details only go to the log.
    pub fn public_message(&self) -> String {
        match self {
            QrgenError::Validation(msg) => msg.clone(),
            QrgenError::UnknownTable { name, .. } => format!("Table '{name}' not found."),
            QrgenError::NotFound => "Not found".to_string(),
            QrgenError::InvalidCredentials => "Invalid credentials".to_string(),
            QrgenError::Unauthenticated => "Authentication required".to_string(),
            QrgenError::Storage(_) => "A database error occurred.".to_string(),
            QrgenError::Encoding(_) | QrgenError::Image(_) => {
                "Failed to generate QR code.".to_string()
            }
            QrgenError::Json(_)
            | QrgenError::Template(_)
            | QrgenError::Config(_)
            | QrgenError::Task(_) => "An internal server error occurred.".to_string(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            QrgenError::Validation(_) => "VALIDATION_ERROR",
            QrgenError::UnknownTable { .. } => "UNKNOWN_TABLE",
            QrgenError::NotFound => "NOT_FOUND",
            QrgenError::InvalidCredentials => "INVALID_CREDENTIALS",
            QrgenError::Unauthenticated => "UNAUTHENTICATED",
            QrgenError::Encoding(_) | QrgenError::Image(_) => "ENCODING_ERROR",
            QrgenError::Storage(_)
            | QrgenError::Json(_)
            | QrgenError::Template(_)
            | QrgenError::Config(_)
            | QrgenError::Task(_) => "INTERNAL_ERROR",
        }
    }

    /// Log internal failures before they are flattened into an opaque response.
    pub fn log_internal(&self) {
        if self.status().is_server_error() {
            error!(error = %self, "request failed");
        }
    }
}

impl IntoResponse for QrgenError {
    fn into_response(self) -> axum::response::Response {
        self.log_internal();
        let status = self.status();
        let body = ApiErrorBody {
            code: self.code().to_string(),
            message: self.public_message(),
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
