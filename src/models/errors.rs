use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or empty input, detected before any external call.
    #[error("{message}")]
    ValidationError { message: String },

    #[error("File exceeds maximum size of {max_size} bytes")]
    PayloadTooLarge { max_size: usize },

    /// An uploaded report that is not a readable Word document.
    #[error("Invalid DOCX file: {message}")]
    InvalidDocument { message: String },

    #[error("Processing timeout: operation took longer than {timeout_seconds} seconds")]
    TimeoutError { timeout_seconds: u64 },

    #[error("{message}")]
    ConfigurationError { message: String },

    /// Failure reported by the document database client.
    #[error("{message}")]
    DocumentStoreError { message: String },

    /// Failure reported by the object storage client.
    #[error("{message}")]
    ObjectStoreError { message: String },

    #[error("{message}")]
    InternalError { message: String },
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationError { message: message.into() }
    }

    pub fn payload_too_large(max_size: usize) -> Self {
        Self::PayloadTooLarge { max_size }
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument { message: message.into() }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::TimeoutError { timeout_seconds }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError { message: message.into() }
    }

    pub fn missing_config(variable: &str) -> Self {
        Self::ConfigurationError {
            message: format!("{} is not configured", variable),
        }
    }

    pub fn document_store_failed(message: impl Into<String>) -> Self {
        Self::DocumentStoreError { message: message.into() }
    }

    pub fn object_store_failed(message: impl Into<String>) -> Self {
        Self::ObjectStoreError { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TimeoutError { .. } => StatusCode::REQUEST_TIMEOUT,
            AppError::ConfigurationError { .. }
            | AppError::DocumentStoreError { .. }
            | AppError::ObjectStoreError { .. }
            | AppError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
