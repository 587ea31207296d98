use lambda_http::http::StatusCode;
use thiserror::Error;

use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Book not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Attachment error: {0}")]
    Attachment(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookError::NotFound(_) => StatusCode::NOT_FOUND,
            BookError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BookError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BookError::Storage(_) | BookError::Attachment(_) | BookError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable name used in the `error` field of JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            BookError::NotFound(_) => "NotFound",
            BookError::InvalidRequest(_) => "InvalidRequest",
            BookError::Unauthorized(_) => "Unauthorized",
            BookError::Storage(_) => "StorageError",
            BookError::Attachment(_) => "AttachmentError",
            BookError::Config(_) => "ConfigError",
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for BookError {
    fn from(e: serde_json::Error) -> Self {
        BookError::InvalidRequest(format!("Invalid request body: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, BookError>;
