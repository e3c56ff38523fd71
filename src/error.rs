use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

use crate::assistant::completion::CompletionError;
use crate::config::constants::MAX_TEXT_LENGTH;

#[derive(Debug)]
pub enum WordcraftError {
    // I/O errors
    Io(std::io::Error),

    // History store errors
    Database(String),

    // Completion provider errors
    Completion(CompletionError),

    // Request validation errors
    EmptyText,
    TextTooLong(usize),

    // Internal errors
    Unknown(String),
}

impl fmt::Display for WordcraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordcraftError::Io(e) => write!(f, "I/O error: {}", e),
            WordcraftError::Database(msg) => write!(f, "Database error: {}", msg),
            WordcraftError::Completion(e) => write!(f, "{}", e),
            WordcraftError::EmptyText => write!(f, "Please enter some text."),
            WordcraftError::TextTooLong(len) => write!(
                f,
                "Text is too long: {} characters (maximum {})",
                len, MAX_TEXT_LENGTH
            ),
            WordcraftError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for WordcraftError {}

// Conversions
impl From<std::io::Error> for WordcraftError {
    fn from(err: std::io::Error) -> Self {
        WordcraftError::Io(err)
    }
}

impl From<sqlx::Error> for WordcraftError {
    fn from(err: sqlx::Error) -> Self {
        WordcraftError::Database(err.to_string())
    }
}

impl From<CompletionError> for WordcraftError {
    fn from(err: CompletionError) -> Self {
        WordcraftError::Completion(err)
    }
}

impl From<serde_json::Error> for WordcraftError {
    fn from(err: serde_json::Error) -> Self {
        WordcraftError::Unknown(err.to_string())
    }
}

// Axum integration
impl IntoResponse for WordcraftError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WordcraftError::EmptyText | WordcraftError::TextTooLong(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            WordcraftError::Completion(CompletionError::MissingApiKey) => {
                tracing::warn!("Completion requested without an API key");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            WordcraftError::Completion(ref e) => {
                tracing::warn!(error = %e, "Completion provider failed");
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            WordcraftError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            _ => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, axum::Json(serde_json::json!({
            "status": "error",
            "error": message
        }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WordcraftError>;
