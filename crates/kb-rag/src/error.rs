//! Error types for the knowledge-base QA system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for knowledge-base operations
pub type Result<T> = std::result::Result<T, Error>;

/// Knowledge-base errors
#[derive(Debug, Error)]
pub enum Error {
    /// The question was empty or whitespace-only
    #[error("Question is empty")]
    EmptyQuery,

    /// A document source could not be fetched or parsed
    #[error("Failed to read source '{location}': {message}")]
    UnreadableSource { location: String, message: String },

    /// No source produced any chunk, so there is nothing to index
    #[error("Knowledge base is empty: no source produced any text")]
    EmptyCorpus,

    /// A vector did not have the expected dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The answer generator could not be reached or returned garbage
    #[error("Answer generator unavailable: {0}")]
    GeneratorUnavailable(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unreadable-source error
    pub fn unreadable(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnreadableSource {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generator error
    pub fn generator(message: impl Into<String>) -> Self {
        Self::GeneratorUnavailable(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error must abort startup instead of being served around
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(self, Error::EmptyCorpus | Error::DimensionMismatch { .. })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::EmptyQuery => (
                StatusCode::BAD_REQUEST,
                "empty_query",
                "Please enter a question.".to_string(),
            ),
            Error::UnreadableSource { .. } => {
                (StatusCode::BAD_GATEWAY, "unreadable_source", self.to_string())
            }
            Error::EmptyCorpus => (
                StatusCode::SERVICE_UNAVAILABLE,
                "empty_corpus",
                self.to_string(),
            ),
            Error::DimensionMismatch { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "dimension_mismatch",
                self.to_string(),
            ),
            Error::GeneratorUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "generator_unavailable", msg.clone())
            }
            Error::Embedding(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "embedding_error", msg.clone())
            }
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Toml(err) => (StatusCode::BAD_REQUEST, "toml_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
