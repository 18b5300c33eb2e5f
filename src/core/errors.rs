//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The cycle was superseded by a newer submission
    #[error("Request cancelled")]
    Cancelled,

    /// API request failed
    #[error("{message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Body `message`, or the status text when there is none
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport error description
        message: String,
    },

    /// Usage call failed or returned a non-2xx status
    #[error("Usage information unavailable")]
    UsageUnavailable,

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What could not be parsed
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Validation failure
        message: String,
    },

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// Whether this error only signals that the work was superseded
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TranslationError::Cancelled)
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
