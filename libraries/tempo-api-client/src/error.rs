//! Error types for the Tempo API client.

use tempo_core::TempoError;
use thiserror::Error;

/// Errors that can occur when talking to the Tempo API.
#[derive(Error, Debug)]
pub enum ApiClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No session code, or the server rejected it
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid base URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for API client operations.
pub type Result<T> = std::result::Result<T, ApiClientError>;

impl From<ApiClientError> for TempoError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Request(e) if e.is_timeout() => TempoError::timeout(e.to_string()),
            ApiClientError::ParseError(msg) => {
                TempoError::network(format!("malformed response: {}", msg))
            }
            other => TempoError::network(other.to_string()),
        }
    }
}
