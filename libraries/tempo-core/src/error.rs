/// Core error types for Tempo
use thiserror::Error;

/// Result type alias using `TempoError`
pub type Result<T> = std::result::Result<T, TempoError>;

/// Core error type shared by every collaborator seam
#[derive(Error, Debug)]
pub enum TempoError {
    /// A fetch, save, remove or status request failed
    #[error("Network error: {0}")]
    Network(String),

    /// A request did not complete in time
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// No music-library session is available
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

}

impl TempoError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a resource unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the failure came from the network layer and may succeed on retry
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = TempoError::not_found("Post", "42");
        assert_eq!(err.to_string(), "Post not found: 42");
    }

    #[test]
    fn network_and_timeout_are_retryable() {
        assert!(TempoError::network("reset").is_network());
        assert!(TempoError::timeout("slow").is_network());
        assert!(!TempoError::unavailable("no session").is_network());
    }
}
