//! Error types for feed refresh

use std::time::Duration;
use thiserror::Error;

/// Refresh errors
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The timeout must be strictly longer than the minimum display delay
    #[error("Invalid refresh timings: timeout {timeout:?} must exceed minimum delay {min_delay:?}")]
    InvalidTimings {
        min_delay: Duration,
        timeout: Duration,
    },

    /// A newer refresh replaced this one before it finished
    #[error("Refresh cycle {0} was superseded")]
    Superseded(u64),
}

/// Result type for refresh operations
pub type Result<T> = std::result::Result<T, RefreshError>;
