//! Error types for playback coordination

use crate::types::SlotId;
use tempo_core::TempoError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio backend failed to prepare, start or pause a stream
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// No slot registered under this handle
    #[error("Unknown view slot: {0}")]
    UnknownSlot(SlotId),

    /// Collaborator failure
    #[error(transparent)]
    Core(#[from] TempoError),
}

impl PlaybackError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
