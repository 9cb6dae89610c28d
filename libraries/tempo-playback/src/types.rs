//! Core types for playback coordination

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a registered view slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub(crate) u64);

impl SlotId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Kind of recyclable row a slot renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Row in everyone's feed: author name and avatar
    Feed,
    /// Row in a posting history: post date instead of author
    History,
}

/// Result of a like or add toggle
///
/// None of these is an error: failures degrade to the last valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    /// The remote service confirmed the change
    Applied,
    /// The optimistic change was rolled back after a failed request
    Reverted,
    /// The request failed before anything changed
    Failed,
    /// A toggle for the same post is still in flight
    Rejected,
    /// No music-library session: the caller should start the setup flow
    NeedsSetup,
    /// The service could not tell whether the song is saved
    Unchanged,
}

impl ToggleOutcome {
    pub fn is_applied(self) -> bool {
        self == ToggleOutcome::Applied
    }
}
