//! Feed Events
//!
//! Published by the refresh coordinator for the presentation layer:
//! - `RefreshFinished` exactly once per non-superseded cycle
//! - `LatePostsArrived` when the fetch lands after a timeout already finished the cycle

use crate::types::{CycleId, RefreshOutcome};
use tempo_core::Post;

/// Events emitted by the refresh coordinator
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A cycle reached `Finished`
    RefreshFinished(RefreshOutcome),

    /// Data for a cycle that already finished by timeout
    ///
    /// Never followed by a second `RefreshFinished`; the UI may reload silently.
    LatePostsArrived {
        /// Cycle the data belongs to
        cycle: CycleId,
        /// Posts in server order
        posts: Vec<Post>,
    },
}

impl FeedEvent {
    /// Cycle this event belongs to
    pub fn cycle(&self) -> CycleId {
        match self {
            FeedEvent::RefreshFinished(outcome) => outcome.cycle,
            FeedEvent::LatePostsArrived { cycle, .. } => *cycle,
        }
    }

    pub fn is_refresh_finished(&self) -> bool {
        matches!(self, FeedEvent::RefreshFinished(_))
    }
}
