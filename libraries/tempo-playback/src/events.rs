//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are queued as
//! state changes and drained by the presentation layer:
//! - Play/pause of a post
//! - Like state changes (optimistic, confirmed or reverted)
//! - Add/save state changes
//! - Missing music-library session

use serde::{Deserialize, Serialize};
use tempo_core::{PostId, SaveStatus};

/// Events emitted by the playback coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A post started or stopped playing
    PlayingStateChanged {
        /// Post whose state changed
        post_id: PostId,
        /// Whether it is now playing
        is_playing: bool,
    },

    /// A post's liked flag changed
    LikeStateChanged {
        post_id: PostId,
        liked: bool,
        like_count: u32,
    },

    /// A post's song was saved to or removed from the music library
    AddStateChanged {
        post_id: PostId,
        status: SaveStatus,
    },

    /// An add toggle found no music-library session
    AddUnavailable {
        /// Post the user tried to add
        post_id: PostId,
    },
}

impl PlaybackEvent {
    /// Post this event concerns
    pub fn post_id(&self) -> &PostId {
        match self {
            PlaybackEvent::PlayingStateChanged { post_id, .. }
            | PlaybackEvent::LikeStateChanged { post_id, .. }
            | PlaybackEvent::AddStateChanged { post_id, .. }
            | PlaybackEvent::AddUnavailable { post_id } => post_id,
        }
    }
}
