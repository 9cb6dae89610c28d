//! Tempo - Playback Coordination
//!
//! Platform-agnostic "single active player" coordination for the feed.
//!
//! This crate provides:
//! - At most one playing post at a time, across any number of list rows
//! - Recyclable view slots that are told, never asked, whether they play
//! - Optimistic like toggles with rollback on failure
//! - Music-library add toggles guarded against concurrent requests
//! - Continuity of the playing post across feed refreshes
//!
//! # Architecture
//!
//! `tempo-playback` has no UI or audio dependency:
//! - Audio output is provided through [`AudioBackend`]
//! - Rows implement [`ViewSlot`]
//! - Network services come in as `tempo-core` traits
//!
//! # Example: Playing a post
//!
//! ```rust
//! use std::sync::Arc;
//! use tempo_core::{MemoryRecentlyViewedStore, Post, Song, User};
//! # use tempo_core::{LikeService, MusicLibraryService, PostId, SaveStatus, Result};
//! # struct Offline;
//! # #[async_trait::async_trait]
//! # impl MusicLibraryService for Offline {
//! #     async fn available(&self) -> Result<bool> { Ok(false) }
//! #     async fn status(&self, _: &Post) -> Result<SaveStatus> { Ok(SaveStatus::Unknown) }
//! #     async fn save(&self, _: &Post) -> Result<bool> { Ok(false) }
//! #     async fn remove(&self, _: &Post) -> Result<bool> { Ok(false) }
//! # }
//! # #[async_trait::async_trait]
//! # impl LikeService for Offline {
//! #     async fn update_like(&self, _: &PostId, _: bool) -> Result<bool> { Ok(true) }
//! # }
//! use tempo_playback::{FeedRowSlot, PlaybackCoordinator, SilentBackend};
//!
//! let coordinator = PlaybackCoordinator::new(
//!     Box::new(SilentBackend::new()),
//!     Arc::new(Offline),
//!     Arc::new(Offline),
//!     Arc::new(MemoryRecentlyViewedStore::new()),
//! );
//!
//! let row = Arc::new(FeedRowSlot::new());
//! let slot = coordinator.register_slot(row.clone());
//!
//! let mut song = Song::new("4uLU6hMCjMI75M1A2tKUQC");
//! song.preview_url = Some("https://p.scdn.co/mp3-preview/abc".to_string());
//! let post = Post::new("p1", Arc::new(User::new("u1", "annie", "Annie", "Cheng")), song, chrono::Utc::now());
//!
//! coordinator.bind(slot, &post).unwrap();
//! coordinator.play(&post).unwrap();
//! assert!(row.render().is_playing);
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod slot;
pub mod types;

pub use backend::{AudioBackend, SilentBackend};
pub use coordinator::PlaybackCoordinator;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use slot::{
    FeedRow, FeedRowSlot, HistoryRow, HistoryRowSlot, PlayButton, RowSlot, RowVariant, SlotRender,
    ViewSlot,
};
pub use types::{SlotId, SlotKind, ToggleOutcome};
