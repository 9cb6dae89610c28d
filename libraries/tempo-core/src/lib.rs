//! Tempo Core
//!
//! Platform-agnostic post types, collaborator traits, and error handling for Tempo.
//!
//! This crate provides the foundational building blocks used by the feed and
//! playback coordinators.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Post`, `Song`, `User` and the identifier newtypes
//! - **Collaborator Traits**: `FeedSource`, `MusicLibraryService`, `LikeService`,
//!   `RecentlyViewedStore`
//! - **Error Handling**: Unified `TempoError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Utc;
//! use tempo_core::{Post, Song, User};
//!
//! let user = Arc::new(User::new("1", "annie", "Annie", "Cheng"));
//! let first = Post::new("42", Arc::clone(&user), Song::new("song"), Utc::now());
//! let mut refetched = first.clone();
//! refetched.liked = true;
//!
//! // Identity is the post ID, not the flags
//! assert_eq!(first, refetched);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;
pub mod viewed;

// Re-export commonly used types
pub use error::{Result, TempoError};
pub use traits::{FeedSource, LikeService, MusicLibraryService, RecentlyViewedStore};
pub use viewed::{MemoryRecentlyViewedStore, VIEWED_RETENTION_HOURS};

pub use types::{Post, PostCategory, PostId, SaveStatus, Song, SongId, User, UserId};
