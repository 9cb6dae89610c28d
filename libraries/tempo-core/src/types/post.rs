/// Post domain type and identity rule
use super::{PostId, Song, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Which list a post was fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    /// Everyone's feed
    Feed,
    /// A user's own posting history
    History,
}

/// One shareable audio item
///
/// Equality and hashing use only [`PostId`]: a copy fetched by a later refresh
/// is a distinct value but the same logical post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,

    /// Author, shared between all of the author's posts
    pub user: Arc<User>,

    pub song: Song,

    pub created_at: DateTime<Utc>,

    /// Whether the current user likes this post
    #[serde(default)]
    pub liked: bool,

    #[serde(default)]
    pub like_count: u32,

    /// Set once the current user has listened to the post
    #[serde(default)]
    pub played_once: bool,

    pub category: PostCategory,
}

impl Post {
    /// Create a feed post
    pub fn new(
        id: impl Into<String>,
        user: Arc<User>,
        song: Song,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PostId::new(id),
            user,
            song,
            created_at,
            liked: false,
            like_count: 0,
            played_once: false,
            category: PostCategory::Feed,
        }
    }

    /// Same post with a different category
    pub fn with_category(mut self, category: PostCategory) -> Self {
        self.category = category;
        self
    }

    /// Identity check, independent of mutable flags
    pub fn same_post(&self, other: &Post) -> bool {
        self.id == other.id
    }

    /// Flip `liked`, keeping `like_count` consistent. Returns the new value.
    pub fn toggle_liked(&mut self) -> bool {
        self.liked = !self.liked;
        if self.liked {
            self.like_count = self.like_count.saturating_add(1);
        } else {
            self.like_count = self.like_count.saturating_sub(1);
        }
        self.liked
    }

    /// Take server-owned metadata from a freshly fetched copy
    ///
    /// `played_once` is sticky: once listened, a refresh never clears it.
    pub fn refresh_from(&mut self, fresh: &Post) {
        self.user = Arc::clone(&fresh.user);
        self.song = fresh.song.clone();
        self.created_at = fresh.created_at;
        self.liked = fresh.liked;
        self.like_count = fresh.like_count;
        self.played_once = self.played_once || fresh.played_once;
        self.category = fresh.category;
    }
}

impl PartialEq for Post {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Post {}

impl Hash for Post {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Add/save state of a post's song in the external music library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    NotSaved,
    #[default]
    Unknown,
}
