//! Footer layout chosen from the size of a refreshed feed

use serde::{Deserialize, Serialize};

/// Feeds shorter than this show follow suggestions under the posts
pub const SPARSE_FEED_THRESHOLD: usize = 3;

/// What the feed screen shows around the post list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedLayout {
    /// No posts: "no more posts" label plus follow suggestions
    EmptyWithSuggestions,
    /// A few posts: follow suggestions as footer, no label
    SparseWithSuggestions,
    /// Enough posts: plain list
    Plain,
}

impl FeedLayout {
    pub fn for_post_count(count: usize) -> Self {
        match count {
            0 => FeedLayout::EmptyWithSuggestions,
            n if n < SPARSE_FEED_THRESHOLD => FeedLayout::SparseWithSuggestions,
            _ => FeedLayout::Plain,
        }
    }

    pub fn shows_suggestions(self) -> bool {
        !matches!(self, FeedLayout::Plain)
    }
}
