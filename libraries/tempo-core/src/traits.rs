/// Collaborator traits consumed by the feed and playback coordinators
use crate::error::Result;
use crate::types::{Post, PostId, SaveStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Source of the ordered post list (newest first)
///
/// No retry policy is imposed here; callers retry at a higher level.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current feed
    ///
    /// # Errors
    /// Returns a network error if the request fails or the payload is malformed
    async fn fetch_feed(&self) -> Result<Vec<Post>>;
}

/// External music library the user can save songs into
///
/// Every call is asynchronous and may fail; failures are reported through
/// `Result`, never as a fatal condition.
#[async_trait]
pub trait MusicLibraryService: Send + Sync {
    /// Whether a usable library session exists
    async fn available(&self) -> Result<bool>;

    /// Current save status of the post's song
    async fn status(&self, post: &Post) -> Result<SaveStatus>;

    /// Save the post's song. `Ok(false)` means the service declined.
    async fn save(&self, post: &Post) -> Result<bool>;

    /// Remove the post's song. `Ok(false)` means the service declined.
    async fn remove(&self, post: &Post) -> Result<bool>;
}

/// Remote like/unlike endpoint
#[async_trait]
pub trait LikeService: Send + Sync {
    /// Record a like (`unlike == false`) or an unlike for a post
    async fn update_like(&self, post_id: &PostId, unlike: bool) -> Result<bool>;
}

/// Flat map of post identifiers the user already listened to
///
/// Entries older than 24 hours are dropped lazily on read or write.
pub trait RecentlyViewedStore: Send + Sync {
    /// Record that `post_id` was listened to at `at`
    fn mark_viewed(&self, post_id: &PostId, at: DateTime<Utc>);

    /// Whether `post_id` was listened to within the 24 hours before `now`
    fn is_viewed_at(&self, post_id: &PostId, now: DateTime<Utc>) -> bool;

    /// Whether `post_id` was listened to within the last 24 hours
    fn is_viewed(&self, post_id: &PostId) -> bool {
        self.is_viewed_at(post_id, Utc::now())
    }
}
