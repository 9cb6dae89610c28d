//! View slot contract
//!
//! Every recyclable row implements [`ViewSlot`]. A slot never decides whether
//! it is playing: the coordinator tells it, and the slot only keeps what it was
//! last told.

use crate::types::SlotKind;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempo_core::{Post, PostId, SaveStatus};

/// Capability set of a recyclable list row
///
/// All `update_*` methods must be idempotent. Implementations must not call
/// back into the coordinator from these methods.
pub trait ViewSlot: Send + Sync {
    /// Which row variant this is
    fn kind(&self) -> SlotKind;

    /// One-time resource initialisation, invoked once per slot instance
    fn setup(&self);

    /// Refresh every visual field from `post`
    fn update_cell_info(&self, post: &Post);

    /// Render saved vs. not saved
    fn update_saved_status(&self, status: SaveStatus);

    /// Record whether the bound post is playing and refresh the play button
    fn update_playing_status(&self, is_playing: bool);

    /// Visual update of the play/pause button only
    fn update_play_toggle_button(&self, is_playing: bool);

    /// Render the like button and counter
    fn update_liked_status(&self, liked: bool, like_count: u32);

    /// Forget the bound post and return to the blank state
    fn reset_player_cell(&self);
}

/// Icon shown on the play toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayButton {
    #[default]
    Play,
    Pause,
}

/// Everything a row currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRender {
    pub post_id: Option<PostId>,
    /// Author name on feed rows, post date on history rows
    pub headline: String,
    pub title: String,
    pub artist: String,
    pub liked: bool,
    pub like_count: u32,
    pub played_once: bool,
    pub is_playing: bool,
    pub play_button: PlayButton,
    pub save_status: SaveStatus,
    /// Number of `setup` calls received; stays 1 across rebinds
    pub setup_calls: u32,
}

/// Row-specific parts of a [`RowSlot`]
pub trait RowVariant: Send + Sync + 'static {
    const KIND: SlotKind;

    /// Text shown above the song
    fn headline(post: &Post) -> String;
}

/// Everyone's feed: the author's name
#[derive(Debug)]
pub struct FeedRow;

impl RowVariant for FeedRow {
    const KIND: SlotKind = SlotKind::Feed;

    fn headline(post: &Post) -> String {
        post.user.display_name()
    }
}

/// A posting history: the post date instead of the author
#[derive(Debug)]
pub struct HistoryRow;

impl RowVariant for HistoryRow {
    const KIND: SlotKind = SlotKind::History;

    fn headline(post: &Post) -> String {
        post.created_at.format("%b %-d, %Y").to_string()
    }
}

/// In-memory row that keeps what it was last told to show
#[derive(Debug)]
pub struct RowSlot<V> {
    state: Mutex<SlotRender>,
    variant: PhantomData<fn() -> V>,
}

/// Row in everyone's feed
pub type FeedRowSlot = RowSlot<FeedRow>;

/// Row in a user's posting history
pub type HistoryRowSlot = RowSlot<HistoryRow>;

impl<V: RowVariant> RowSlot<V> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotRender::default()),
            variant: PhantomData,
        }
    }

    /// Snapshot of what the row shows
    pub fn render(&self) -> SlotRender {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, SlotRender> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: RowVariant> Default for RowSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: RowVariant> ViewSlot for RowSlot<V> {
    fn kind(&self) -> SlotKind {
        V::KIND
    }

    fn setup(&self) {
        self.state().setup_calls += 1;
    }

    fn update_cell_info(&self, post: &Post) {
        let mut render = self.state();
        render.post_id = Some(post.id.clone());
        render.headline = V::headline(post);
        render.title = post.song.title.clone();
        render.artist = post.song.artist.clone();
        render.liked = post.liked;
        render.like_count = post.like_count;
        render.played_once = post.played_once;
    }

    fn update_saved_status(&self, status: SaveStatus) {
        self.state().save_status = status;
    }

    fn update_playing_status(&self, is_playing: bool) {
        self.state().is_playing = is_playing;
        self.update_play_toggle_button(is_playing);
    }

    fn update_play_toggle_button(&self, is_playing: bool) {
        self.state().play_button = if is_playing {
            PlayButton::Pause
        } else {
            PlayButton::Play
        };
    }

    fn update_liked_status(&self, liked: bool, like_count: u32) {
        let mut render = self.state();
        render.liked = liked;
        render.like_count = like_count;
    }

    fn reset_player_cell(&self) {
        let mut render = self.state();
        let setup_calls = render.setup_calls;
        *render = SlotRender {
            setup_calls,
            ..SlotRender::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tempo_core::{Song, User};

    fn post() -> Post {
        let mut song = Song::new("s1");
        song.title = "Hey Jude".to_string();
        song.artist = "The Beatles".to_string();
        let at = Utc.with_ymd_and_hms(2016, 11, 25, 9, 30, 0).unwrap();
        Post::new("p1", Arc::new(User::new("u1", "jesse", "Jesse", "Chen")), song, at)
    }

    #[test]
    fn variant_sets_kind() {
        assert_eq!(FeedRowSlot::new().kind(), SlotKind::Feed);
        assert_eq!(HistoryRowSlot::new().kind(), SlotKind::History);
    }

    #[test]
    fn feed_row_shows_author() {
        let slot = FeedRowSlot::new();
        slot.update_cell_info(&post());

        let render = slot.render();
        assert_eq!(render.headline, "Jesse Chen");
        assert_eq!(render.title, "Hey Jude");
        assert_eq!(render.post_id.as_ref().map(PostId::as_str), Some("p1"));
    }

    #[test]
    fn history_row_shows_date() {
        let slot = HistoryRowSlot::new();
        slot.update_cell_info(&post());
        assert_eq!(slot.render().headline, "Nov 25, 2016");
        assert_eq!(slot.kind(), SlotKind::History);
    }

    #[test]
    fn playing_status_drives_button() {
        let slot = FeedRowSlot::new();
        slot.update_playing_status(true);
        assert_eq!(slot.render().play_button, PlayButton::Pause);
        slot.update_playing_status(true);
        assert_eq!(slot.render().play_button, PlayButton::Pause);
        slot.update_playing_status(false);
        assert_eq!(slot.render().play_button, PlayButton::Play);
    }

    #[test]
    fn reset_clears_post_but_not_setup() {
        let slot = FeedRowSlot::new();
        slot.setup();
        slot.update_cell_info(&post());
        slot.update_playing_status(true);

        slot.reset_player_cell();

        let render = slot.render();
        assert!(render.post_id.is_none());
        assert!(!render.is_playing);
        assert_eq!(render.setup_calls, 1);
    }
}
