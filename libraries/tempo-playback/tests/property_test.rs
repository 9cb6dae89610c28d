//! Property-based tests for the playback coordinator
//!
//! Random sequences of play/pause/bind/unbind operations must never leave
//! more than one post rendered as playing.

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tempo_core::{
    LikeService, MemoryRecentlyViewedStore, MusicLibraryService, Post, PostId,
    Result as CoreResult, SaveStatus, Song, User,
};
use tempo_playback::{FeedRowSlot, PlaybackCoordinator, SilentBackend, SlotId};

// ===== Helpers =====

struct Offline;

#[async_trait]
impl MusicLibraryService for Offline {
    async fn available(&self) -> CoreResult<bool> {
        Ok(false)
    }
    async fn status(&self, _post: &Post) -> CoreResult<SaveStatus> {
        Ok(SaveStatus::Unknown)
    }
    async fn save(&self, _post: &Post) -> CoreResult<bool> {
        Ok(false)
    }
    async fn remove(&self, _post: &Post) -> CoreResult<bool> {
        Ok(false)
    }
}

#[async_trait]
impl LikeService for Offline {
    async fn update_like(&self, _post_id: &PostId, _unlike: bool) -> CoreResult<bool> {
        Ok(true)
    }
}

const POSTS: usize = 5;
const SLOTS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Play(usize),
    TogglePlay(usize),
    Pause,
    Stop,
    Bind(usize, usize),
    Unbind(usize),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POSTS).prop_map(Op::Play),
        (0..POSTS).prop_map(Op::TogglePlay),
        Just(Op::Pause),
        Just(Op::Stop),
        (0..SLOTS, 0..POSTS).prop_map(|(slot, post)| Op::Bind(slot, post)),
        (0..SLOTS).prop_map(Op::Unbind),
    ]
}

fn posts() -> Vec<Post> {
    let user = Arc::new(User::new("u1", "annie", "Annie", "Cheng"));
    (0..POSTS)
        .map(|i| {
            let mut song = Song::new(format!("song-{}", i));
            song.preview_url = Some(format!("https://p.scdn.co/mp3-preview/{}", i));
            Post::new(format!("p{}", i), Arc::clone(&user), song, Utc::now())
        })
        .collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: at most one post is rendered as playing, and it is the
    /// coordinator's playing post
    #[test]
    fn at_most_one_post_plays(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let coordinator = PlaybackCoordinator::new(
            Box::new(SilentBackend::new()),
            Arc::new(Offline),
            Arc::new(Offline),
            Arc::new(MemoryRecentlyViewedStore::new()),
        );
        let posts = posts();
        let rows: Vec<Arc<FeedRowSlot>> = (0..SLOTS).map(|_| Arc::new(FeedRowSlot::new())).collect();
        let slots: Vec<SlotId> = rows.iter().map(|row| coordinator.register_slot(row.clone())).collect();

        for op in ops {
            match op {
                Op::Play(i) => coordinator.play(&posts[i]).unwrap(),
                Op::TogglePlay(i) => coordinator.toggle_play(&posts[i]).unwrap(),
                Op::Pause => coordinator.pause().unwrap(),
                Op::Stop => coordinator.stop(),
                Op::Bind(s, i) => coordinator.bind(slots[s], &posts[i]).unwrap(),
                Op::Unbind(s) => coordinator.unbind(slots[s]).unwrap(),
            }

            let rendered_playing: HashSet<PostId> = rows
                .iter()
                .map(|row| row.render())
                .filter(|render| render.is_playing)
                .filter_map(|render| render.post_id)
                .collect();
            prop_assert!(rendered_playing.len() <= 1);

            let playing = coordinator.playing_post();
            for id in &rendered_playing {
                prop_assert_eq!(Some(id), playing.as_ref());
            }

            // Every row bound to the playing post shows it as playing
            for (row, slot) in rows.iter().zip(&slots) {
                if let (Some(bound), Some(playing)) = (coordinator.bound_post(*slot), playing.as_ref()) {
                    prop_assert_eq!(row.render().is_playing, &bound == playing);
                }
            }
        }
    }
}
