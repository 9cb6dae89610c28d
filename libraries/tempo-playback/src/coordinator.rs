//! Playback coordinator - core orchestration
//!
//! Owns the single playback session and the slot bindings. Slots are
//! notified after the session lock is released, so a slot's update methods
//! never run while the coordinator holds its own state.

use crate::{
    backend::AudioBackend,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    slot::ViewSlot,
    types::{SlotId, ToggleOutcome},
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempo_core::{LikeService, MusicLibraryService, Post, PostId, RecentlyViewedStore, SaveStatus};
use tracing::{debug, info, warn};

/// A view update to deliver once the session lock is released
enum Notice {
    CellInfo(Post),
    Playing(bool),
    Liked(bool, u32),
    Saved(SaveStatus),
    Reset,
}

/// Process-wide "what is playing" state
struct PlaybackSession {
    /// Selected post; stays selected while paused
    current: Option<Post>,
    /// Post whose stream the backend holds
    prepared: Option<PostId>,
    is_playing: bool,
    backend: Box<dyn AudioBackend>,

    slots: HashMap<SlotId, Arc<dyn ViewSlot>>,
    /// Post each slot currently displays
    bindings: HashMap<SlotId, Post>,
    next_slot: u64,

    save_status: HashMap<PostId, SaveStatus>,
    adds_in_flight: HashSet<PostId>,
    likes_in_flight: HashSet<PostId>,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackSession {
    fn is_current(&self, post_id: &PostId) -> bool {
        self.current.as_ref().is_some_and(|p| &p.id == post_id)
    }

    fn is_playing_post(&self, post_id: &PostId) -> bool {
        self.is_playing && self.is_current(post_id)
    }

    /// Slots currently bound to `post_id`
    fn slots_for(&self, post_id: &PostId) -> Vec<Arc<dyn ViewSlot>> {
        self.bindings
            .iter()
            .filter(|(_, post)| &post.id == post_id)
            .filter_map(|(slot_id, _)| self.slots.get(slot_id).cloned())
            .collect()
    }

    fn notices_for(&self, post_id: &PostId, notice: impl Fn() -> Notice) -> Vec<(Arc<dyn ViewSlot>, Notice)> {
        self.slots_for(post_id)
            .into_iter()
            .map(|slot| (slot, notice()))
            .collect()
    }

    /// Every copy of `post_id` the session holds
    fn copies_mut<'a>(&'a mut self, post_id: &'a PostId) -> impl Iterator<Item = &'a mut Post> + 'a {
        self.current
            .iter_mut()
            .chain(self.bindings.values_mut())
            .filter(move |post| &post.id == post_id)
    }

    fn set_liked(&mut self, post_id: &PostId, liked: bool, like_count: u32) {
        for post in self.copies_mut(post_id) {
            post.liked = liked;
            post.like_count = like_count;
        }
    }

    fn known_copy(&self, post_id: &PostId) -> Option<&Post> {
        self.current
            .iter()
            .chain(self.bindings.values())
            .find(|post| &post.id == post_id)
    }

    /// Stop and free the prepared stream, if any
    fn release_stream(&mut self) {
        if let Some(prepared) = self.prepared.take() {
            debug!(post_id = %prepared, "Releasing audio stream");
            self.backend.release();
        }
        self.is_playing = false;
    }
}

/// Which in-flight set a guard belongs to
#[derive(Clone, Copy)]
enum ToggleKind {
    Like,
    Add,
}

/// Clears the in-flight marker when the toggle completes or is cancelled
struct InFlightGuard {
    session: Arc<Mutex<PlaybackSession>>,
    post_id: PostId,
    kind: ToggleKind,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match self.kind {
            ToggleKind::Like => session.likes_in_flight.remove(&self.post_id),
            ToggleKind::Add => session.adds_in_flight.remove(&self.post_id),
        };
    }
}

/// Grants at most one post "playing" status and keeps bound slots in sync
///
/// Collaborators are injected at construction; the coordinator lives as long
/// as the composition root keeps it.
pub struct PlaybackCoordinator {
    session: Arc<Mutex<PlaybackSession>>,
    library: Arc<dyn MusicLibraryService>,
    likes: Arc<dyn LikeService>,
    viewed: Arc<dyn RecentlyViewedStore>,
}

impl PlaybackCoordinator {
    /// Create a coordinator owning `backend`
    pub fn new(
        backend: Box<dyn AudioBackend>,
        library: Arc<dyn MusicLibraryService>,
        likes: Arc<dyn LikeService>,
        viewed: Arc<dyn RecentlyViewedStore>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(PlaybackSession {
                current: None,
                prepared: None,
                is_playing: false,
                backend,
                slots: HashMap::new(),
                bindings: HashMap::new(),
                next_slot: 0,
                save_status: HashMap::new(),
                adds_in_flight: HashSet::new(),
                likes_in_flight: HashSet::new(),
                pending_events: Vec::new(),
            })),
            library,
            likes,
            viewed,
        }
    }

    fn session(&self) -> MutexGuard<'_, PlaybackSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(notices: Vec<(Arc<dyn ViewSlot>, Notice)>) {
        for (slot, notice) in notices {
            match notice {
                Notice::CellInfo(post) => slot.update_cell_info(&post),
                Notice::Playing(is_playing) => slot.update_playing_status(is_playing),
                Notice::Liked(liked, count) => slot.update_liked_status(liked, count),
                Notice::Saved(status) => slot.update_saved_status(status),
                Notice::Reset => slot.reset_player_cell(),
            }
        }
    }

    // ===== Slots =====

    /// Register a recyclable slot; `setup` runs once here
    pub fn register_slot(&self, slot: Arc<dyn ViewSlot>) -> SlotId {
        slot.setup();
        let mut session = self.session();
        session.next_slot += 1;
        let id = SlotId(session.next_slot);
        debug!(slot = %id, kind = ?slot.kind(), "Registered view slot");
        session.slots.insert(id, slot);
        id
    }

    /// Forget a slot entirely (its row was destroyed, not recycled)
    pub fn unregister_slot(&self, slot_id: SlotId) {
        let mut session = self.session();
        session.bindings.remove(&slot_id);
        session.slots.remove(&slot_id);
    }

    /// Show `post` in `slot_id`, replacing whatever it showed before
    ///
    /// The slot is told whether `post` is the playing post. A post the user
    /// listened to within the last day is rendered as played.
    pub fn bind(&self, slot_id: SlotId, post: &Post) -> Result<()> {
        let notices = {
            let mut session = self.session();
            let slot = session
                .slots
                .get(&slot_id)
                .cloned()
                .ok_or(PlaybackError::UnknownSlot(slot_id))?;

            // The selected post's own copy carries the freshest flags
            let mut shown = match session.current.as_ref() {
                Some(current) if current.id == post.id => current.clone(),
                _ => post.clone(),
            };
            if !shown.played_once && self.viewed.is_viewed(&shown.id) {
                shown.played_once = true;
            }

            let is_playing = session.is_playing_post(&shown.id);
            let saved = session
                .save_status
                .get(&shown.id)
                .copied()
                .unwrap_or_default();

            if let Some(previous) = session.bindings.insert(slot_id, shown.clone()) {
                if previous.id != shown.id {
                    debug!(slot = %slot_id, from = %previous.id, to = %shown.id, "Slot recycled");
                }
            }

            vec![
                (Arc::clone(&slot), Notice::CellInfo(shown)),
                (Arc::clone(&slot), Notice::Playing(is_playing)),
                (slot, Notice::Saved(saved)),
            ]
        };
        Self::dispatch(notices);
        Ok(())
    }

    /// Clear `slot_id`'s binding; playback is unaffected
    pub fn unbind(&self, slot_id: SlotId) -> Result<()> {
        let slot = {
            let mut session = self.session();
            let slot = session
                .slots
                .get(&slot_id)
                .cloned()
                .ok_or(PlaybackError::UnknownSlot(slot_id))?;
            session.bindings.remove(&slot_id);
            slot
        };
        Self::dispatch(vec![(slot, Notice::Reset)]);
        Ok(())
    }

    /// Post currently shown by `slot_id`
    pub fn bound_post(&self, slot_id: SlotId) -> Option<PostId> {
        self.session().bindings.get(&slot_id).map(|p| p.id.clone())
    }

    // ===== Playback =====

    /// Play `post`, stopping any other post first
    ///
    /// Resuming the selected post reuses its prepared stream.
    pub fn play(&self, post: &Post) -> Result<()> {
        let mut notices = Vec::new();
        let result = {
            let mut session = self.session();
            self.play_locked(&mut session, post, &mut notices)
        };
        Self::dispatch(notices);
        result
    }

    fn play_locked(
        &self,
        session: &mut PlaybackSession,
        post: &Post,
        notices: &mut Vec<(Arc<dyn ViewSlot>, Notice)>,
    ) -> Result<()> {
        if session.is_playing_post(&post.id) {
            return Ok(());
        }

        let previous = session.current.as_ref().map(|p| p.id.clone());
        let switching = previous.as_ref() != Some(&post.id);

        if switching {
            if let Some(previous) = previous.as_ref() {
                let was_playing = session.is_playing;
                session.release_stream();
                if was_playing {
                    session.pending_events.push(PlaybackEvent::PlayingStateChanged {
                        post_id: previous.clone(),
                        is_playing: false,
                    });
                }
                notices.extend(session.notices_for(previous, || Notice::Playing(false)));
            }
            session.current = None;

            if let Err(err) = session.backend.prepare(post) {
                warn!(post_id = %post.id, error = %err, "Failed to prepare stream");
                return Err(err);
            }
            session.prepared = Some(post.id.clone());

            let mut selected = session
                .known_copy(&post.id)
                .cloned()
                .unwrap_or_else(|| post.clone());
            selected.played_once = true;
            session.current = Some(selected);
        }

        if let Err(err) = session.backend.play() {
            warn!(post_id = %post.id, error = %err, "Failed to start stream");
            return Err(err);
        }
        session.is_playing = true;

        // Listening marks the post as played everywhere it is shown
        self.viewed.mark_viewed(&post.id, Utc::now());
        for copy in session.copies_mut(&post.id) {
            copy.played_once = true;
        }

        info!(post_id = %post.id, resumed = !switching, "Playing");
        session.pending_events.push(PlaybackEvent::PlayingStateChanged {
            post_id: post.id.clone(),
            is_playing: true,
        });
        notices.extend(session.notices_for(&post.id, || Notice::Playing(true)));
        Ok(())
    }

    /// Pause the playing post; it stays selected
    pub fn pause(&self) -> Result<()> {
        let notices = {
            let mut session = self.session();
            if !session.is_playing {
                return Ok(());
            }
            let Some(post_id) = session.current.as_ref().map(|p| p.id.clone()) else {
                return Ok(());
            };

            session.backend.pause()?;
            session.is_playing = false;

            info!(post_id = %post_id, "Paused");
            session.pending_events.push(PlaybackEvent::PlayingStateChanged {
                post_id: post_id.clone(),
                is_playing: false,
            });
            session.notices_for(&post_id, || Notice::Playing(false))
        };
        Self::dispatch(notices);
        Ok(())
    }

    /// Pause `post` if it is playing, otherwise play it
    pub fn toggle_play(&self, post: &Post) -> Result<()> {
        if self.is_playing(&post.id) {
            self.pause()
        } else {
            self.play(post)
        }
    }

    /// Stop playback and release the stream; nothing stays selected
    pub fn stop(&self) {
        let notices = {
            let mut session = self.session();
            let Some(current) = session.current.take() else {
                return;
            };
            let was_playing = session.is_playing;
            session.release_stream();
            if was_playing {
                session.pending_events.push(PlaybackEvent::PlayingStateChanged {
                    post_id: current.id.clone(),
                    is_playing: false,
                });
            }
            session.notices_for(&current.id, || Notice::Playing(false))
        };
        Self::dispatch(notices);
    }

    /// Whether `post_id` is the post playing right now
    pub fn is_playing(&self, post_id: &PostId) -> bool {
        self.session().is_playing_post(post_id)
    }

    /// Selected post (playing or paused)
    pub fn current_post(&self) -> Option<Post> {
        self.session().current.clone()
    }

    /// Post playing right now, if any
    pub fn playing_post(&self) -> Option<PostId> {
        let session = self.session();
        if session.is_playing {
            session.current.as_ref().map(|p| p.id.clone())
        } else {
            None
        }
    }

    // ===== Refresh continuity =====

    /// Reconcile a freshly fetched list with the selected post
    ///
    /// The entry matching the selected post by identifier is treated as the
    /// same post: metadata is taken from the new copy, the stream is kept,
    /// and the list entry is replaced by the merged copy. Returns the index of
    /// that entry.
    pub fn apply_refresh(&self, posts: &mut [Post]) -> Option<usize> {
        let (notices, index) = {
            let mut session = self.session();
            let current_id = session.current.as_ref()?.id.clone();
            let index = posts.iter().position(|p| p.id == current_id)?;

            let (was_liked, was_count) = session
                .current
                .as_ref()
                .map(|p| (p.liked, p.like_count))?;

            let fresh = posts[index].clone();
            for copy in session.copies_mut(&current_id) {
                copy.refresh_from(&fresh);
            }
            let merged = session.current.clone()?;
            posts[index] = merged.clone();

            debug!(post_id = %current_id, index, "Selected post found in refreshed feed");

            let mut notices = Vec::new();
            if merged.liked != was_liked || merged.like_count != was_count {
                session.pending_events.push(PlaybackEvent::LikeStateChanged {
                    post_id: current_id.clone(),
                    liked: merged.liked,
                    like_count: merged.like_count,
                });
                notices.extend(session.notices_for(&current_id, || {
                    Notice::Liked(merged.liked, merged.like_count)
                }));
            }
            let is_playing = session.is_playing;
            notices.extend(session.notices_for(&current_id, || Notice::Playing(is_playing)));
            (notices, index)
        };
        Self::dispatch(notices);
        Some(index)
    }

    // ===== Toggles =====

    /// Flip the liked flag now and confirm with the like service
    ///
    /// On failure the flag is rolled back and bound slots re-render.
    pub async fn toggle_like(&self, post: &Post) -> ToggleOutcome {
        let post_id = post.id.clone();

        let (guard, liked, previous, notices) = {
            let mut session = self.session();
            if !session.likes_in_flight.insert(post_id.clone()) {
                debug!(post_id = %post_id, "Like toggle already in flight");
                return ToggleOutcome::Rejected;
            }
            let guard = InFlightGuard {
                session: Arc::clone(&self.session),
                post_id: post_id.clone(),
                kind: ToggleKind::Like,
            };

            let mut base = session.known_copy(&post_id).cloned().unwrap_or_else(|| post.clone());
            let previous = (base.liked, base.like_count);
            let liked = base.toggle_liked();
            let like_count = base.like_count;
            session.set_liked(&post_id, liked, like_count);

            session.pending_events.push(PlaybackEvent::LikeStateChanged {
                post_id: post_id.clone(),
                liked,
                like_count,
            });
            let notices = session.notices_for(&post_id, || Notice::Liked(liked, like_count));
            (guard, liked, previous, notices)
        };
        Self::dispatch(notices);

        let result = self.likes.update_like(&post_id, !liked).await;

        let outcome = match result {
            Ok(true) => {
                debug!(post_id = %post_id, liked, "Like confirmed");
                ToggleOutcome::Applied
            }
            Ok(false) | Err(_) => {
                if let Err(err) = &result {
                    warn!(post_id = %post_id, error = %err, "Like request failed, reverting");
                } else {
                    warn!(post_id = %post_id, "Like request declined, reverting");
                }
                let (was_liked, was_count) = previous;
                let notices = {
                    let mut session = self.session();
                    session.set_liked(&post_id, was_liked, was_count);
                    session.pending_events.push(PlaybackEvent::LikeStateChanged {
                        post_id: post_id.clone(),
                        liked: was_liked,
                        like_count: was_count,
                    });
                    session.notices_for(&post_id, || Notice::Liked(was_liked, was_count))
                };
                Self::dispatch(notices);
                ToggleOutcome::Reverted
            }
        };
        drop(guard);
        outcome
    }

    /// Save the post's song to the music library, or remove it if saved
    ///
    /// Without a library session nothing changes and
    /// [`PlaybackEvent::AddUnavailable`] is queued for the setup flow.
    pub async fn toggle_add(&self, post: &Post) -> ToggleOutcome {
        let post_id = post.id.clone();

        let guard = {
            let mut session = self.session();
            if !session.adds_in_flight.insert(post_id.clone()) {
                debug!(post_id = %post_id, "Add toggle already in flight");
                return ToggleOutcome::Rejected;
            }
            InFlightGuard {
                session: Arc::clone(&self.session),
                post_id: post_id.clone(),
                kind: ToggleKind::Add,
            }
        };

        match self.library.available().await {
            Ok(true) => {}
            Ok(false) => {
                info!(post_id = %post_id, "Music library unavailable, setup needed");
                self.session()
                    .pending_events
                    .push(PlaybackEvent::AddUnavailable { post_id });
                return ToggleOutcome::NeedsSetup;
            }
            Err(err) => {
                warn!(post_id = %post_id, error = %err, "Music library availability check failed");
                return ToggleOutcome::Failed;
            }
        }

        let status = match self.library.status(post).await {
            Ok(status) => status,
            Err(err) => {
                warn!(post_id = %post_id, error = %err, "Save status lookup failed");
                return ToggleOutcome::Failed;
            }
        };

        let (request, target) = match status {
            SaveStatus::NotSaved => (self.library.save(post).await, SaveStatus::Saved),
            SaveStatus::Saved => (self.library.remove(post).await, SaveStatus::NotSaved),
            SaveStatus::Unknown => {
                debug!(post_id = %post_id, "Save status unknown, leaving unchanged");
                return ToggleOutcome::Unchanged;
            }
        };

        let new_status = match request {
            Ok(true) => target,
            Ok(false) => {
                warn!(post_id = %post_id, ?target, "Music library declined change");
                self.restore_save_status(&post_id, status);
                return ToggleOutcome::Failed;
            }
            Err(err) => {
                warn!(post_id = %post_id, ?target, error = %err, "Music library request failed");
                self.restore_save_status(&post_id, status);
                return ToggleOutcome::Failed;
            }
        };

        let notices = {
            let mut session = self.session();
            session.save_status.insert(post_id.clone(), new_status);
            session.pending_events.push(PlaybackEvent::AddStateChanged {
                post_id: post_id.clone(),
                status: new_status,
            });
            session.notices_for(&post_id, || Notice::Saved(new_status))
        };
        Self::dispatch(notices);
        info!(post_id = %post_id, status = ?new_status, "Music library updated");
        drop(guard);
        ToggleOutcome::Applied
    }

    /// Record the status the library reported and re-render bound slots with it
    fn restore_save_status(&self, post_id: &PostId, status: SaveStatus) {
        let notices = {
            let mut session = self.session();
            session.save_status.insert(post_id.clone(), status);
            session.notices_for(post_id, || Notice::Saved(status))
        };
        Self::dispatch(notices);
    }

    /// Last known save status of a post
    pub fn save_status(&self, post_id: &PostId) -> SaveStatus {
        self.session()
            .save_status
            .get(post_id)
            .copied()
            .unwrap_or_default()
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.session().pending_events)
    }
}
