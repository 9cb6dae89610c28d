//! Platform-agnostic audio backend trait
//!
//! Abstracts the single exclusive player resource. The coordinator always
//! calls `release` on the previous stream before `prepare` on the next one, so
//! an implementation never holds two streams at once.

use crate::error::{PlaybackError, Result};
use tempo_core::{Post, PostId};
use tracing::debug;

/// Exclusive audio player resource
///
/// Implementors stream the preview of one post at a time.
pub trait AudioBackend: Send {
    /// Decode/buffer the post's audio so that `play` can start it
    ///
    /// # Returns
    /// * `Ok(())` - Stream ready
    /// * `Err(_)` - No playable audio (missing preview, network failure, etc.)
    fn prepare(&mut self, post: &Post) -> Result<()>;

    /// Start or resume the prepared stream
    fn play(&mut self) -> Result<()>;

    /// Pause the prepared stream, keeping it prepared
    fn pause(&mut self) -> Result<()>;

    /// Stop and free the prepared stream
    fn release(&mut self);
}

/// Backend that keeps player state without producing sound
///
/// Used by headless front ends and as a stand-in until a platform player is wired.
#[derive(Debug, Default)]
pub struct SilentBackend {
    prepared: Option<PostId>,
    playing: bool,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post whose stream is currently prepared
    pub fn prepared(&self) -> Option<&PostId> {
        self.prepared.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl AudioBackend for SilentBackend {
    fn prepare(&mut self, post: &Post) -> Result<()> {
        if post.song.preview_url.is_none() {
            return Err(PlaybackError::backend(format!(
                "post {} has no preview stream",
                post.id
            )));
        }
        debug!(post_id = %post.id, "Prepared silent stream");
        self.prepared = Some(post.id.clone());
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.prepared.is_none() {
            return Err(PlaybackError::backend("nothing prepared"));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.playing = false;
        Ok(())
    }

    fn release(&mut self) {
        self.prepared = None;
        self.playing = false;
    }
}
