//! Music library stand-in for the terminal
//!
//! The CLI never signs in to a streaming service, so there is no library
//! session. Add toggles therefore end in the setup flow.

use async_trait::async_trait;
use tempo_core::{MusicLibraryService, Post, Result, SaveStatus, TempoError};

#[derive(Debug, Default)]
pub struct DisconnectedLibrary;

#[async_trait]
impl MusicLibraryService for DisconnectedLibrary {
    async fn available(&self) -> Result<bool> {
        Ok(false)
    }

    async fn status(&self, _post: &Post) -> Result<SaveStatus> {
        Ok(SaveStatus::Unknown)
    }

    async fn save(&self, post: &Post) -> Result<bool> {
        Err(TempoError::unavailable(format!(
            "no music library session to save {}",
            post.song.spotify_uri()
        )))
    }

    async fn remove(&self, post: &Post) -> Result<bool> {
        Err(TempoError::unavailable(format!(
            "no music library session to remove {}",
            post.song.spotify_uri()
        )))
    }
}
