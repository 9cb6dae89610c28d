/// Song domain type
use super::SongId;
use serde::{Deserialize, Serialize};

/// Track referenced by a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Catalogue identifier on the streaming service
    pub id: SongId,

    pub title: String,

    pub artist: String,

    pub album: String,

    /// 30 second preview stream, when the service offers one
    pub preview_url: Option<String>,

    pub small_artwork_url: Option<String>,

    pub large_artwork_url: Option<String>,
}

impl Song {
    /// Create a song with only its identifier known
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SongId::new(id),
            title: String::new(),
            artist: "Unknown Artist".to_string(),
            album: "Unknown Album".to_string(),
            preview_url: None,
            small_artwork_url: None,
            large_artwork_url: None,
        }
    }

    /// Build a song from a `spotify:track:<id>` URI
    ///
    /// The identifier is the last `:`-separated component; a bare ID is accepted as-is.
    pub fn from_spotify_uri(uri: &str) -> Self {
        let id = uri.rsplit(':').next().unwrap_or_default();
        Self::new(id)
    }

    /// URI form used when posting a song
    pub fn spotify_uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spotify_uri_keeps_last_component() {
        let song = Song::from_spotify_uri("spotify:track:6rqhFgbbKwnb9MLmUQDhG6");
        assert_eq!(song.id.as_str(), "6rqhFgbbKwnb9MLmUQDhG6");
        assert_eq!(song.spotify_uri(), "spotify:track:6rqhFgbbKwnb9MLmUQDhG6");
    }

    #[test]
    fn bare_id_is_accepted() {
        let song = Song::from_spotify_uri("abc");
        assert_eq!(song.id.as_str(), "abc");
        assert_eq!(song.artist, "Unknown Artist");
    }
}
