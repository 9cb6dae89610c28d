//! Types for Tempo API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{Post, PostCategory, Song, User, UserId};

/// Configuration for connecting to the Tempo API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the server (e.g., "https://tempo.example.com")
    pub base_url: String,
    /// Session code obtained at sign-in
    pub session_code: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a config with just the URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_code: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Same config with a session code.
    pub fn with_session(mut self, session_code: impl Into<String>) -> Self {
        self.session_code = Some(session_code.into());
        self
    }

    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Which post list to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    /// Everyone's posts (`GET /feed`)
    Everyone,
    /// Posts of the users `user` follows (`GET /{user}/feed`)
    Following(UserId),
    /// Posts made by `user` (`GET /{user}/posts`)
    History(UserId),
}

impl FeedScope {
    pub(crate) fn path(&self) -> String {
        match self {
            FeedScope::Everyone => "/feed".to_string(),
            FeedScope::Following(user) => format!("/{}/feed", user),
            FeedScope::History(user) => format!("/{}/posts", user),
        }
    }

    pub(crate) fn category(&self) -> PostCategory {
        match self {
            FeedScope::History(_) => PostCategory::History,
            FeedScope::Everyone | FeedScope::Following(_) => PostCategory::Feed,
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Server identifiers arrive as integers or strings
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Response of the feed and history endpoints.
#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<ApiPost>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSong {
    /// `spotify:track:<id>` URI
    pub spotify_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub small_artwork_url: Option<String>,
    #[serde(default)]
    pub large_artwork_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPost {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub user: ApiUser,
    pub song: ApiSong,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub like_count: u32,
}

impl ApiSong {
    fn into_song(self) -> Song {
        let mut song = Song::from_spotify_uri(&self.spotify_url);
        if let Some(name) = self.name {
            song.title = name;
        }
        if let Some(artist) = self.artist {
            song.artist = artist;
        }
        if let Some(album) = self.album {
            song.album = album;
        }
        song.preview_url = self.preview_url.filter(|url| !url.is_empty());
        song.small_artwork_url = self.small_artwork_url;
        song.large_artwork_url = self.large_artwork_url;
        song
    }
}

impl PostsResponse {
    /// Convert to domain posts, keeping server order
    ///
    /// Posts by the same author share one `User`.
    pub fn into_posts(self, category: PostCategory) -> Vec<Post> {
        let mut users: HashMap<String, Arc<User>> = HashMap::new();
        self.posts
            .into_iter()
            .map(|raw| {
                let user = users
                    .entry(raw.user.id.clone())
                    .or_insert_with(|| {
                        Arc::new(User::new(
                            raw.user.id,
                            raw.user.username,
                            raw.user.first_name,
                            raw.user.last_name,
                        ))
                    })
                    .clone();
                let mut post = Post::new(raw.id, user, raw.song.into_song(), raw.created_at)
                    .with_category(category);
                post.liked = raw.liked;
                post.like_count = raw.like_count;
                post
            })
            .collect()
    }
}

/// Request body for `POST /likes`.
#[derive(Debug, Serialize)]
pub struct LikeRequest<'a> {
    pub post_id: &'a str,
    pub unlike: bool,
    pub session_code: &'a str,
}

/// Response of `POST /likes`.
#[derive(Debug, Deserialize)]
pub struct LikeResponse {
    #[serde(default)]
    pub success: bool,
}

/// Request body for `POST /posts`.
#[derive(Debug, Serialize)]
pub struct NewPostRequest<'a> {
    pub user_id: &'a str,
    pub spotify_url: &'a str,
    pub session_code: &'a str,
}

/// Response of `POST /posts`.
#[derive(Debug, Deserialize)]
pub struct NewPostResponse {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_paths() {
        assert_eq!(FeedScope::Everyone.path(), "/feed");
        assert_eq!(FeedScope::Following(UserId::new("7")).path(), "/7/feed");
        assert_eq!(FeedScope::History(UserId::new("7")).path(), "/7/posts");
        assert_eq!(
            FeedScope::History(UserId::new("7")).category(),
            PostCategory::History
        );
    }

    #[test]
    fn test_posts_share_author() {
        let json = serde_json::json!({
            "posts": [
                {
                    "id": 2,
                    "user": { "id": 1, "username": "annie" },
                    "song": { "spotify_url": "spotify:track:abc", "name": "Hey Jude" },
                    "created_at": "2015-05-01T12:00:00Z",
                    "liked": true,
                    "like_count": 3
                },
                {
                    "id": "1",
                    "user": { "id": 1, "username": "annie" },
                    "song": { "spotify_url": "spotify:track:def", "preview_url": "" },
                    "created_at": "2015-04-30T12:00:00Z"
                }
            ]
        });

        let response: PostsResponse = serde_json::from_value(json).unwrap();
        let posts = response.into_posts(PostCategory::Feed);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.as_str(), "2");
        assert_eq!(posts[0].song.id.as_str(), "abc");
        assert_eq!(posts[0].song.title, "Hey Jude");
        assert!(posts[0].liked);
        assert!(Arc::ptr_eq(&posts[0].user, &posts[1].user));
        assert!(posts[1].song.preview_url.is_none());
        assert_eq!(posts[1].song.artist, "Unknown Artist");
    }
}
