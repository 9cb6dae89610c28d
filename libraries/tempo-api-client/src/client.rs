//! Main Tempo API client.

use crate::error::{ApiClientError, Result};
use crate::types::{
    ApiConfig, FeedScope, LikeRequest, LikeResponse, NewPostRequest, NewPostResponse,
    PostsResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tempo_core::{FeedSource, LikeService, Post, PostId, Song, UserId};
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Tempo feed API.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// use tempo_api_client::{ApiConfig, FeedScope, TempoApiClient};
///
/// let config = ApiConfig::new("https://tempo.example.com").with_session("abc123");
/// let client = TempoApiClient::new(config)?;
///
/// let posts = client.fetch_posts(&FeedScope::Everyone).await?;
/// println!("{} posts", posts.len());
/// ```
#[derive(Clone)]
pub struct TempoApiClient {
    http: Client,
    base_url: String,
    session_code: Option<String>,
}

impl TempoApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ApiClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&base_url).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Tempo/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            session_code: config.session_code,
        })
    }

    /// Base URL without trailing slash.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn has_session(&self) -> bool {
        self.session_code.is_some()
    }

    fn session(&self) -> Result<&str> {
        self.session_code
            .as_deref()
            .ok_or(ApiClientError::AuthRequired)
    }

    /// Fetch one post list, newest first.
    pub async fn fetch_posts(&self, scope: &FeedScope) -> Result<Vec<Post>> {
        let session_code = self.session()?;
        let url = format!("{}{}", self.base_url, scope.path());
        debug!(url = %url, ?scope, "Fetching posts");

        let response = self
            .http
            .get(&url)
            .query(&[("session_code", session_code)])
            .send()
            .await?;

        let body: PostsResponse = read_json(response, "posts").await?;
        let posts = body.into_posts(scope.category());
        debug!(count = posts.len(), ?scope, "Fetched posts");
        Ok(posts)
    }

    /// Like (`unlike == false`) or unlike a post.
    ///
    /// Returns whether the server accepted the change.
    pub async fn update_like(&self, post_id: &PostId, unlike: bool) -> Result<bool> {
        let session_code = self.session()?;
        let url = format!("{}/likes", self.base_url);
        debug!(url = %url, post_id = %post_id, unlike, "Updating like");

        let response = self
            .http
            .post(&url)
            .json(&LikeRequest {
                post_id: post_id.as_str(),
                unlike,
                session_code,
            })
            .send()
            .await?;

        let body: LikeResponse = read_json(response, "like").await?;
        if !body.success {
            warn!(post_id = %post_id, unlike, "Server declined like update");
        }
        Ok(body.success)
    }

    /// Share a song as a new post by `user_id`.
    pub async fn post_song(&self, user_id: &UserId, song: &Song) -> Result<PostId> {
        let session_code = self.session()?;
        let url = format!("{}/posts", self.base_url);
        let spotify_url = song.spotify_uri();
        debug!(url = %url, user_id = %user_id, song = %spotify_url, "Posting song");

        let response = self
            .http
            .post(&url)
            .json(&NewPostRequest {
                user_id: user_id.as_str(),
                spotify_url: &spotify_url,
                session_code,
            })
            .send()
            .await?;

        let body: NewPostResponse = read_json(response, "new post").await?;
        info!(post_id = %body.id, "Posted song");
        Ok(PostId::new(body.id))
    }

    /// A [`FeedSource`] fetching `scope` through this client.
    pub fn feed(&self, scope: FeedScope) -> ApiFeedSource {
        ApiFeedSource {
            client: self.clone(),
            scope,
        }
    }
}

/// Map a response to `T`, or to the matching error
async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response.json().await.map_err(|e| {
            ApiClientError::ParseError(format!("Failed to parse {} response: {}", what, e))
        })
    } else if status.as_u16() == 401 {
        Err(ApiClientError::AuthRequired)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ApiClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

/// One post list of the API, usable by the refresh coordinator
#[derive(Clone)]
pub struct ApiFeedSource {
    client: TempoApiClient,
    scope: FeedScope,
}

impl ApiFeedSource {
    pub fn scope(&self) -> &FeedScope {
        &self.scope
    }
}

#[async_trait]
impl FeedSource for ApiFeedSource {
    async fn fetch_feed(&self) -> tempo_core::Result<Vec<Post>> {
        Ok(self.client.fetch_posts(&self.scope).await?)
    }
}

#[async_trait]
impl LikeService for TempoApiClient {
    async fn update_like(&self, post_id: &PostId, unlike: bool) -> tempo_core::Result<bool> {
        Ok(TempoApiClient::update_like(self, post_id, unlike).await?)
    }
}
