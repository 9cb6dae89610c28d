//! Tempo API Client
//!
//! HTTP client library for the Tempo feed service.
//!
//! # Features
//!
//! - **Feeds**: everyone's feed, a user's following feed, a user's history
//! - **Likes**: like and unlike posts
//! - **Posting**: share a song by its Spotify URI
//!
//! The client implements [`tempo_core::FeedSource`] (through
//! [`TempoApiClient::feed`]) and [`tempo_core::LikeService`], so it plugs
//! straight into the feed and playback coordinators.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tempo_api_client::{ApiConfig, FeedScope, TempoApiClient};
//! use tempo_feed::RefreshCoordinator;
//!
//! let client = TempoApiClient::new(ApiConfig::new("https://tempo.example.com").with_session("abc"))?;
//! let refresh = RefreshCoordinator::new(Arc::new(client.feed(FeedScope::Everyone)));
//! ```

mod client;
mod error;
mod types;

pub use client::{ApiFeedSource, TempoApiClient};
pub use error::{ApiClientError, Result};
pub use types::{
    ApiConfig, ApiPost, ApiSong, ApiUser, FeedScope, LikeRequest, LikeResponse, NewPostRequest,
    NewPostResponse, PostsResponse,
};
