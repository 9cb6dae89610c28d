//! Tempo - Feed Refresh
//!
//! Bounded-latency refresh of the post feed.
//!
//! A refresh races three independent events:
//! - the asynchronous fetch from a [`FeedSource`](tempo_core::FeedSource)
//! - a minimum-display timer (`start + min_delay`)
//! - a hard timeout (`start + timeout`)
//!
//! Exactly one completion is produced per cycle. Successful data is never
//! shown before the minimum delay; the timeout always wins if the data has not
//! arrived. A failed fetch counts as "no data yet", so failure and success
//! follow the same timing policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tempo_core::{FeedSource, Post, Result};
//! use tempo_feed::{RefreshCoordinator, RefreshTimings};
//!
//! struct EmptyFeed;
//!
//! #[async_trait::async_trait]
//! impl FeedSource for EmptyFeed {
//!     async fn fetch_feed(&self) -> Result<Vec<Post>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! # async fn run() -> tempo_feed::Result<()> {
//! let coordinator = RefreshCoordinator::new(Arc::new(EmptyFeed));
//! let outcome = coordinator
//!     .start_refresh(RefreshTimings::pull_to_refresh())?
//!     .wait()
//!     .await?;
//! assert!(!outcome.did_timeout);
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod cycle;
mod error;
pub mod events;
mod layout;
pub mod types;

// Public exports
pub use coordinator::{RefreshCoordinator, RefreshHandle};
pub use error::{RefreshError, Result};
pub use events::FeedEvent;
pub use layout::{FeedLayout, SPARSE_FEED_THRESHOLD};
pub use types::{CycleId, CycleStatus, RefreshOutcome, RefreshTimings};
