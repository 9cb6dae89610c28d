//! In-memory recently-viewed store
//!
//! Keeps one timestamp per post and evicts entries older than
//! [`VIEWED_RETENTION_HOURS`] whenever the map is touched.

use crate::traits::RecentlyViewedStore;
use crate::types::PostId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// How long a listened marker survives
pub const VIEWED_RETENTION_HOURS: i64 = 24;

/// `RecentlyViewedStore` backed by a mutex-guarded map
#[derive(Debug, Default)]
pub struct MemoryRecentlyViewedStore {
    entries: Mutex<HashMap<PostId, DateTime<Utc>>>,
}

impl MemoryRecentlyViewedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers still held (expired ones included until the next touch)
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Snapshot of the raw map, for persisting it elsewhere
    pub fn snapshot(&self) -> HashMap<PostId, DateTime<Utc>> {
        self.entries().clone()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PostId, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn evict_expired(entries: &mut HashMap<PostId, DateTime<Utc>>, now: DateTime<Utc>) {
        let before = entries.len();
        let retention = Duration::hours(VIEWED_RETENTION_HOURS);
        entries.retain(|_, at| now.signed_duration_since(*at) <= retention);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "Evicted expired listened markers");
        }
    }
}

impl RecentlyViewedStore for MemoryRecentlyViewedStore {
    fn mark_viewed(&self, post_id: &PostId, at: DateTime<Utc>) {
        let mut entries = self.entries();
        Self::evict_expired(&mut entries, at);
        entries.insert(post_id.clone(), at);
    }

    fn is_viewed_at(&self, post_id: &PostId, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries();
        Self::evict_expired(&mut entries, now);
        entries.contains_key(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 11, 25, 12, 0, 0).unwrap()
    }

    #[test]
    fn marked_post_is_viewed() {
        let store = MemoryRecentlyViewedStore::new();
        let id = PostId::new("p1");
        store.mark_viewed(&id, noon());

        assert!(store.is_viewed_at(&id, noon() + Duration::hours(1)));
        assert!(!store.is_viewed_at(&PostId::new("p2"), noon()));
    }

    #[test]
    fn markers_expire_after_a_day() {
        let store = MemoryRecentlyViewedStore::new();
        let id = PostId::new("p1");
        store.mark_viewed(&id, noon());

        assert!(store.is_viewed_at(&id, noon() + Duration::hours(24)));
        assert!(!store.is_viewed_at(&id, noon() + Duration::hours(24) + Duration::seconds(1)));
        assert!(store.is_empty());
    }

    #[test]
    fn writing_evicts_stale_entries() {
        let store = MemoryRecentlyViewedStore::new();
        store.mark_viewed(&PostId::new("old"), noon());
        store.mark_viewed(&PostId::new("new"), noon() + Duration::days(2));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key(&PostId::new("new")));
    }

    #[test]
    fn remarking_refreshes_timestamp() {
        let store = MemoryRecentlyViewedStore::new();
        let id = PostId::new("p1");
        store.mark_viewed(&id, noon());
        store.mark_viewed(&id, noon() + Duration::hours(20));

        assert!(store.is_viewed_at(&id, noon() + Duration::hours(30)));
        assert_eq!(store.len(), 1);
    }
}
