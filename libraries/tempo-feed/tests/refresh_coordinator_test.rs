//! Timing tests for the refresh coordinator
//!
//! All tests run on a paused Tokio clock, so timers fire at their exact
//! deadlines and "elapsed" is deterministic.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempo_core::{FeedSource, Post, Result as CoreResult, Song, TempoError, User};
use tempo_feed::{FeedEvent, RefreshCoordinator, RefreshError, RefreshTimings};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;
use tokio::time::{sleep, Instant};

// ===== Test Helpers =====

fn post(id: &str) -> Post {
    let user = Arc::new(User::new("u1", "annie", "Annie", "Cheng"));
    Post::new(id, user, Song::new(format!("song-{}", id)), Utc::now())
}

/// Feed that answers after a fixed delay
struct DelayedFeed {
    delay: Duration,
    posts: Vec<Post>,
    calls: AtomicUsize,
}

impl DelayedFeed {
    fn new(delay: Duration, posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            delay,
            posts,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FeedSource for DelayedFeed {
    async fn fetch_feed(&self) -> CoreResult<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        Ok(self.posts.clone())
    }
}

/// Feed whose request never completes
struct StalledFeed;

#[async_trait]
impl FeedSource for StalledFeed {
    async fn fetch_feed(&self) -> CoreResult<Vec<Post>> {
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }
}

/// Feed that fails after a short delay
struct FailingFeed;

#[async_trait]
impl FeedSource for FailingFeed {
    async fn fetch_feed(&self) -> CoreResult<Vec<Post>> {
        sleep(Duration::from_millis(200)).await;
        Err(TempoError::network("connection reset"))
    }
}

fn timings(min_secs: u64, timeout_secs: u64) -> RefreshTimings {
    RefreshTimings::new(
        Duration::from_secs(min_secs),
        Duration::from_secs(timeout_secs),
    )
    .unwrap()
}

fn drain(rx: &mut Receiver<FeedEvent>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
    events
}

fn finished_count(events: &[FeedEvent]) -> usize {
    events.iter().filter(|e| e.is_refresh_finished()).count()
}

// ===== Completion Timing =====

#[tokio::test(start_paused = true)]
async fn test_immediate_empty_fetch_finishes_at_min_delay() {
    let coordinator = RefreshCoordinator::new(DelayedFeed::new(Duration::ZERO, vec![]));
    let start = Instant::now();

    let outcome = coordinator
        .start_refresh(timings(3, 10))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(outcome.posts.is_empty());
    assert!(!outcome.did_timeout);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(outcome.elapsed, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_after_min_delay_finishes_on_arrival() {
    let feed = DelayedFeed::new(Duration::from_secs(5), vec![post("a"), post("b")]);
    let coordinator = RefreshCoordinator::new(feed);
    let start = Instant::now();

    let outcome = coordinator
        .start_refresh(timings(3, 10))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(!outcome.did_timeout);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    let ids: Vec<_> = outcome.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"], "server order must be preserved");
}

#[tokio::test(start_paused = true)]
async fn test_stalled_fetch_times_out_with_empty_list() {
    let coordinator = RefreshCoordinator::new(Arc::new(StalledFeed));
    let start = Instant::now();

    let outcome = coordinator
        .start_refresh(timings(3, 10))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(outcome.did_timeout);
    assert!(outcome.posts.is_empty());
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert!(!coordinator.is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn test_zero_min_delay_finishes_when_data_arrives() {
    let feed = DelayedFeed::new(Duration::from_millis(750), vec![post("a")]);
    let coordinator = RefreshCoordinator::new(feed);
    let start = Instant::now();

    let outcome = coordinator
        .start_refresh(RefreshTimings::initial_load())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(!outcome.did_timeout);
    assert_eq!(outcome.posts.len(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(750));
}

// ===== Failure =====

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_waits_for_timeout() {
    let coordinator = RefreshCoordinator::new(Arc::new(FailingFeed));
    let start = Instant::now();

    let outcome = coordinator
        .start_refresh(timings(3, 10))
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert!(outcome.did_timeout);
    assert!(outcome.posts.is_empty());
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_timings_rejected_without_fetch() {
    let feed = DelayedFeed::new(Duration::ZERO, vec![]);
    let coordinator = RefreshCoordinator::new(feed.clone());

    let bad = RefreshTimings {
        min_delay: Duration::from_secs(10),
        timeout: Duration::from_secs(3),
    };
    let result = coordinator.start_refresh(bad);

    assert!(matches!(result, Err(RefreshError::InvalidTimings { .. })));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    assert!(coordinator.current_status().is_none());
}

// ===== Exactly-once Emission =====

#[tokio::test(start_paused = true)]
async fn test_late_fetch_does_not_emit_second_completion() {
    let feed = DelayedFeed::new(Duration::from_secs(12), vec![post("late")]);
    let coordinator = RefreshCoordinator::new(feed);
    let mut rx = coordinator.subscribe();

    let outcome = coordinator
        .start_refresh(timings(3, 10))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert!(outcome.did_timeout);

    // Let the fetch land
    sleep(Duration::from_secs(5)).await;

    let events = drain(&mut rx);
    assert_eq!(finished_count(&events), 1);
    assert!(matches!(
        events.last(),
        Some(FeedEvent::LatePostsArrived { posts, .. }) if posts.len() == 1
    ));
}

#[tokio::test(start_paused = true)]
async fn test_one_completion_event_per_refresh() {
    let feed = DelayedFeed::new(Duration::from_secs(1), vec![post("a")]);
    let coordinator = RefreshCoordinator::new(feed.clone());
    let mut rx = coordinator.subscribe();

    for _ in 0..3 {
        coordinator
            .start_refresh(timings(3, 10))
            .unwrap()
            .wait()
            .await
            .unwrap();
    }
    sleep(Duration::from_secs(30)).await;

    let events = drain(&mut rx);
    assert_eq!(finished_count(&events), 3);
    assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
}

// ===== Supersession =====

#[tokio::test(start_paused = true)]
async fn test_new_refresh_supersedes_cycle_in_flight() {
    let feed = DelayedFeed::new(Duration::from_secs(1), vec![post("a")]);
    let coordinator = RefreshCoordinator::new(feed);
    let mut rx = coordinator.subscribe();

    let first = coordinator.start_refresh(timings(3, 10)).unwrap();
    sleep(Duration::from_millis(500)).await;
    let second = coordinator.start_refresh(timings(3, 10)).unwrap();
    assert!(second.cycle() > first.cycle());

    let first_cycle = first.cycle();
    let superseded = first.wait().await;
    assert!(matches!(superseded, Err(RefreshError::Superseded(id)) if id == first_cycle.get()));

    let second_cycle = second.cycle();
    let outcome = second.wait().await.unwrap();
    assert_eq!(outcome.cycle, second_cycle);
    assert!(!outcome.did_timeout);

    // Outlive every timer of both cycles
    sleep(Duration::from_secs(20)).await;

    let events = drain(&mut rx);
    assert_eq!(finished_count(&events), 1);
    assert!(events.iter().all(|e| e.cycle() == second_cycle));
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_progress() {
    let feed = DelayedFeed::new(Duration::from_secs(1), vec![]);
    let coordinator = RefreshCoordinator::new(feed);

    let handle = coordinator.start_refresh(timings(3, 10)).unwrap();
    assert!(coordinator.is_refreshing());

    let (min_deadline, timeout_deadline) = coordinator.current_deadlines().unwrap();
    assert_eq!(timeout_deadline - min_deadline, Duration::from_secs(7));

    sleep(Duration::from_secs(2)).await;
    let (_, status) = coordinator.current_status().unwrap();
    assert_eq!(status, tempo_feed::CycleStatus::DataReady);

    handle.wait().await.unwrap();
    assert!(!coordinator.is_refreshing());
}
