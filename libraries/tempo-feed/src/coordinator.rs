//! Refresh coordinator - bounded-latency fetch orchestration
//!
//! Each `start_refresh` creates a new cycle, supersedes the previous one, and
//! spawns three tasks (fetch, minimum-delay timer, timeout timer). Every task
//! reports back through the same mutex-guarded state and checks the cycle
//! identity first, so events from a superseded cycle are dropped.

use crate::{
    cycle::{CycleEvent, RefreshCycle, Step},
    error::{RefreshError, Result},
    events::FeedEvent,
    types::{CycleId, CycleStatus, RefreshOutcome, RefreshTimings},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempo_core::FeedSource;
use tokio::sync::{broadcast, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Capacity of the feed event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Completion of one refresh cycle
///
/// Resolves once, when the cycle finishes. Resolves to
/// [`RefreshError::Superseded`] if a newer refresh replaced the cycle first.
#[derive(Debug)]
pub struct RefreshHandle {
    cycle: CycleId,
    completion: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshHandle {
    /// Cycle this handle waits on
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Wait for the cycle to finish
    pub async fn wait(self) -> Result<RefreshOutcome> {
        self.completion
            .await
            .map_err(|_| RefreshError::Superseded(self.cycle.get()))
    }
}

struct Slot {
    cycle: RefreshCycle,
    completion: Option<oneshot::Sender<RefreshOutcome>>,
}

#[derive(Default)]
struct State {
    next_cycle: u64,
    current: Option<Slot>,
}

struct Shared {
    state: Mutex<State>,
    events: broadcast::Sender<FeedEvent>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver one event to cycle `id`; dropped if `id` is no longer current
    fn deliver(&self, id: CycleId, event: CycleEvent) {
        let mut state = self.state();
        let Some(slot) = state.current.as_mut().filter(|slot| slot.cycle.id == id) else {
            debug!(cycle = %id, ?event, "Dropping event from superseded refresh cycle");
            return;
        };

        match slot.cycle.apply(event) {
            Step::Wait | Step::Ignore => {}
            Step::Finish { did_timeout, posts } => {
                let outcome = RefreshOutcome {
                    cycle: id,
                    posts,
                    did_timeout,
                    elapsed: slot.cycle.started_at.elapsed(),
                };
                info!(
                    cycle = %id,
                    posts = outcome.posts.len(),
                    did_timeout,
                    fetch_failed = slot.cycle.fetch_failed(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "Refresh finished"
                );
                if let Some(completion) = slot.completion.take() {
                    // Receiver may have been dropped by a caller that only listens to events
                    let _ = completion.send(outcome.clone());
                }
                let _ = self.events.send(FeedEvent::RefreshFinished(outcome));
            }
            Step::Late(posts) => {
                info!(cycle = %id, posts = posts.len(), "Feed arrived after refresh timeout");
                let _ = self.events.send(FeedEvent::LatePostsArrived { cycle: id, posts });
            }
        }
    }
}

/// Runs bounded-latency refresh cycles against a [`FeedSource`]
///
/// Must be used from within a Tokio runtime; `start_refresh` spawns tasks.
pub struct RefreshCoordinator {
    source: Arc<dyn FeedSource>,
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    /// Create a coordinator fetching from `source`
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                events,
            }),
        }
    }

    /// Subscribe to feed events
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.shared.events.subscribe()
    }

    /// Start a new refresh cycle, superseding any cycle in flight
    ///
    /// # Errors
    /// Returns [`RefreshError::InvalidTimings`] unless `timeout > min_delay`.
    pub fn start_refresh(&self, timings: RefreshTimings) -> Result<RefreshHandle> {
        timings.validate()?;

        let started_at = Instant::now();
        let (completion_tx, completion_rx) = oneshot::channel();

        let id = {
            let mut state = self.shared.state();
            state.next_cycle += 1;
            let id = CycleId(state.next_cycle);

            let previous = state.current.replace(Slot {
                cycle: RefreshCycle::new(
                    id,
                    started_at,
                    started_at + timings.min_delay,
                    started_at + timings.timeout,
                ),
                completion: Some(completion_tx),
            });
            if let Some(previous) = previous {
                if previous.cycle.status() != CycleStatus::Finished {
                    debug!(old = %previous.cycle.id, new = %id, "Superseding refresh in flight");
                }
            }
            id
        };

        debug!(
            cycle = %id,
            min_delay_ms = timings.min_delay.as_millis() as u64,
            timeout_ms = timings.timeout.as_millis() as u64,
            "Starting refresh"
        );

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = source.fetch_feed().await;
            shared.deliver(id, CycleEvent::Fetched(result));
        });

        let shared = Arc::clone(&self.shared);
        let min_deadline = started_at + timings.min_delay;
        tokio::spawn(async move {
            sleep_until(min_deadline).await;
            shared.deliver(id, CycleEvent::MinDelayElapsed);
        });

        let shared = Arc::clone(&self.shared);
        let timeout_deadline = started_at + timings.timeout;
        tokio::spawn(async move {
            sleep_until(timeout_deadline).await;
            shared.deliver(id, CycleEvent::TimedOut);
        });

        Ok(RefreshHandle {
            cycle: id,
            completion: completion_rx,
        })
    }

    /// Status of the newest cycle, if any was started
    pub fn current_status(&self) -> Option<(CycleId, CycleStatus)> {
        self.shared
            .state()
            .current
            .as_ref()
            .map(|slot| (slot.cycle.id, slot.cycle.status()))
    }

    /// Whether the newest cycle has yet to finish
    pub fn is_refreshing(&self) -> bool {
        matches!(
            self.current_status(),
            Some((_, CycleStatus::Pending | CycleStatus::DataReady))
        )
    }

    /// Deadlines of the newest cycle (minimum delay, timeout)
    pub fn current_deadlines(&self) -> Option<(Instant, Instant)> {
        self.shared
            .state()
            .current
            .as_ref()
            .map(|slot| (slot.cycle.min_deadline, slot.cycle.timeout_deadline))
    }
}
