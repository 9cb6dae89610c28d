//! Refresh cycle state machine
//!
//! Three independent events race for one cycle: the fetch completing, the
//! minimum-delay timer, and the timeout timer. `apply` folds them in delivery
//! order and reports at most one `Finish` over the cycle's lifetime.

use crate::types::{CycleId, CycleStatus};
use tempo_core::{Post, TempoError};
use tokio::time::Instant;
use tracing::warn;

/// Something that happened to a cycle
#[derive(Debug)]
pub(crate) enum CycleEvent {
    Fetched(Result<Vec<Post>, TempoError>),
    MinDelayElapsed,
    TimedOut,
}

/// What the coordinator must do after applying an event
#[derive(Debug, PartialEq)]
pub(crate) enum Step {
    /// Nothing observable yet
    Wait,
    /// Emit completion now
    Finish { did_timeout: bool, posts: Vec<Post> },
    /// Fetch landed after a timeout finish
    Late(Vec<Post>),
    /// Event arrived after finish and carries nothing new
    Ignore,
}

/// One bounded-latency refresh attempt
#[derive(Debug)]
pub(crate) struct RefreshCycle {
    pub(crate) id: CycleId,
    pub(crate) started_at: Instant,
    pub(crate) min_deadline: Instant,
    pub(crate) timeout_deadline: Instant,
    status: CycleStatus,
    min_delay_elapsed: bool,
    fetch_failed: bool,
    posts: Option<Vec<Post>>,
}

impl RefreshCycle {
    pub(crate) fn new(
        id: CycleId,
        started_at: Instant,
        min_deadline: Instant,
        timeout_deadline: Instant,
    ) -> Self {
        Self {
            id,
            started_at,
            min_deadline,
            timeout_deadline,
            status: CycleStatus::Pending,
            min_delay_elapsed: false,
            fetch_failed: false,
            posts: None,
        }
    }

    pub(crate) fn status(&self) -> CycleStatus {
        self.status
    }

    pub(crate) fn fetch_failed(&self) -> bool {
        self.fetch_failed
    }

    /// Fold one event into the cycle
    pub(crate) fn apply(&mut self, event: CycleEvent) -> Step {
        match (self.status, event) {
            (CycleStatus::Finished, CycleEvent::Fetched(Ok(posts))) => Step::Late(posts),
            (CycleStatus::Finished, _) => Step::Ignore,

            (_, CycleEvent::TimedOut) => {
                let posts = self.posts.take().unwrap_or_default();
                self.status = CycleStatus::Finished;
                Step::Finish {
                    did_timeout: true,
                    posts,
                }
            }

            (CycleStatus::Pending, CycleEvent::Fetched(Ok(posts))) => {
                if self.min_delay_elapsed {
                    self.status = CycleStatus::Finished;
                    Step::Finish {
                        did_timeout: false,
                        posts,
                    }
                } else {
                    self.posts = Some(posts);
                    self.status = CycleStatus::DataReady;
                    Step::Wait
                }
            }
            (CycleStatus::Pending, CycleEvent::Fetched(Err(err))) => {
                // No data: only the timeout can finish this cycle now
                warn!(cycle = %self.id, error = %err, "Feed fetch failed");
                self.fetch_failed = true;
                Step::Wait
            }
            (CycleStatus::Pending, CycleEvent::MinDelayElapsed) => {
                self.min_delay_elapsed = true;
                Step::Wait
            }

            (CycleStatus::DataReady, CycleEvent::MinDelayElapsed) => {
                self.min_delay_elapsed = true;
                let posts = self.posts.take().unwrap_or_default();
                self.status = CycleStatus::Finished;
                Step::Finish {
                    did_timeout: false,
                    posts,
                }
            }
            // A cycle issues a single fetch
            (CycleStatus::DataReady, CycleEvent::Fetched(_)) => Step::Ignore,
        }
    }
}
