//! Core types for feed refresh

use crate::error::{RefreshError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tempo_core::Post;

/// Identity of one refresh cycle
///
/// Monotonic per coordinator; events carrying an older identity are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub(crate) u64);

impl CycleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion state of a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStatus {
    /// Waiting for the fetch
    Pending,
    /// Fetch returned, waiting for the minimum delay
    DataReady,
    /// Completion emitted
    Finished,
}

/// Minimum display delay and hard timeout for one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTimings {
    /// Earliest point after start at which a successful refresh completes
    pub min_delay: Duration,

    /// Point after start at which the refresh completes regardless of the fetch
    pub timeout: Duration,
}

impl RefreshTimings {
    /// Create validated timings
    pub fn new(min_delay: Duration, timeout: Duration) -> Result<Self> {
        let timings = Self { min_delay, timeout };
        timings.validate()?;
        Ok(timings)
    }

    /// First load when the feed screen appears: no minimum delay, 5s timeout
    pub fn initial_load() -> Self {
        Self {
            min_delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    /// User-initiated pull-to-refresh: 3s minimum so the spinner is readable, 10s timeout
    pub fn pull_to_refresh() -> Self {
        Self {
            min_delay: Duration::from_secs(3),
            timeout: Duration::from_secs(10),
        }
    }

    /// Check `timeout > min_delay`
    pub fn validate(&self) -> Result<()> {
        if self.timeout <= self.min_delay {
            return Err(RefreshError::InvalidTimings {
                min_delay: self.min_delay,
                timeout: self.timeout,
            });
        }
        Ok(())
    }
}

impl Default for RefreshTimings {
    fn default() -> Self {
        Self::pull_to_refresh()
    }
}

/// Result of one finished refresh cycle
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Cycle that produced this outcome
    pub cycle: CycleId,

    /// Posts in server order (newest first); empty on timeout without data
    pub posts: Vec<Post>,

    /// Whether the timeout, not the data, finished the cycle
    pub did_timeout: bool,

    /// Time from start to completion
    pub elapsed: Duration,
}
