//! Retry pacing for non-blocking pushes.
//!
//! Doubles the wait after a push that made no progress and halves it after
//! one that did, always staying within [`MIN_INTERVAL`, `MAX_INTERVAL`].

use std::time::Duration;

pub const MIN_INTERVAL: Duration = Duration::from_micros(100);
pub const MAX_INTERVAL: Duration = Duration::from_secs(1);

/// Next wait after an attempt that did (`true`) or did not accept any bytes.
///
/// # Example
///
/// ```
/// # use std::time::Duration;
/// # use quay::files::pacer::next_interval;
/// let blocked = next_interval(Duration::from_micros(100), false);
/// assert_eq!(blocked, Duration::from_micros(200));
/// assert_eq!(next_interval(blocked, true), Duration::from_micros(100));
/// ```
pub fn next_interval(current: Duration, accepted_any_bytes: bool) -> Duration {
    let next = if accepted_any_bytes {
        current / 2
    } else {
        current.saturating_mul(2)
    };
    next.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// Per-session pacing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptivePacer {
    interval: Duration,
}

impl AdaptivePacer {
    pub fn new() -> Self {
        Self {
            interval: MIN_INTERVAL,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Records an attempt's outcome and returns how long to wait before the next one.
    pub fn observe(&mut self, accepted: usize) -> Duration {
        self.interval = next_interval(self.interval, accepted > 0);
        self.interval
    }
}

impl Default for AdaptivePacer {
    fn default() -> Self {
        Self::new()
    }
}
