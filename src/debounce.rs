//! Cancellable delayed commit
//!
//! A `Debouncer` holds at most one pending value. Scheduling a new value
//! replaces the pending one and restarts the quiet period; the value is only
//! released by `poll` once the quiet period has elapsed without another
//! `schedule`. Time is supplied by the caller so tests can advance it freely.

use std::time::{Duration, Instant};

/// Quiet period before search input is committed
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedules `value` to fire `delay` after `now`, superseding any pending value
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Drops the pending value, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant at which the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Releases the pending value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if now < self.deadline()? {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }
}
