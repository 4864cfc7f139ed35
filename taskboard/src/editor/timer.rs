//! Cancellable single-shot debounce timer.
//!
//! The timer holds at most one deadline. Arming it again replaces the
//! previous deadline, so only the most recent arming can fire. It does not
//! spawn anything; the owner polls it or sleeps until [`DebounceTimer::deadline`].

use std::time::Duration;

use tokio::time::Instant;

/// Handle identifying one arming of a [`DebounceTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arming(u64);

/// Debounce timer with cancel-then-schedule semantics.
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    delay: Duration,
    pending: Option<(Arming, Instant)>,
    generation: u64,
}

impl DebounceTimer {
    /// Creates a disarmed timer with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            generation: 0,
        }
    }

    /// The configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending deadline and schedules a new one `delay` after `now`.
    pub fn arm(&mut self, now: Instant) -> Arming {
        self.arm_at(now, self.delay)
    }

    /// Cancels any pending deadline and schedules one `after` from `now`.
    pub fn arm_at(&mut self, now: Instant, after: Duration) -> Arming {
        self.generation = self.generation.wrapping_add(1);
        let arming = Arming(self.generation);
        self.pending = Some((arming, now.checked_add(after).unwrap_or(now)));
        arming
    }

    /// Cancels the pending deadline, if any.
    pub const fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns `true` if a deadline is pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Returns `true` if the pending deadline has passed.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|at| now >= at)
    }

    /// Fires the timer if it is due, disarming it.
    ///
    /// Returns the arming that fired, or `None` if nothing was due.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<Arming> {
        if !self.is_due(now) {
            return None;
        }
        self.pending.take().map(|(arming, _)| arming)
    }
}
