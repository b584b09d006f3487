//! Cooperative scheduling primitives.
//!
//! The crate runs in a single cooperative execution context: the embedder
//! owns the timers and feeds the current time into [`Overlay::advance`]
//! (see [`crate::overlay`]). Time is expressed in [`Tick`]s, an abstract
//! millisecond count with no fixed epoch.
//!
//! [`DebounceSlot`] models the single-slot pending-task rule used for both
//! reconciliation scheduling and settings flushes: a new schedule request
//! cancels and replaces any unfired prior one, never queues a duplicate.
//!
//! [`Overlay::advance`]: crate::overlay::Overlay::advance

/// Abstract milliseconds supplied by the embedder.
pub type Tick = u64;

/// A single-slot debounced task schedule.
///
/// Holds at most one pending fire time. Scheduling while a fire is pending
/// replaces the old deadline.
#[derive(Debug, Default, Clone)]
pub struct DebounceSlot {
    fire_at: Option<Tick>,
}

impl DebounceSlot {
    /// Create an idle slot.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Schedule (or reschedule) the task to fire at `at`.
    pub fn schedule(&mut self, at: Tick) {
        self.fire_at = Some(at);
    }

    /// Whether a fire is pending.
    pub fn pending(&self) -> bool {
        self.fire_at.is_some()
    }

    /// Drop any pending fire.
    pub fn cancel(&mut self) {
        self.fire_at = None;
    }

    /// Consume the pending fire if it is due at `now`.
    pub fn fire(&mut self, now: Tick) -> bool {
        match self.fire_at {
            Some(at) if now >= at => {
                self.fire_at = None;
                true
            }
            _ => false,
        }
    }
}

/// A fixed-interval timer for low-frequency background checks.
///
/// Firing reschedules relative to `now`, so a long idle gap produces one
/// catch-up fire rather than a burst.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    every: Tick,
    next: Tick,
}

impl IntervalTimer {
    /// Create a timer that first fires `every` ticks after `start`.
    pub fn new(start: Tick, every: Tick) -> Self {
        Self {
            every,
            next: start.saturating_add(every),
        }
    }

    /// Consume a fire if the interval has elapsed at `now`.
    pub fn fire(&mut self, now: Tick) -> bool {
        if now >= self.next {
            self.next = now.saturating_add(self.every);
            true
        } else {
            false
        }
    }

    /// The configured interval.
    pub fn every(&self) -> Tick {
        self.every
    }
}
