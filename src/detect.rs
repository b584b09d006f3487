//! Change detection for the host's list region.
//!
//! This module provides the [`ChangeDetector`], which turns the host's
//! raw change notifications into debounced reconciliation triggers, and
//! the [`PassTrigger`] enum for representing why a pass should run.
//!
//! Two mechanisms keep the engine from reacting to itself:
//! - changes originating inside an overlay-marked subtree are classified
//!   as the engine's own writes and ignored;
//! - anything arriving while a pass is in flight is suppressed outright.
//!
//! Bursts of notifications coalesce into one scheduled pass through a
//! single-slot debounce; a later notification replaces an unfired
//! earlier one, never queues. A low-frequency fallback fires
//! independently so drift survives lost notifications for at most one
//! interval.

use tracing::debug;

use crate::host::RegionChange;
use crate::schedule::{DebounceSlot, IntervalTimer, Tick};

/// Ticks between the last host notification and the scheduled pass.
pub const DEBOUNCE: Tick = 150;

/// Ticks between fallback drift checks.
pub const FALLBACK_INTERVAL: Tick = 5_000;

/// Why the detector wants a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTrigger {
    /// The debounce window after host notifications elapsed.
    Debounced,
    /// The low-frequency fallback interval elapsed; run only if the
    /// drift probe reports drift.
    Fallback,
}

/// Watches the host's list region and schedules engine passes.
#[derive(Debug)]
pub struct ChangeDetector {
    debounce: Tick,
    slot: DebounceSlot,
    fallback: IntervalTimer,
    suppressed_own: usize,
    suppressed_busy: usize,
    coalesced: usize,
}

impl ChangeDetector {
    /// A detector with the default timing.
    pub fn new(start: Tick) -> Self {
        Self::with_timing(start, DEBOUNCE, FALLBACK_INTERVAL)
    }

    /// A detector with explicit debounce and fallback timing.
    pub fn with_timing(start: Tick, debounce: Tick, fallback_every: Tick) -> Self {
        Self {
            debounce,
            slot: DebounceSlot::idle(),
            fallback: IntervalTimer::new(start, fallback_every),
            suppressed_own: 0,
            suppressed_busy: 0,
            coalesced: 0,
        }
    }

    /// Feed one host notification.
    ///
    /// `engine_busy` is the engine's re-entrancy flag: notifications
    /// observed mid-pass are structural fallout of the pass itself.
    pub fn observe(&mut self, change: &RegionChange, engine_busy: bool, now: Tick) {
        if change.in_overlay {
            self.suppressed_own += 1;
            return;
        }
        if engine_busy {
            self.suppressed_busy += 1;
            return;
        }

        if self.slot.pending() {
            self.coalesced += 1;
        }
        self.slot.schedule(now + self.debounce);
        debug!(kind = ?change.kind, "Scheduled reconciliation pass");
    }

    /// Poll for a due trigger. At most one per call; the debounced slot
    /// wins over the fallback.
    pub fn poll(&mut self, now: Tick) -> Option<PassTrigger> {
        if self.slot.fire(now) {
            return Some(PassTrigger::Debounced);
        }
        if self.fallback.fire(now) {
            return Some(PassTrigger::Fallback);
        }
        None
    }

    /// Whether a debounced pass is scheduled but not yet fired.
    pub fn pass_pending(&self) -> bool {
        self.slot.pending()
    }

    /// Notifications ignored as the engine's own writes.
    pub fn suppressed_own(&self) -> usize {
        self.suppressed_own
    }

    /// Notifications dropped because a pass was in flight.
    pub fn suppressed_busy(&self) -> usize {
        self.suppressed_busy
    }

    /// Notifications absorbed into an already-pending schedule.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_coalesces_into_one_trigger() {
        let mut detector = ChangeDetector::new(0);

        for t in 0..5 {
            detector.observe(&RegionChange::child_list(), false, t);
        }
        assert_eq!(detector.coalesced(), 4);

        // The burst replaced, not queued: nothing due at the original
        // deadline, one trigger at the replacement deadline.
        assert_eq!(detector.poll(DEBOUNCE - 1), None);
        assert_eq!(detector.poll(4 + DEBOUNCE), Some(PassTrigger::Debounced));
        assert_eq!(detector.poll(4 + DEBOUNCE), None);
    }

    #[test]
    fn overlay_changes_never_schedule() {
        let mut detector = ChangeDetector::new(0);

        detector.observe(&RegionChange::child_list().within_overlay(), false, 0);
        detector.observe(&RegionChange::visibility().within_overlay(), false, 0);

        assert!(!detector.pass_pending());
        assert_eq!(detector.suppressed_own(), 2);
    }

    #[test]
    fn mid_pass_changes_are_dropped_not_queued() {
        let mut detector = ChangeDetector::new(0);

        detector.observe(&RegionChange::child_list(), true, 0);

        assert!(!detector.pass_pending());
        assert_eq!(detector.suppressed_busy(), 1);
    }

    #[test]
    fn fallback_fires_without_notifications() {
        let mut detector = ChangeDetector::new(0);

        assert_eq!(detector.poll(FALLBACK_INTERVAL - 1), None);
        assert_eq!(detector.poll(FALLBACK_INTERVAL), Some(PassTrigger::Fallback));
        assert_eq!(detector.poll(FALLBACK_INTERVAL + 1), None);
    }

    #[test]
    fn debounced_trigger_wins_over_fallback() {
        let mut detector = ChangeDetector::with_timing(0, 100, 1000);
        detector.observe(&RegionChange::child_list(), false, 950);

        assert_eq!(detector.poll(1050), Some(PassTrigger::Debounced));
        // Fallback is still due on the next poll.
        assert_eq!(detector.poll(1050), Some(PassTrigger::Fallback));
    }
}
