//! Deferred Actions
//!
//! One-shot timers serviced from the host loop. Actions fire in expiry
//! order; actions due on the same tick fire in submission order. Nothing is
//! cancellable: an action whose target is already gone is a no-op when it
//! runs.

use std::collections::BTreeMap;

use crate::core::ids::HazardId;
use crate::core::time::Tick;

/// Work the plugin defers to a later tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Drop a hazard from the registry.
    ExpireHazard(HazardId),
    /// Evict stale cooldown records, then re-arm.
    SweepCooldowns,
}

/// Min-ordered queue of deferred actions.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Keyed by (due tick, submission sequence)
    pending: BTreeMap<(Tick, u64), DeferredAction>,
    /// Next submission sequence number
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `due` is reached.
    pub fn schedule(&mut self, due: Tick, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((due, seq), action);
    }

    /// Remove and return every action due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: Tick) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    /// Tick of the earliest pending action.
    pub fn next_due(&self) -> Option<Tick> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Check if an identical action is pending.
    pub fn is_pending(&self, action: DeferredAction) -> bool {
        self.pending.values().any(|a| *a == action)
    }

    /// Drop everything pending.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
