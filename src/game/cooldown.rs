//! Per-Actor Cooldown
//!
//! Rate-limits the drop trigger. Entries are created on the first allowed
//! trigger, overwritten on each later one, and swept once they are old
//! enough that keeping them cannot change any decision.

use std::collections::BTreeMap;

use crate::core::ids::ActorId;
use crate::core::time::Tick;

/// Entries older than this many cooldown windows are evicted by [`CooldownGate::sweep`].
pub const COOLDOWN_EVICTION_WINDOWS: u64 = 4;

/// Rate limiter keyed by actor.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    /// Cooldown window (ticks)
    window: Tick,
    /// Last allowed trigger per actor
    last_trigger: BTreeMap<ActorId, Tick>,
}

impl CooldownGate {
    /// Create a gate with the given window.
    pub fn new(window: Tick) -> Self {
        Self {
            window,
            last_trigger: BTreeMap::new(),
        }
    }

    /// Cooldown window (ticks).
    pub fn window(&self) -> Tick {
        self.window
    }

    /// Change the window. Existing records are kept.
    pub fn set_window(&mut self, window: Tick) {
        self.window = window;
    }

    /// Try to use the actor's trigger at `now`.
    ///
    /// Returns true and records `now` if the actor has no record or its last
    /// trigger is at least one window old. Returns false and leaves the
    /// record untouched otherwise.
    pub fn try_consume(&mut self, actor: ActorId, now: Tick) -> bool {
        if !self.is_ready(actor, now) {
            return false;
        }
        self.last_trigger.insert(actor, now);
        true
    }

    /// Check if the actor could trigger at `now` without consuming.
    pub fn is_ready(&self, actor: ActorId, now: Tick) -> bool {
        self.last_trigger
            .get(&actor)
            .is_none_or(|&last| now.saturating_sub(last) >= self.window)
    }

    /// Last allowed trigger for an actor.
    pub fn last_trigger(&self, actor: ActorId) -> Option<Tick> {
        self.last_trigger.get(&actor).copied()
    }

    /// Ticks between sweeps / minimum record age for eviction.
    pub fn eviction_age(&self) -> Tick {
        self.window.saturating_mul(COOLDOWN_EVICTION_WINDOWS).max(1)
    }

    /// Drop records old enough to be irrelevant. Returns how many were removed.
    pub fn sweep(&mut self, now: Tick) -> usize {
        let age = self.eviction_age();
        let before = self.last_trigger.len();
        self.last_trigger
            .retain(|_, last| now.saturating_sub(*last) < age);
        before - self.last_trigger.len()
    }

    /// Number of tracked actors.
    pub fn len(&self) -> usize {
        self.last_trigger.len()
    }

    /// Check if no actor is tracked.
    pub fn is_empty(&self) -> bool {
        self.last_trigger.is_empty()
    }
}
