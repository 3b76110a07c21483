//! Hazard Registry
//!
//! The set of charges this crate spawned and still answers for. A hazard is
//! in the registry from its spawn tick until `fuse + margin` has elapsed.
//! Absence means "the host's default damage rules apply to this object",
//! not "the object does not exist".

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::ids::{ActorId, HazardId};
use crate::core::time::Tick;

/// What we remember about a live hazard.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardRecord {
    /// Actor whose trigger spawned it
    pub owner: ActorId,
    /// Where it was released
    pub position: Vec3,
    /// Tick it was registered
    pub spawned_at: Tick,
    /// First tick it is no longer registered
    pub expires_at: Tick,
}

impl HazardRecord {
    /// Check if `now` falls inside `[spawned_at, expires_at)`.
    #[inline]
    pub fn covers(&self, now: Tick) -> bool {
        self.spawned_at <= now && now < self.expires_at
    }
}

/// Registry of live hazards, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct HazardRegistry {
    hazards: BTreeMap<HazardId, HazardRecord>,
}

impl HazardRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hazard. Replaces any record under the same id.
    pub fn insert(&mut self, id: HazardId, record: HazardRecord) {
        self.hazards.insert(id, record);
    }

    /// Remove a hazard. Idempotent.
    pub fn remove(&mut self, id: HazardId) -> Option<HazardRecord> {
        self.hazards.remove(&id)
    }

    /// Check if a hazard is registered and its window covers `now`.
    ///
    /// The window check keeps the answer exact even when the expiry timer
    /// has not been serviced yet this tick.
    pub fn is_tracked(&self, id: HazardId, now: Tick) -> bool {
        self.hazards.get(&id).is_some_and(|record| record.covers(now))
    }

    /// Check if a hazard is registered, ignoring its window.
    pub fn contains(&self, id: HazardId) -> bool {
        self.hazards.contains_key(&id)
    }

    /// Look up a hazard.
    pub fn get(&self, id: HazardId) -> Option<&HazardRecord> {
        self.hazards.get(&id)
    }

    /// Remove and return every registered id.
    pub fn drain(&mut self) -> Vec<HazardId> {
        let ids = self.hazards.keys().copied().collect();
        self.hazards.clear();
        ids
    }

    /// Number of registered hazards.
    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::EntityId;

    fn record(spawned_at: Tick, expires_at: Tick) -> HazardRecord {
        HazardRecord {
            owner: ActorId::new([1; 16]),
            position: Vec3::ZERO,
            spawned_at,
            expires_at,
        }
    }

    #[test]
    fn test_window_is_half_open() {
        let mut registry = HazardRegistry::new();
        let id = HazardId(EntityId::new(5));
        registry.insert(id, record(100, 580));

        assert!(!registry.is_tracked(id, 99));
        assert!(registry.is_tracked(id, 100));
        assert!(registry.is_tracked(id, 579));
        assert!(!registry.is_tracked(id, 580));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = HazardRegistry::new();
        let id = HazardId(EntityId::new(5));
        registry.insert(id, record(0, 10));

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_id_is_not_tracked() {
        let registry = HazardRegistry::new();
        assert!(!registry.is_tracked(HazardId(EntityId::new(1)), 0));
    }

    #[test]
    fn test_drain_empties() {
        let mut registry = HazardRegistry::new();
        registry.insert(HazardId(EntityId::new(2)), record(0, 10));
        registry.insert(HazardId(EntityId::new(1)), record(0, 10));

        let drained = registry.drain();
        assert_eq!(drained, vec![HazardId(EntityId::new(1)), HazardId(EntityId::new(2))]);
        assert!(registry.is_empty());
    }
}
