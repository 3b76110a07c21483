//! Plugin Events
//!
//! Everything observable the plugin does is recorded as an event, so the
//! host (or a test) can see what happened without scraping logs.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::ids::{ActorId, EntityId, HazardId};
use crate::core::time::Tick;
use crate::host::DamageCategory;

/// Event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChargeEventData {
    /// A charge was released and registered
    HazardSpawned {
        hazard: HazardId,
        owner: ActorId,
        position: Vec3,
    },

    /// A charge's registration window closed
    HazardExpired {
        hazard: HazardId,
    },

    /// A hit from a registered charge was rewritten
    DamageOverridden {
        hazard: HazardId,
        target: EntityId,
        category: DamageCategory,
        amount: f32,
    },

    /// An operated carrier was destroyed and detonated
    CarrierDetonated {
        carrier: EntityId,
        station: EntityId,
        position: Vec3,
        hits: usize,
    },

    /// Carrier detonation hit a host inconsistency and was abandoned
    CarrierDetonationFailed {
        carrier: EntityId,
        reason: String,
    },

    /// Stale cooldown records were evicted
    CooldownsSwept {
        evicted: usize,
    },

    /// Plugin unload destroyed the remaining charges
    HazardsPurged {
        killed: usize,
        cleared: usize,
    },
}

/// An event with the tick it happened on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargeEvent {
    /// Tick when event occurred
    pub tick: Tick,

    /// Event data
    pub data: ChargeEventData,
}

impl ChargeEvent {
    /// Create a new event.
    pub fn new(tick: Tick, data: ChargeEventData) -> Self {
        Self { tick, data }
    }

    /// Create hazard spawned event.
    pub fn hazard_spawned(tick: Tick, hazard: HazardId, owner: ActorId, position: Vec3) -> Self {
        Self::new(tick, ChargeEventData::HazardSpawned { hazard, owner, position })
    }

    /// Create hazard expired event.
    pub fn hazard_expired(tick: Tick, hazard: HazardId) -> Self {
        Self::new(tick, ChargeEventData::HazardExpired { hazard })
    }

    /// Create damage overridden event.
    pub fn damage_overridden(
        tick: Tick,
        hazard: HazardId,
        target: EntityId,
        category: DamageCategory,
        amount: f32,
    ) -> Self {
        Self::new(
            tick,
            ChargeEventData::DamageOverridden {
                hazard,
                target,
                category,
                amount,
            },
        )
    }

    /// Create carrier detonated event.
    pub fn carrier_detonated(
        tick: Tick,
        carrier: EntityId,
        station: EntityId,
        position: Vec3,
        hits: usize,
    ) -> Self {
        Self::new(
            tick,
            ChargeEventData::CarrierDetonated {
                carrier,
                station,
                position,
                hits,
            },
        )
    }

    /// Create carrier detonation failed event.
    pub fn carrier_detonation_failed(tick: Tick, carrier: EntityId, reason: impl Into<String>) -> Self {
        Self::new(
            tick,
            ChargeEventData::CarrierDetonationFailed {
                carrier,
                reason: reason.into(),
            },
        )
    }

    /// Create cooldowns swept event.
    pub fn cooldowns_swept(tick: Tick, evicted: usize) -> Self {
        Self::new(tick, ChargeEventData::CooldownsSwept { evicted })
    }

    /// Create hazards purged event.
    pub fn hazards_purged(tick: Tick, killed: usize, cleared: usize) -> Self {
        Self::new(tick, ChargeEventData::HazardsPurged { killed, cleared })
    }

    /// Hazard this event concerns, if any.
    pub fn hazard(&self) -> Option<HazardId> {
        match &self.data {
            ChargeEventData::HazardSpawned { hazard, .. }
            | ChargeEventData::HazardExpired { hazard }
            | ChargeEventData::DamageOverridden { hazard, .. } => Some(*hazard),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_accessor() {
        let hazard = HazardId(EntityId::new(3));
        let event = ChargeEvent::hazard_expired(10, hazard);
        assert_eq!(event.hazard(), Some(hazard));

        let event = ChargeEvent::cooldowns_swept(10, 2);
        assert_eq!(event.hazard(), None);
    }

    #[test]
    fn test_events_serialize() {
        let event = ChargeEvent::damage_overridden(
            7,
            HazardId(EntityId::new(1)),
            EntityId::new(2),
            DamageCategory::Structure,
            1500.0,
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("DamageOverridden"));
        let back: ChargeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
