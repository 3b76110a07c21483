//! Carrier Destruction
//!
//! A carrier that dies while a station is operating it detonates where it
//! was. Which station (if any) operates a carrier comes from a back-reference
//! kept at control start/stop, confirmed against the host at event time, so
//! the death handler never scans the world.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Serialize, Deserialize};
use tracing::{debug, error, info};

use crate::core::ids::EntityId;
use crate::game::detonation::detonate;
use crate::game::events::ChargeEvent;
use crate::game::state::ChargeState;
use crate::host::{EntityKind, Host, HostError, CARRIER_EXPLOSION_EFFECT};

// =============================================================================
// CONTROL INDEX
// =============================================================================

/// Carrier <-> station back-references.
///
/// One station controls at most one carrier and vice versa.
#[derive(Debug, Clone, Default)]
pub struct ControlIndex {
    by_carrier: BTreeMap<EntityId, EntityId>,
    by_station: BTreeMap<EntityId, EntityId>,
}

impl ControlIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `station` now controls `carrier`.
    ///
    /// Drops whatever either side was linked to before.
    pub fn link(&mut self, station: EntityId, carrier: EntityId) {
        self.unlink_station(station);
        self.forget_carrier(carrier);
        self.by_carrier.insert(carrier, station);
        self.by_station.insert(station, carrier);
    }

    /// Record that `station` stopped controlling. Returns the released carrier.
    pub fn unlink_station(&mut self, station: EntityId) -> Option<EntityId> {
        let carrier = self.by_station.remove(&station)?;
        self.by_carrier.remove(&carrier);
        Some(carrier)
    }

    /// Drop a carrier from the index. Returns the station that controlled it.
    pub fn forget_carrier(&mut self, carrier: EntityId) -> Option<EntityId> {
        let station = self.by_carrier.remove(&carrier)?;
        self.by_station.remove(&station);
        Some(station)
    }

    /// Station recorded as controlling `carrier`.
    pub fn controller_of(&self, carrier: EntityId) -> Option<EntityId> {
        self.by_carrier.get(&carrier).copied()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.by_carrier.clear();
        self.by_station.clear();
    }

    /// Number of linked pairs.
    pub fn len(&self) -> usize {
        self.by_carrier.len()
    }

    /// Check if nothing is linked.
    pub fn is_empty(&self) -> bool {
        self.by_carrier.is_empty()
    }
}

// =============================================================================
// DESTRUCTION HANDLER
// =============================================================================

/// What a carrier death led to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CarrierOutcome {
    /// No station was operating it.
    Unguarded,
    /// It detonated.
    Detonated {
        /// Station that was operating it
        station: EntityId,
        /// Where it detonated
        position: Vec3,
        /// Entities hit
        hits: usize,
    },
    /// Detonation was attempted and abandoned.
    Failed {
        /// Station that was operating it
        station: EntityId,
        /// Host error text
        reason: String,
    },
}

/// Link every station the host reports as already controlling a carrier.
///
/// Returns how many links were recorded.
pub fn seed_controls<H: Host + ?Sized>(host: &H, controls: &mut ControlIndex) -> usize {
    let mut linked = 0;
    for station in host.stations() {
        let Some(carrier) = host.controlled_entity(station) else {
            continue;
        };
        if host.entity_kind(carrier) == Some(EntityKind::Carrier) {
            controls.link(station, carrier);
            linked += 1;
        }
    }
    linked
}

/// Station actually operating `carrier` right now.
///
/// The index proposes a station and the host has the final word. When the
/// index has nothing (or is stale) every station is asked.
pub fn active_controller<H: Host + ?Sized>(
    host: &H,
    controls: &ControlIndex,
    carrier: EntityId,
) -> Option<EntityId> {
    if let Some(station) = controls.controller_of(carrier) {
        if host.controlled_entity(station) == Some(carrier) {
            return Some(station);
        }
    }
    let station = host
        .stations()
        .into_iter()
        .find(|station| host.controlled_entity(*station) == Some(carrier));
    if let Some(station) = station {
        debug!("Carrier {} found under unindexed station {}", carrier, station);
    }
    station
}

/// Handle the death of `carrier`.
///
/// Never fails: host inconsistencies during detonation are logged and
/// reported as [`CarrierOutcome::Failed`]. The carrier is dropped from the
/// control index either way.
pub fn handle_carrier_destroyed<H: Host + ?Sized>(
    host: &mut H,
    state: &mut ChargeState,
    carrier: EntityId,
) -> CarrierOutcome {
    let station = active_controller(host, &state.controls, carrier);
    state.controls.forget_carrier(carrier);

    let Some(station) = station else {
        return CarrierOutcome::Unguarded;
    };

    let now = host.now();
    match detonate_carrier(host, state, carrier) {
        Ok((position, hits)) => {
            info!(
                "Carrier {} (station {}) detonated at ({:.1}, {:.1}, {:.1}), {} hit",
                carrier, station, position.x, position.y, position.z, hits
            );
            state.push_event(ChargeEvent::carrier_detonated(now, carrier, station, position, hits));
            CarrierOutcome::Detonated { station, position, hits }
        }
        Err(err) => {
            error!("Carrier {} detonation failed: {}", carrier, err);
            let reason = err.to_string();
            state.push_event(ChargeEvent::carrier_detonation_failed(now, carrier, reason.clone()));
            CarrierOutcome::Failed { station, reason }
        }
    }
}

fn detonate_carrier<H: Host + ?Sized>(
    host: &mut H,
    state: &ChargeState,
    carrier: EntityId,
) -> Result<(Vec3, usize), HostError> {
    let position = host.position(carrier)?;
    let hits = detonate(host, &state.config.carrier_blast(position))?;
    host.play_effect(CARRIER_EXPLOSION_EFFECT, position);
    Ok((position, hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::sim::{SimWorld, PLAYER_HEALTH, STRUCTURE_HEALTH};

    fn id(n: u64) -> EntityId {
        EntityId::new(n)
    }

    #[test]
    fn test_link_replaces_both_sides() {
        let mut index = ControlIndex::new();
        index.link(id(1), id(10));
        index.link(id(1), id(11));
        assert_eq!(index.controller_of(id(10)), None);
        assert_eq!(index.controller_of(id(11)), Some(id(1)));

        index.link(id(2), id(11));
        assert_eq!(index.unlink_station(id(1)), None);
        assert_eq!(index.controller_of(id(11)), Some(id(2)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unlink_station() {
        let mut index = ControlIndex::new();
        index.link(id(1), id(10));
        assert_eq!(index.unlink_station(id(1)), Some(id(10)));
        assert!(index.is_empty());
        assert_eq!(index.unlink_station(id(1)), None);
    }

    /// World with a station linked to a carrier at (0, 5, 0), a player and a wall nearby.
    fn operated_carrier() -> (SimWorld, ChargeState, EntityId, EntityId, EntityId, EntityId) {
        let mut world = SimWorld::new();
        let mut state = ChargeState::new(Configuration::default());
        let station = world.spawn_station(Vec3::new(100.0, 0.0, 0.0));
        let carrier = world.spawn_carrier(Vec3::new(0.0, 5.0, 0.0));
        let player = world.spawn_player(Vec3::new(3.0, 0.0, 0.0));
        let wall = world.spawn_structure(Vec3::new(0.0, 0.0, 4.0));
        world.set_controlling(station, Some(carrier));
        state.controls.link(station, carrier);
        (world, state, station, carrier, player, wall)
    }

    #[test]
    fn test_operated_carrier_detonates() {
        let (mut world, mut state, station, carrier, player, wall) = operated_carrier();

        let outcome = handle_carrier_destroyed(&mut world, &mut state, carrier);

        match outcome {
            CarrierOutcome::Detonated { station: s, position, hits } => {
                assert_eq!(s, station);
                assert_eq!(position, Vec3::new(0.0, 5.0, 0.0));
                // carrier itself, player, wall
                assert_eq!(hits, 3);
            }
            other => panic!("expected detonation, got {:?}", other),
        }
        assert_eq!(world.health(player), Some(PLAYER_HEALTH - 500.0));
        assert_eq!(world.health(wall), Some(STRUCTURE_HEALTH - 2500.0));
        assert_eq!(world.effects().last().unwrap().effect, CARRIER_EXPLOSION_EFFECT);
        assert!(state.controls.is_empty());
    }

    #[test]
    fn test_unguarded_carrier_does_nothing() {
        let mut world = SimWorld::new();
        let mut state = ChargeState::new(Configuration::default());
        let carrier = world.spawn_carrier(Vec3::ZERO);
        let wall = world.spawn_structure(Vec3::X);

        let outcome = handle_carrier_destroyed(&mut world, &mut state, carrier);

        assert_eq!(outcome, CarrierOutcome::Unguarded);
        assert_eq!(world.health(wall), Some(STRUCTURE_HEALTH));
        assert!(world.damage_log().is_empty());
        assert!(world.effects().is_empty());
    }

    #[test]
    fn test_stale_link_is_not_trusted() {
        let (mut world, mut state, station, carrier, _, wall) = operated_carrier();
        // Host says the station let go; the index never heard about it
        world.set_controlling(station, None);

        let outcome = handle_carrier_destroyed(&mut world, &mut state, carrier);

        assert_eq!(outcome, CarrierOutcome::Unguarded);
        assert_eq!(world.health(wall), Some(STRUCTURE_HEALTH));
    }

    #[test]
    fn test_unindexed_controller_is_found() {
        let (mut world, mut state, station, carrier, _, wall) = operated_carrier();
        // Control began before the index was listening
        state.controls.clear();

        let outcome = handle_carrier_destroyed(&mut world, &mut state, carrier);

        assert!(matches!(outcome, CarrierOutcome::Detonated { station: s, .. } if s == station));
        assert_eq!(world.health(wall), Some(STRUCTURE_HEALTH - 2500.0));
    }

    #[test]
    fn test_seed_controls_links_only_carriers() {
        let mut world = SimWorld::new();
        let piloting = world.spawn_station(Vec3::ZERO);
        let turret_desk = world.spawn_station(Vec3::X);
        let idle = world.spawn_station(Vec3::Y);
        let carrier = world.spawn_carrier(Vec3::Z);
        let turret = world.spawn_structure(Vec3::Z);
        world.set_controlling(piloting, Some(carrier));
        world.set_controlling(turret_desk, Some(turret));
        let mut index = ControlIndex::new();

        assert_eq!(seed_controls(&world, &mut index), 1);
        assert_eq!(index.controller_of(carrier), Some(piloting));
        assert_eq!(index.controller_of(turret), None);
        assert_eq!(index.unlink_station(idle), None);
    }

    #[test]
    fn test_invalid_transform_is_contained() {
        let (mut world, mut state, station, carrier, _, _) = operated_carrier();
        world.invalidate_transform(carrier);

        let outcome = handle_carrier_destroyed(&mut world, &mut state, carrier);

        match outcome {
            CarrierOutcome::Failed { station: s, reason } => {
                assert_eq!(s, station);
                assert!(reason.contains("invalid"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(world.effects().is_empty());
        assert_eq!(state.events().len(), 1);
    }
}
