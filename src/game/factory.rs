//! Charge Factory
//!
//! Creates a charge below a carrier, pins its fuse, registers it, and arms
//! the timer that drops it from the registry again.

use glam::Vec3;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::ids::{ActorId, EntityId, HazardId};
use crate::core::time::ticks_to_secs;
use crate::game::events::ChargeEvent;
use crate::game::registry::HazardRecord;
use crate::game::scheduler::DeferredAction;
use crate::game::state::ChargeState;
use crate::host::{Host, HostError, FuseSettings, CHARGE_PREFAB, DROP_EFFECT};
use crate::config::Configuration;

/// Spawn failures.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The host returned nothing for the charge prefab.
    #[error("host could not create {prefab}")]
    Unavailable {
        /// Prefab that failed.
        prefab: &'static str,
    },

    /// The created entity rejected its setup.
    #[error("failed to prepare charge: {0}")]
    Setup(#[from] HostError),
}

/// Where a charge released from `origin` appears.
#[inline]
pub fn spawn_position(origin: Vec3, config: &Configuration) -> Vec3 {
    origin - config.drop_offset()
}

/// Spawn and register a charge below `origin`.
///
/// On failure nothing is registered and no timer is armed. A created entity
/// that fails setup is killed again so no untracked charge is left behind.
pub fn spawn_hazard<H: Host + ?Sized>(
    host: &mut H,
    state: &mut ChargeState,
    owner: ActorId,
    origin: Vec3,
) -> Result<HazardId, SpawnError> {
    let position = spawn_position(origin, &state.config);

    let entity = host
        .create_entity(CHARGE_PREFAB, position)
        .ok_or(SpawnError::Unavailable { prefab: CHARGE_PREFAB })?;

    let fuse = FuseSettings::fixed(state.config.fuse_time, state.config.explosion_radius);
    if let Err(err) = prepare_charge(host, entity, fuse) {
        warn!("Charge {} rejected setup: {}", entity, err);
        host.kill(entity);
        return Err(err.into());
    }

    host.play_effect(DROP_EFFECT, position);

    let now = host.now();
    let lifetime = state.hazard_lifetime();
    let hazard = HazardId(entity);

    state.registry.insert(hazard, HazardRecord {
        owner,
        position,
        spawned_at: now,
        expires_at: now + lifetime,
    });
    state.scheduler.schedule(now + lifetime, DeferredAction::ExpireHazard(hazard));
    state.push_event(ChargeEvent::hazard_spawned(now, hazard, owner, position));

    debug!(
        "Actor {} dropped {} at ({:.2}, {:.2}, {:.2}), tracked for {:.1}s",
        owner.short(), hazard, position.x, position.y, position.z, ticks_to_secs(lifetime)
    );

    Ok(hazard)
}

/// Pin the fuse, keep the charge alive mid-air, then bring it to life.
fn prepare_charge<H: Host + ?Sized>(
    host: &mut H,
    entity: EntityId,
    fuse: FuseSettings,
) -> Result<(), HostError> {
    host.configure_fuse(entity, fuse)?;
    host.strip_ground_watch(entity)?;
    host.activate(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EntityKind;
    use crate::sim::SimWorld;

    fn setup() -> (SimWorld, ChargeState) {
        (SimWorld::new(), ChargeState::new(Configuration::default()))
    }

    #[test]
    fn test_spawn_below_origin() {
        let (mut world, mut state) = setup();
        let owner = ActorId::new([1; 16]);

        let hazard = spawn_hazard(&mut world, &mut state, owner, Vec3::new(10.0, 20.0, 5.0)).unwrap();

        let entity = world.entity(hazard.entity()).unwrap();
        assert_eq!(entity.kind, EntityKind::TimedExplosive);
        assert_eq!(entity.position, Vec3::new(10.0, 19.5, 5.0));
        assert!(entity.active);
    }

    #[test]
    fn test_spawn_pins_fuse_and_strips_ground_watch() {
        let (mut world, mut state) = setup();
        let hazard = spawn_hazard(&mut world, &mut state, ActorId::default(), Vec3::Y * 30.0).unwrap();

        let explosive = world.entity(hazard.entity()).unwrap().explosive.clone().unwrap();
        let fuse = explosive.fuse.unwrap();
        assert_eq!(fuse.min_secs, 3.0);
        assert_eq!(fuse.max_secs, 3.0);
        assert_eq!(fuse.blast_radius, 15.0);
        assert!(!explosive.ground_watch);
    }

    #[test]
    fn test_spawn_registers_and_arms_expiry() {
        let (mut world, mut state) = setup();
        let hazard = spawn_hazard(&mut world, &mut state, ActorId::default(), Vec3::ZERO).unwrap();

        let record = state.registry.get(hazard).unwrap();
        assert_eq!(record.spawned_at, 0);
        assert_eq!(record.expires_at, 480);
        assert!(state.scheduler.is_pending(DeferredAction::ExpireHazard(hazard)));
        assert_eq!(state.events().len(), 1);
    }

    #[test]
    fn test_spawn_plays_drop_effect() {
        let (mut world, mut state) = setup();
        spawn_hazard(&mut world, &mut state, ActorId::default(), Vec3::new(0.0, 10.0, 0.0)).unwrap();

        let effects = world.effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].effect, DROP_EFFECT);
        assert_eq!(effects[0].position, Vec3::new(0.0, 9.5, 0.0));
    }

    #[test]
    fn test_unavailable_prefab_leaves_no_trace() {
        let (mut world, mut state) = setup();
        world.make_unavailable(CHARGE_PREFAB);

        let result = spawn_hazard(&mut world, &mut state, ActorId::default(), Vec3::ZERO);

        assert!(matches!(result, Err(SpawnError::Unavailable { .. })));
        assert!(state.registry.is_empty());
        assert!(state.scheduler.is_empty());
        assert!(world.effects().is_empty());
    }
}
