//! Trigger Dispatch
//!
//! Turns an actor's primary-fire press into a charge drop from the carrier
//! they are operating. Every precondition that fails ends the dispatch
//! quietly: nothing is logged and nothing is shown to the actor.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::ids::{ActorId, EntityId, HazardId};
use crate::game::factory::spawn_hazard;
use crate::game::state::ChargeState;
use crate::host::{Button, EntityKind, Host, InputState};

/// Permission required to drop charges.
pub const PERM_USE: &str = "carriercharge.use";

/// Button that drops a charge.
pub const TRIGGER_BUTTON: Button = Button::FirePrimary;

/// Result of one input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerOutcome {
    /// The trigger button was not freshly pressed.
    NotPressed,
    /// The actor lacks [`PERM_USE`].
    NoPermission,
    /// The actor is not operating a carrier.
    NoCarrier,
    /// The actor's cooldown has not elapsed.
    CoolingDown,
    /// The host could not produce a charge.
    SpawnFailed,
    /// A charge was dropped.
    Spawned(HazardId),
}

impl TriggerOutcome {
    /// Hazard spawned, if any.
    pub fn hazard(self) -> Option<HazardId> {
        match self {
            TriggerOutcome::Spawned(hazard) => Some(hazard),
            _ => None,
        }
    }
}

/// Station and carrier the actor is operating: actor -> mounted station -> controlled carrier.
pub fn operated_carrier<H: Host + ?Sized>(host: &H, actor: ActorId) -> Option<(EntityId, EntityId)> {
    let station = host.mounted_station(actor)?;
    if host.entity_kind(station) != Some(EntityKind::Station) {
        return None;
    }
    let carrier = host.controlled_entity(station)?;
    (host.entity_kind(carrier) == Some(EntityKind::Carrier)).then_some((station, carrier))
}

/// Handle one actor input event.
///
/// The cooldown is consulted only after every other precondition holds and
/// before anything in the world changes. A spawn failure still uses up the
/// cooldown.
pub fn dispatch_trigger<H: Host + ?Sized>(
    host: &mut H,
    state: &mut ChargeState,
    actor: ActorId,
    input: &InputState,
) -> TriggerOutcome {
    if !input.was_just_pressed(TRIGGER_BUTTON) {
        return TriggerOutcome::NotPressed;
    }
    if !host.has_permission(actor, PERM_USE) {
        return TriggerOutcome::NoPermission;
    }

    let Some((station, carrier)) = operated_carrier(host, actor) else {
        return TriggerOutcome::NoCarrier;
    };
    if state.controls.controller_of(carrier) != Some(station) {
        state.controls.link(station, carrier);
    }
    let Ok(origin) = host.position(carrier) else {
        return TriggerOutcome::NoCarrier;
    };

    if !state.cooldowns.try_consume(actor, host.now()) {
        return TriggerOutcome::CoolingDown;
    }

    match spawn_hazard(host, state, actor, origin) {
        Ok(hazard) => TriggerOutcome::Spawned(hazard),
        Err(err) => {
            debug!("Actor {} drop from carrier {} aborted: {}", actor.short(), carrier, err);
            TriggerOutcome::SpawnFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use crate::config::Configuration;
    use crate::host::CHARGE_PREFAB;
    use crate::sim::SimWorld;

    struct Rig {
        world: SimWorld,
        state: ChargeState,
        actor: ActorId,
        station: EntityId,
        carrier: EntityId,
    }

    /// Actor with permission, seated at a station operating a carrier at (0, 20, 0).
    fn rig() -> Rig {
        let mut world = SimWorld::new();
        let state = ChargeState::new(Configuration::default());
        let actor = ActorId::new([9; 16]);
        let station = world.spawn_station(Vec3::ZERO);
        let carrier = world.spawn_carrier(Vec3::new(0.0, 20.0, 0.0));
        world.grant(actor, PERM_USE);
        world.mount(actor, station);
        world.set_controlling(station, Some(carrier));
        Rig { world, state, actor, station, carrier }
    }

    fn fire() -> InputState {
        InputState::pressed(Button::FirePrimary)
    }

    #[test]
    fn test_spawns_below_carrier() {
        let mut rig = rig();

        let outcome = dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire());

        let hazard = outcome.hazard().expect("spawned");
        assert_eq!(rig.world.entity(hazard.entity()).unwrap().position, Vec3::new(0.0, 19.5, 0.0));
        assert_eq!(rig.state.registry.len(), 1);
    }

    #[test]
    fn test_held_button_is_ignored() {
        let mut rig = rig();
        let input = InputState::held(Button::FirePrimary);

        let outcome = dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &input);

        assert_eq!(outcome, TriggerOutcome::NotPressed);
        assert!(rig.state.cooldowns.is_empty());
    }

    #[test]
    fn test_other_button_is_ignored() {
        let mut rig = rig();
        let input = InputState::pressed(Button::Use);
        assert_eq!(
            dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &input),
            TriggerOutcome::NotPressed
        );
    }

    #[test]
    fn test_without_permission() {
        let mut rig = rig();
        let stranger = ActorId::new([3; 16]);
        rig.world.mount(stranger, rig.station);

        let outcome = dispatch_trigger(&mut rig.world, &mut rig.state, stranger, &fire());

        assert_eq!(outcome, TriggerOutcome::NoPermission);
        assert!(rig.state.registry.is_empty());
    }

    #[test]
    fn test_not_mounted() {
        let mut rig = rig();
        rig.world.dismount(rig.actor);

        let outcome = dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire());

        assert_eq!(outcome, TriggerOutcome::NoCarrier);
        // Cooldown untouched when a precondition fails
        assert!(rig.state.cooldowns.is_empty());
    }

    #[test]
    fn test_station_controlling_nothing() {
        let mut rig = rig();
        rig.world.set_controlling(rig.station, None);
        assert_eq!(
            dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire()),
            TriggerOutcome::NoCarrier
        );
    }

    #[test]
    fn test_controlled_entity_must_be_carrier() {
        let mut rig = rig();
        let turret = rig.world.spawn_structure(Vec3::ZERO);
        rig.world.set_controlling(rig.station, Some(turret));
        assert_eq!(
            dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire()),
            TriggerOutcome::NoCarrier
        );
    }

    #[test]
    fn test_cooldown_blocks_second_drop() {
        let mut rig = rig();
        assert!(dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire()).hazard().is_some());

        rig.world.set_tick(59);
        assert_eq!(
            dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire()),
            TriggerOutcome::CoolingDown
        );
        assert_eq!(rig.state.registry.len(), 1);
        assert_eq!(rig.state.cooldowns.last_trigger(rig.actor), Some(0));

        rig.world.set_tick(60);
        assert!(dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire()).hazard().is_some());
        assert_eq!(rig.state.registry.len(), 2);
    }

    #[test]
    fn test_spawn_failure_consumes_cooldown() {
        let mut rig = rig();
        rig.world.make_unavailable(CHARGE_PREFAB);

        let outcome = dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire());

        assert_eq!(outcome, TriggerOutcome::SpawnFailed);
        assert!(rig.state.registry.is_empty());
        assert_eq!(rig.state.cooldowns.last_trigger(rig.actor), Some(0));
    }

    #[test]
    fn test_drop_records_control_link() {
        let mut rig = rig();
        assert!(rig.state.controls.is_empty());

        dispatch_trigger(&mut rig.world, &mut rig.state, rig.actor, &fire());

        assert_eq!(rig.state.controls.controller_of(rig.carrier), Some(rig.station));
    }

    #[test]
    fn test_operated_carrier_lookup() {
        let rig = rig();
        assert_eq!(operated_carrier(&rig.world, rig.actor), Some((rig.station, rig.carrier)));
        assert_eq!(operated_carrier(&rig.world, ActorId::new([0; 16])), None);
    }
}
