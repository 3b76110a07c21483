//! Plugin Lifecycle
//!
//! [`ChargePlugin`] is what the host talks to: one method per host event.
//! Handlers run to completion on the host thread and never block. The only
//! deferred work goes through the scheduler, serviced by [`ChargePlugin::on_tick`].

use tracing::{debug, info, warn};

use crate::config::{ConfigError, Configuration};
use crate::core::ids::{ActorId, EntityId, HazardId};
use crate::core::time::Tick;
use crate::game::carrier::{handle_carrier_destroyed, seed_controls, CarrierOutcome};
use crate::game::dispatch::{dispatch_trigger, TriggerOutcome, PERM_USE};
use crate::game::events::ChargeEvent;
use crate::game::interceptor::{override_damage, DamageOverride};
use crate::game::registry::HazardRegistry;
use crate::game::scheduler::DeferredAction;
use crate::game::state::ChargeState;
use crate::host::{EntityKind, HitInfo, Host, InputState};

/// The plugin.
#[derive(Debug, Clone)]
pub struct ChargePlugin {
    state: ChargeState,
}

impl ChargePlugin {
    /// Create a plugin with a loaded configuration.
    pub fn new(config: Configuration) -> Self {
        Self {
            state: ChargeState::new(config),
        }
    }

    /// Plugin state.
    pub fn state(&self) -> &ChargeState {
        &self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &Configuration {
        &self.state.config
    }

    /// Registered hazards.
    pub fn registry(&self) -> &HazardRegistry {
        &self.state.registry
    }

    /// Take events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<ChargeEvent> {
        self.state.take_events()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Plugin load: declare the permission, pick up carriers already under
    /// control, and arm the cooldown sweep.
    pub fn init<H: Host + ?Sized>(&mut self, host: &mut H) {
        host.register_permission(PERM_USE);
        let linked = seed_controls(&*host, &mut self.state.controls);
        if linked > 0 {
            debug!("{} carriers already under control", linked);
        }
        self.arm_sweep(host.now());
        info!(
            "Carrier charge loaded: fuse {:.1}s, blast {:.1}m, cooldown {:.1}s",
            self.state.config.fuse_time,
            self.state.config.explosion_radius,
            self.state.config.cooldown_seconds
        );
    }

    /// Swap in a re-read configuration.
    ///
    /// An invalid configuration is rejected and the active one kept.
    pub fn reload_config(&mut self, config: Configuration) -> Result<(), ConfigError> {
        if let Err(err) = config.validate() {
            warn!("Carrier charge config reload rejected: {}", err);
            return Err(err);
        }
        info!("Carrier charge config reloaded");
        self.state.set_config(config);
        Ok(())
    }

    /// Plugin unload: destroy every charge still registered.
    ///
    /// Afterwards the registry, timers and control index are empty. Returns
    /// how many charges were destroyed.
    pub fn on_unload<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        let hazards = self.state.registry.drain();
        let cleared = hazards.len();
        let killed = hazards
            .into_iter()
            .filter(|hazard| host.kill(hazard.entity()))
            .count();

        self.state.scheduler.clear();
        self.state.controls.clear();
        self.state.push_event(ChargeEvent::hazards_purged(host.now(), killed, cleared));

        info!("Carrier charge unloaded: {} charges destroyed, {} untracked", killed, cleared);
        killed
    }

    /// Service deferred actions due at the host's current tick.
    pub fn on_tick<H: Host + ?Sized>(&mut self, host: &H) {
        let now = host.now();
        for action in self.state.scheduler.drain_due(now) {
            match action {
                DeferredAction::ExpireHazard(hazard) => self.expire(hazard, now),
                DeferredAction::SweepCooldowns => {
                    let evicted = self.state.cooldowns.sweep(now);
                    if evicted > 0 {
                        debug!("Evicted {} stale cooldown records", evicted);
                        self.state.push_event(ChargeEvent::cooldowns_swept(now, evicted));
                    }
                    self.arm_sweep(now);
                }
            }
        }
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Actor input.
    pub fn on_player_input<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        actor: ActorId,
        input: &InputState,
    ) -> TriggerOutcome {
        dispatch_trigger(host, &mut self.state, actor, input)
    }

    /// Damage resolution. Rewrites `hit` in place for tracked charges.
    pub fn on_entity_take_damage<H: Host + ?Sized>(
        &mut self,
        host: &H,
        target: EntityId,
        hit: &mut HitInfo,
    ) -> Option<DamageOverride> {
        override_damage(host, &mut self.state, target, hit)
    }

    /// Entity death. Only carriers and stations matter.
    ///
    /// Must be called while the entity still exists in the host, so its
    /// transform and controller can be read.
    pub fn on_entity_death<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        entity: EntityId,
        cause: Option<&HitInfo>,
    ) -> Option<CarrierOutcome> {
        match host.entity_kind(entity)? {
            EntityKind::Carrier => {
                debug!(
                    "Carrier {} destroyed (initiator {:?})",
                    entity,
                    cause.and_then(|hit| hit.initiator)
                );
                Some(handle_carrier_destroyed(host, &mut self.state, entity))
            }
            EntityKind::Station => {
                self.state.controls.unlink_station(entity);
                None
            }
            _ => None,
        }
    }

    /// A station took control of a carrier.
    pub fn on_control_started(&mut self, station: EntityId, carrier: EntityId) {
        self.state.controls.link(station, carrier);
    }

    /// A station released its carrier.
    pub fn on_control_stopped(&mut self, station: EntityId) {
        self.state.controls.unlink_station(station);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn expire(&mut self, hazard: HazardId, now: Tick) {
        if self.state.registry.remove(hazard).is_some() {
            debug!("{} no longer tracked", hazard);
            self.state.push_event(ChargeEvent::hazard_expired(now, hazard));
        }
    }

    fn arm_sweep(&mut self, now: Tick) {
        let due = now + self.state.cooldowns.eviction_age();
        self.state.scheduler.schedule(due, DeferredAction::SweepCooldowns);
    }
}
