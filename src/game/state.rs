//! Plugin State
//!
//! Everything the plugin owns between host events. One owner, mutated only
//! through `&mut`, so the single host thread is the only synchronization.

use crate::config::Configuration;
use crate::core::time::Tick;
use crate::game::carrier::ControlIndex;
use crate::game::cooldown::CooldownGate;
use crate::game::events::ChargeEvent;
use crate::game::registry::HazardRegistry;
use crate::game::scheduler::Scheduler;

/// Mutable plugin state.
#[derive(Debug, Clone)]
pub struct ChargeState {
    /// Active configuration
    pub config: Configuration,

    /// Charges we answer for
    pub registry: HazardRegistry,

    /// Per-actor trigger cooldowns
    pub cooldowns: CooldownGate,

    /// Deferred one-shot actions
    pub scheduler: Scheduler,

    /// Carrier -> controlling station back-references
    pub controls: ControlIndex,

    /// Events pending collection
    events: Vec<ChargeEvent>,
}

impl ChargeState {
    /// Fresh state for a configuration.
    pub fn new(config: Configuration) -> Self {
        let cooldowns = CooldownGate::new(config.cooldown_ticks());
        Self {
            config,
            registry: HazardRegistry::new(),
            cooldowns,
            scheduler: Scheduler::new(),
            controls: ControlIndex::new(),
            events: Vec::new(),
        }
    }

    /// Swap in a new configuration.
    ///
    /// Already-registered hazards keep the window they were spawned with.
    pub fn set_config(&mut self, config: Configuration) {
        self.cooldowns.set_window(config.cooldown_ticks());
        self.config = config;
    }

    /// Lifetime of a hazard spawned now (ticks).
    pub fn hazard_lifetime(&self) -> Tick {
        self.config.hazard_lifetime_ticks()
    }

    /// Record an event.
    pub fn push_event(&mut self, event: ChargeEvent) {
        self.events.push(event);
    }

    /// Take all recorded events.
    pub fn take_events(&mut self) -> Vec<ChargeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events not yet taken.
    pub fn events(&self) -> &[ChargeEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = ChargeState::new(Configuration::default());
        assert!(state.registry.is_empty());
        assert!(state.cooldowns.is_empty());
        assert!(state.scheduler.is_empty());
        assert_eq!(state.cooldowns.window(), 60);
    }

    #[test]
    fn test_set_config_updates_cooldown_window() {
        let mut state = ChargeState::new(Configuration::default());
        state.set_config(Configuration { cooldown_seconds: 2.5, ..Configuration::default() });
        assert_eq!(state.cooldowns.window(), 150);
    }

    #[test]
    fn test_take_events_drains() {
        let mut state = ChargeState::new(Configuration::default());
        state.push_event(ChargeEvent::cooldowns_swept(1, 0));
        assert_eq!(state.take_events().len(), 1);
        assert!(state.events().is_empty());
    }
}
