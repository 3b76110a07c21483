//! Plugin Logic Module
//!
//! Everything that decides what happens. Host access goes through
//! [`crate::host::Host`] only.
//!
//! ## Module Structure
//!
//! - `cooldown`: Per-actor trigger rate limiting
//! - `registry`: Charges we spawned and still answer for
//! - `scheduler`: Deferred one-shot actions
//! - `factory`: Charge creation and registration
//! - `interceptor`: Damage override for tracked charges
//! - `detonation`: Direct flat area damage
//! - `carrier`: Carrier control index and destruction handling
//! - `dispatch`: Input -> charge drop
//! - `state`: Owned plugin state
//! - `events`: Observable plugin events
//! - `plugin`: Host event entry points

pub mod cooldown;
pub mod registry;
pub mod scheduler;
pub mod factory;
pub mod interceptor;
pub mod detonation;
pub mod carrier;
pub mod dispatch;
pub mod state;
pub mod events;
pub mod plugin;

// Re-export key types
pub use carrier::{CarrierOutcome, ControlIndex};
pub use cooldown::CooldownGate;
pub use detonation::{Blast, detonate};
pub use dispatch::{TriggerOutcome, PERM_USE};
pub use events::{ChargeEvent, ChargeEventData};
pub use factory::SpawnError;
pub use interceptor::DamageOverride;
pub use plugin::ChargePlugin;
pub use registry::{HazardRecord, HazardRegistry};
pub use scheduler::{DeferredAction, Scheduler};
pub use state::ChargeState;
