//! # Carrier Charge
//!
//! Lets an actor piloting a remote carrier drop timed explosive charges from
//! it, rewrites the damage those charges deal, and turns a piloted carrier's
//! destruction into an explosion of its own.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CARRIER CHARGE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Identifiers and tick clock                │
//! │  config.rs       - JSON configuration document               │
//! │                                                              │
//! │  host/           - What the plugin needs from the game       │
//! │  ├── mod.rs      - Host trait, entity kinds, fuses           │
//! │  ├── damage.rs   - Hit info and damage categories            │
//! │  └── input.rs    - Button state                              │
//! │                                                              │
//! │  game/           - Plugin logic                              │
//! │  ├── dispatch.rs - Input -> charge drop                      │
//! │  ├── factory.rs  - Charge creation                           │
//! │  ├── registry.rs - Charges we answer for                     │
//! │  ├── interceptor.rs - Damage override                        │
//! │  ├── carrier.rs  - Carrier destruction                       │
//! │  ├── detonation.rs - Flat area damage                        │
//! │  └── plugin.rs   - Host event entry points                   │
//! │                                                              │
//! │  sim/            - Reference host for tests and the demo     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Every handler runs on the host's single simulation thread and returns
//! before the host continues. State is owned by [`game::ChargePlugin`]; there
//! is no locking. Deferred work is a tick-keyed timer queue serviced by
//! [`game::ChargePlugin::on_tick`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod host;
pub mod game;
pub mod sim;

// Re-export commonly used types
pub use config::{ConfigError, ConfigStore, Configuration};
pub use core::ids::{ActorId, EntityId, HazardId};
pub use core::time::{Tick, secs_to_ticks};
pub use game::{ChargeEvent, ChargeEventData, ChargePlugin, TriggerOutcome};
pub use host::{Host, HostError, HitInfo};
pub use sim::SimWorld;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Host simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
