//! Reference Host
//!
//! An in-process world implementing [`crate::host::Host`]: players,
//! structures, stations, carriers, and timed explosives with real fuse and
//! ground-watch behavior. The demo binary and the tests run the plugin
//! against it.

pub mod entity;
pub mod world;

pub use entity::{DamageEntry, Explosive, PlayedEffect, SimEntity};
pub use world::{SimWorld, StepResult};

/// Height of the ground plane.
pub const GROUND_LEVEL: f32 = 0.0;

/// How far above the ground an explosive still counts as resting on it.
pub const GROUND_TOLERANCE: f32 = 0.1;

/// Explosion damage the host applies per hit when nobody overrides it.
pub const DEFAULT_EXPLOSIVE_DAMAGE: f32 = 90.0;

/// Fuse used when an explosive is activated without one configured (seconds).
pub const DEFAULT_FUSE_SECS: f32 = 4.0;

/// Blast radius used when an explosive is activated without one configured (meters).
pub const DEFAULT_BLAST_RADIUS: f32 = 4.0;

/// Starting player health.
pub const PLAYER_HEALTH: f32 = 100.0;

/// Starting structure health.
pub const STRUCTURE_HEALTH: f32 = 10_000.0;

/// Starting carrier health.
pub const CARRIER_HEALTH: f32 = 150.0;

/// Starting station health.
pub const STATION_HEALTH: f32 = 500.0;
