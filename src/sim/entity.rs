//! Simulated Entities

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::ids::EntityId;
use crate::core::time::Tick;
use crate::host::{EntityKind, FuseSettings, HitInfo};

/// Explosive-specific state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explosive {
    /// Fuse and blast settings, if configured before activation
    pub fuse: Option<FuseSettings>,
    /// Destroyed without detonating when not resting on the ground
    pub ground_watch: bool,
    /// Tick the fuse runs out (set on activation)
    pub detonate_at: Option<Tick>,
    /// Host default explosion damage per hit
    pub default_damage: f32,
}

/// One entity in the simulated world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEntity {
    /// Network id
    pub id: EntityId,
    /// What it is
    pub kind: EntityKind,
    /// Prefab it was created from
    pub prefab: String,
    /// World position
    pub position: Vec3,
    /// Remaining health
    pub health: f32,
    /// Created but not yet activated entities are inert
    pub active: bool,
    /// Present on timed explosives only
    pub explosive: Option<Explosive>,
    /// Most recent hit taken
    pub last_hit: Option<HitInfo>,
}

impl SimEntity {
    /// Check if this entity takes damage.
    #[inline]
    pub fn is_damageable(&self) -> bool {
        self.active && self.kind != EntityKind::TimedExplosive
    }

    /// Check if this entity is out of health.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.is_damageable() && self.health <= 0.0
    }
}

/// A cosmetic effect the host was asked to play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayedEffect {
    /// Tick it was played
    pub tick: Tick,
    /// Effect asset
    pub effect: String,
    /// Where
    pub position: Vec3,
}

/// A hit the host applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageEntry {
    /// Tick it was applied
    pub tick: Tick,
    /// Entity hit
    pub target: EntityId,
    /// Attributed initiator, if any
    pub initiator: Option<EntityId>,
    /// Total damage applied
    pub amount: f32,
}
