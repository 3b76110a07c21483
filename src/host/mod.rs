//! Host Interface
//!
//! Everything this crate needs from the simulation it runs inside.
//!
//! ## Module Structure
//!
//! - `damage`: Hit records and damage categories
//! - `input`: Button state for actor input events
//!
//! The [`Host`] trait is the only seam between plugin logic and the world.
//! [`crate::sim::SimWorld`] is the in-process implementation used by the
//! demo binary and the tests.

pub mod damage;
pub mod input;

use glam::Vec3;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::ids::{ActorId, EntityId};
use crate::core::time::Tick;

pub use damage::{DamageCategory, DamageType, DamageTypeList, HitInfo};
pub use input::{Button, InputState};

/// Prefab for the dropped charge.
pub const CHARGE_PREFAB: &str = "assets/prefabs/ammo/40mmgrenade/40mm_grenade_he.prefab";

/// Cosmetic played where a charge is released.
pub const DROP_EFFECT: &str = "assets/prefabs/misc/xmas/presents/effects/unwrap.prefab";

/// Cosmetic played where a carrier detonates.
pub const CARRIER_EXPLOSION_EFFECT: &str = "assets/prefabs/tools/c4/effects/c4_explosion.prefab";

/// Kind of host entity, as far as this crate cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A player character.
    Player,
    /// A building block or deployable.
    Structure,
    /// A seat from which a carrier is remotely operated.
    Station,
    /// A remotely operated carrier.
    Carrier,
    /// A fused explosive (what a charge is).
    TimedExplosive,
    /// Anything else.
    Other,
}

impl EntityKind {
    /// Damage bucket for targets of this kind.
    #[inline]
    pub fn damage_category(self) -> DamageCategory {
        match self {
            EntityKind::Player => DamageCategory::Player,
            _ => DamageCategory::Structure,
        }
    }
}

/// Fuse and blast settings applied to a freshly created explosive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuseSettings {
    /// Shortest fuse (seconds).
    pub min_secs: f32,
    /// Longest fuse (seconds).
    pub max_secs: f32,
    /// Blast radius (meters).
    pub blast_radius: f32,
}

impl FuseSettings {
    /// Deterministic fuse: min and max equal.
    pub fn fixed(secs: f32, blast_radius: f32) -> Self {
        Self { min_secs: secs, max_secs: secs, blast_radius }
    }
}

/// Host call failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The entity no longer exists.
    #[error("entity {0} no longer exists")]
    EntityGone(EntityId),

    /// The entity exists but its transform is being torn down.
    #[error("transform of entity {0} is invalid")]
    TransformInvalid(EntityId),

    /// The entity cannot take this call (e.g. fuse settings on a non-explosive).
    #[error("entity {entity} does not support {operation}")]
    Unsupported {
        /// Target entity.
        entity: EntityId,
        /// Attempted operation.
        operation: &'static str,
    },
}

/// The simulation this crate is embedded in.
///
/// All calls happen on the host's single event-loop thread. None of them may
/// block.
pub trait Host {
    /// Current simulation tick.
    fn now(&self) -> Tick;

    // -------------------------------------------------------------------------
    // Access control
    // -------------------------------------------------------------------------

    /// Declare a permission this plugin checks.
    fn register_permission(&mut self, permission: &str);

    /// Check whether `actor` holds `permission`.
    fn has_permission(&self, actor: ActorId, permission: &str) -> bool;

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Station the actor is currently seated at.
    fn mounted_station(&self, actor: ActorId) -> Option<EntityId>;

    /// Entity a station is currently controlling.
    fn controlled_entity(&self, station: EntityId) -> Option<EntityId>;

    /// Every live control station.
    fn stations(&self) -> Vec<EntityId>;

    /// Kind of a live entity. `None` once the entity is gone.
    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind>;

    /// World position of an entity.
    fn position(&self, entity: EntityId) -> Result<Vec3, HostError>;

    /// Damageable entities within `radius` of `center` (boundary inclusive).
    fn entities_in_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId>;

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Instantiate a prefab. `None` if the host cannot create it.
    ///
    /// The entity is not live until [`Host::activate`] is called.
    fn create_entity(&mut self, prefab: &str, position: Vec3) -> Option<EntityId>;

    /// Set fuse bounds and blast radius on an explosive.
    fn configure_fuse(&mut self, entity: EntityId, fuse: FuseSettings) -> Result<(), HostError>;

    /// Remove behaviors that destroy an entity when it is not resting on a surface.
    fn strip_ground_watch(&mut self, entity: EntityId) -> Result<(), HostError>;

    /// Bring a created entity to life.
    fn activate(&mut self, entity: EntityId) -> Result<(), HostError>;

    /// Destroy an entity. Returns false if it was already gone.
    fn kill(&mut self, entity: EntityId) -> bool;

    /// Apply a hit through the entity's damage intake, skipping resolution hooks.
    fn deliver_damage(&mut self, entity: EntityId, hit: HitInfo) -> Result<(), HostError>;

    /// Play a cosmetic effect. Fire-and-forget.
    fn play_effect(&mut self, effect: &str, position: Vec3);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_players_are_player_category() {
        assert_eq!(EntityKind::Player.damage_category(), DamageCategory::Player);
        for kind in [
            EntityKind::Structure,
            EntityKind::Station,
            EntityKind::Carrier,
            EntityKind::TimedExplosive,
            EntityKind::Other,
        ] {
            assert_eq!(kind.damage_category(), DamageCategory::Structure);
        }
    }

    #[test]
    fn test_fixed_fuse() {
        let fuse = FuseSettings::fixed(3.0, 15.0);
        assert_eq!(fuse.min_secs, fuse.max_secs);
    }
}
