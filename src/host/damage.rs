//! Damage Records
//!
//! The host resolves every hit through a [`HitInfo`] carrying a per-type
//! damage list. Handlers may rewrite the list before the host applies it.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::core::ids::EntityId;

/// Damage channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DamageType {
    /// Untyped damage.
    Generic = 0,
    /// Blast damage.
    Explosion = 1,
    /// Projectile damage.
    Bullet = 2,
    /// Fire damage.
    Heat = 3,
    /// Impact damage.
    Blunt = 4,
}

/// Target classification for damage selection.
///
/// Exactly two buckets. Anything that is not a player is a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    /// A player character.
    Player,
    /// Buildings, deployables, vehicles, and everything else.
    Structure,
}

impl DamageCategory {
    /// Pick the value for this category.
    #[inline]
    pub fn select(self, player: f32, structure: f32) -> f32 {
        match self {
            DamageCategory::Player => player,
            DamageCategory::Structure => structure,
        }
    }
}

/// Damage amounts per channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageTypeList {
    amounts: BTreeMap<DamageType, f32>,
}

impl DamageTypeList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one channel.
    pub fn set(&mut self, damage_type: DamageType, amount: f32) {
        self.amounts.insert(damage_type, amount);
    }

    /// Amount on one channel (0 if unset).
    pub fn get(&self, damage_type: DamageType) -> f32 {
        self.amounts.get(&damage_type).copied().unwrap_or(0.0)
    }

    /// Sum over all channels.
    pub fn total(&self) -> f32 {
        self.amounts.values().sum()
    }
}

/// A single hit as the host resolves it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitInfo {
    /// Entity that caused the hit, if attributed.
    pub initiator: Option<EntityId>,
    /// Weapon entity, if attributed.
    pub weapon: Option<EntityId>,
    /// World-space hit point.
    pub hit_position: Vec3,
    /// World-space hit normal.
    pub hit_normal: Vec3,
    /// Damage to apply.
    pub damage: DamageTypeList,
}

impl HitInfo {
    /// Unattributed explosion hit, as produced by a direct detonation.
    pub fn direct_explosion(position: Vec3, amount: f32) -> Self {
        let mut damage = DamageTypeList::new();
        damage.set(DamageType::Explosion, amount);
        Self {
            initiator: None,
            weapon: None,
            hit_position: position,
            hit_normal: Vec3::Y,
            damage,
        }
    }

    /// Explosion hit attributed to `source`.
    pub fn explosion_from(source: EntityId, position: Vec3, amount: f32) -> Self {
        Self {
            initiator: Some(source),
            ..Self::direct_explosion(position, amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_select() {
        assert_eq!(DamageCategory::Player.select(1.0, 2.0), 1.0);
        assert_eq!(DamageCategory::Structure.select(1.0, 2.0), 2.0);
    }

    #[test]
    fn test_set_overwrites_channel() {
        let mut list = DamageTypeList::new();
        list.set(DamageType::Explosion, 40.0);
        list.set(DamageType::Bullet, 5.0);
        list.set(DamageType::Explosion, 300.0);
        assert_eq!(list.get(DamageType::Explosion), 300.0);
        assert_eq!(list.total(), 305.0);
        assert_eq!(list.get(DamageType::Heat), 0.0);
    }

    #[test]
    fn test_direct_explosion_is_unattributed() {
        let hit = HitInfo::direct_explosion(Vec3::ZERO, 10.0);
        assert!(hit.initiator.is_none());
        assert!(hit.weapon.is_none());
        assert_eq!(hit.hit_normal, Vec3::Y);
        assert_eq!(hit.damage.get(DamageType::Explosion), 10.0);
    }
}
