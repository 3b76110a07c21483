//! Area Detonation
//!
//! Direct, flat area damage. Every damageable entity within the radius
//! (boundary included) takes the same damage for its category, delivered
//! straight to its damage intake with no attribution, so resolution hooks
//! never see it.

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::host::{DamageCategory, Host, HostError, HitInfo};

/// One detonation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    /// Center
    pub position: Vec3,
    /// Reach (meters, inclusive)
    pub radius: f32,
    /// Damage to players
    pub player_damage: f32,
    /// Damage to everything else
    pub structure_damage: f32,
}

impl Blast {
    /// Damage for a target category.
    #[inline]
    pub fn damage_for(&self, category: DamageCategory) -> f32 {
        category.select(self.player_damage, self.structure_damage)
    }
}

/// Apply `blast` to everything in range. Returns how many entities were hit.
///
/// Entities the host reports as already gone are skipped. Any other host
/// failure aborts the remaining deliveries and is returned to the caller.
pub fn detonate<H: Host + ?Sized>(host: &mut H, blast: &Blast) -> Result<usize, HostError> {
    let targets = host.entities_in_radius(blast.position, blast.radius);
    let mut hits = 0;

    for target in targets {
        let Some(kind) = host.entity_kind(target) else {
            continue;
        };

        let amount = blast.damage_for(kind.damage_category());
        match host.deliver_damage(target, HitInfo::direct_explosion(blast.position, amount)) {
            Ok(()) => hits += 1,
            Err(HostError::EntityGone(_)) => continue,
            Err(err) => return Err(err),
        }

        #[cfg(feature = "debug-tracing")]
        tracing::trace!("Blast hit {} ({:?}) for {:.1}", target, kind, amount);
    }

    Ok(hits)
}
