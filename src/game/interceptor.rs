//! Damage Override
//!
//! Charges are a stock host explosive. The host would resolve their hits
//! with its hardcoded explosive damage; this hook rewrites the explosion
//! channel for charges we still track, keyed on the target's category.

use serde::{Serialize, Deserialize};

use crate::core::ids::{EntityId, HazardId};
use crate::game::events::ChargeEvent;
use crate::game::state::ChargeState;
use crate::host::{DamageCategory, DamageType, EntityKind, HitInfo, Host};

/// A rewrite applied to one hit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageOverride {
    /// Charge the hit came from
    pub hazard: HazardId,
    /// Entity being hit
    pub target: EntityId,
    /// Target bucket used for selection
    pub category: DamageCategory,
    /// New explosion damage
    pub amount: f32,
}

/// Rewrite `hit` if it comes from a tracked charge.
///
/// Returns `None` and leaves `hit` untouched when the hit has no initiator
/// or the initiator is not a charge tracked right now. The initiator may
/// already be destroyed; hits arriving after detonation still count while
/// the charge is registered.
pub fn override_damage<H: Host + ?Sized>(
    host: &H,
    state: &mut ChargeState,
    target: EntityId,
    hit: &mut HitInfo,
) -> Option<DamageOverride> {
    let source = hit.initiator?;
    let now = host.now();
    let hazard = HazardId(source);
    if !state.registry.is_tracked(hazard, now) {
        return None;
    }
    // A detonated charge is gone from the host but still inside its window
    if host
        .entity_kind(source)
        .is_some_and(|kind| kind != EntityKind::TimedExplosive)
    {
        return None;
    }

    let category = host
        .entity_kind(target)
        .map_or(DamageCategory::Structure, EntityKind::damage_category);
    let amount = category.select(state.config.player_damage, state.config.structure_damage);
    hit.damage.set(DamageType::Explosion, amount);

    state.push_event(ChargeEvent::damage_overridden(now, hazard, target, category, amount));

    Some(DamageOverride {
        hazard,
        target,
        category,
        amount,
    })
}
