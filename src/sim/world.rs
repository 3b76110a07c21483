//! Simulated World
//!
//! Single-threaded host loop. Each [`SimWorld::step`] runs a fixed sequence
//! of phases, so identical setups and inputs always produce identical
//! outcomes.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use tracing::debug;

use crate::core::ids::{ActorId, EntityId};
use crate::core::time::{Tick, secs_to_ticks};
use crate::game::plugin::ChargePlugin;
use crate::host::{
    DamageType, DamageTypeList, EntityKind, FuseSettings, HitInfo, Host, HostError,
    CHARGE_PREFAB,
};
use super::entity::{DamageEntry, Explosive, PlayedEffect, SimEntity};
use super::{
    CARRIER_HEALTH, DEFAULT_BLAST_RADIUS, DEFAULT_EXPLOSIVE_DAMAGE, DEFAULT_FUSE_SECS,
    GROUND_LEVEL, GROUND_TOLERANCE, PLAYER_HEALTH, STATION_HEALTH, STRUCTURE_HEALTH,
};

/// What happened during one or more steps.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepResult {
    /// Tick reached
    pub tick: Tick,
    /// Explosives destroyed by ground watch before their fuse ran out
    pub collapsed: Vec<EntityId>,
    /// Explosives whose fuse ran out
    pub detonated: Vec<EntityId>,
    /// Damageable entities that died
    pub died: Vec<EntityId>,
}

impl StepResult {
    fn merge(&mut self, other: StepResult) {
        self.tick = other.tick;
        self.collapsed.extend(other.collapsed);
        self.detonated.extend(other.detonated);
        self.died.extend(other.died);
    }
}

/// The simulated host.
#[derive(Debug, Default)]
pub struct SimWorld {
    tick: Tick,
    next_id: u64,
    entities: BTreeMap<EntityId, SimEntity>,
    /// Station -> entity it controls
    controlling: BTreeMap<EntityId, EntityId>,
    /// Actor -> station they sit at
    mounts: BTreeMap<ActorId, EntityId>,
    grants: BTreeMap<ActorId, BTreeSet<String>>,
    registered_permissions: BTreeSet<String>,
    unavailable_prefabs: BTreeSet<String>,
    invalid_transforms: BTreeSet<EntityId>,
    effects: Vec<PlayedEffect>,
    damage_log: Vec<DamageEntry>,
}

impl SimWorld {
    /// Empty world at tick 0.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    // =========================================================================
    // World setup
    // =========================================================================

    fn insert(&mut self, kind: EntityKind, prefab: &str, position: Vec3, health: f32, active: bool) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, SimEntity {
            id,
            kind,
            prefab: prefab.to_string(),
            position,
            health,
            active,
            explosive: None,
            last_hit: None,
        });
        id
    }

    /// Add a player.
    pub fn spawn_player(&mut self, position: Vec3) -> EntityId {
        self.insert(EntityKind::Player, "player", position, PLAYER_HEALTH, true)
    }

    /// Add a structure.
    pub fn spawn_structure(&mut self, position: Vec3) -> EntityId {
        self.insert(EntityKind::Structure, "structure", position, STRUCTURE_HEALTH, true)
    }

    /// Add a control station.
    pub fn spawn_station(&mut self, position: Vec3) -> EntityId {
        self.insert(EntityKind::Station, "station", position, STATION_HEALTH, true)
    }

    /// Add a carrier.
    pub fn spawn_carrier(&mut self, position: Vec3) -> EntityId {
        self.insert(EntityKind::Carrier, "carrier", position, CARRIER_HEALTH, true)
    }

    /// Give an actor a permission.
    pub fn grant(&mut self, actor: ActorId, permission: &str) {
        self.grants.entry(actor).or_default().insert(permission.to_string());
    }

    /// Take a permission away.
    pub fn revoke(&mut self, actor: ActorId, permission: &str) {
        if let Some(perms) = self.grants.get_mut(&actor) {
            perms.remove(permission);
        }
    }

    /// Seat an actor at a station.
    pub fn mount(&mut self, actor: ActorId, station: EntityId) {
        self.mounts.insert(actor, station);
    }

    /// Get an actor out of their seat.
    pub fn dismount(&mut self, actor: ActorId) {
        self.mounts.remove(&actor);
    }

    /// Set what a station controls without telling the plugin.
    pub fn set_controlling(&mut self, station: EntityId, target: Option<EntityId>) {
        match target {
            Some(target) => self.controlling.insert(station, target),
            None => self.controlling.remove(&station),
        };
    }

    /// A station takes control of a carrier; the plugin is notified.
    pub fn begin_control(&mut self, plugin: &mut ChargePlugin, station: EntityId, carrier: EntityId) {
        self.set_controlling(station, Some(carrier));
        plugin.on_control_started(station, carrier);
    }

    /// A station releases its carrier; the plugin is notified.
    pub fn end_control(&mut self, plugin: &mut ChargePlugin, station: EntityId) {
        self.set_controlling(station, None);
        plugin.on_control_stopped(station);
    }

    /// Make [`Host::create_entity`] fail for a prefab.
    pub fn make_unavailable(&mut self, prefab: &str) {
        self.unavailable_prefabs.insert(prefab.to_string());
    }

    /// Mark an entity's transform as torn down.
    pub fn invalidate_transform(&mut self, entity: EntityId) {
        self.invalid_transforms.insert(entity);
    }

    /// Move an entity.
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.position = position;
        }
    }

    /// Jump the clock without running any phase.
    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Look up an entity.
    pub fn entity(&self, id: EntityId) -> Option<&SimEntity> {
        self.entities.get(&id)
    }

    /// Remaining health of an entity.
    pub fn health(&self, id: EntityId) -> Option<f32> {
        self.entities.get(&id).map(|e| e.health)
    }

    /// Live entities of a kind.
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind == kind).count()
    }

    /// Check if a permission was registered.
    pub fn is_permission_registered(&self, permission: &str) -> bool {
        self.registered_permissions.contains(permission)
    }

    /// Effects played so far.
    pub fn effects(&self) -> &[PlayedEffect] {
        &self.effects
    }

    /// Hits applied so far.
    pub fn damage_log(&self) -> &[DamageEntry] {
        &self.damage_log
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Hit `target` through the normal resolution pipeline (plugin hook included).
    pub fn shoot(
        &mut self,
        plugin: &mut ChargePlugin,
        target: EntityId,
        initiator: Option<EntityId>,
        amount: f32,
    ) -> Result<(), HostError> {
        let position = self.position(target)?;
        let mut damage = DamageTypeList::new();
        damage.set(DamageType::Bullet, amount);
        let mut hit = HitInfo {
            initiator,
            weapon: None,
            hit_position: position,
            hit_normal: Vec3::Y,
            damage,
        };
        plugin.on_entity_take_damage(self, target, &mut hit);
        self.apply_hit(target, hit)
    }

    /// Run one tick.
    ///
    /// # Phases
    ///
    /// 1. Service plugin timers
    /// 2. Ground watch on explosives
    /// 3. Fuses (host damage pipeline, plugin hook included)
    /// 4. Deaths (plugin notified before removal), repeated until stable
    pub fn step(&mut self, plugin: &mut ChargePlugin) -> StepResult {
        let mut result = StepResult::default();

        // 0. Advance tick counter
        self.tick += 1;
        result.tick = self.tick;

        // 1. Plugin timers
        plugin.on_tick(self);

        // 2. Unsupported explosives fall apart
        self.process_ground_watch(&mut result);

        // 3. Fuses
        self.process_fuses(plugin, &mut result);

        // 4. Deaths
        self.process_deaths(plugin, &mut result);

        result
    }

    /// Run `ticks` steps and merge their results.
    pub fn advance(&mut self, plugin: &mut ChargePlugin, ticks: Tick) -> StepResult {
        let mut total = StepResult { tick: self.tick, ..StepResult::default() };
        for _ in 0..ticks {
            let result = self.step(plugin);
            total.merge(result);
        }
        total
    }

    fn process_ground_watch(&mut self, result: &mut StepResult) {
        let unsupported: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.active)
            .filter(|e| e.explosive.as_ref().is_some_and(|x| x.ground_watch))
            .filter(|e| e.position.y - GROUND_LEVEL > GROUND_TOLERANCE)
            .map(|e| e.id)
            .collect();

        for id in unsupported {
            debug!("Explosive {} lost ground support", id);
            self.kill(id);
            result.collapsed.push(id);
        }
    }

    fn process_fuses(&mut self, plugin: &mut ChargePlugin, result: &mut StepResult) {
        let tick = self.tick;
        let expired: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| e.active)
            .filter(|e| {
                e.explosive
                    .as_ref()
                    .and_then(|x| x.detonate_at)
                    .is_some_and(|at| at <= tick)
            })
            .map(|e| e.id)
            .collect();

        for id in expired {
            self.explode(plugin, id);
            result.detonated.push(id);
        }
    }

    /// Host-default detonation: every hit is resolved through the plugin hook.
    fn explode(&mut self, plugin: &mut ChargePlugin, id: EntityId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        let position = entity.position;
        let (radius, damage) = entity
            .explosive
            .as_ref()
            .map(|x| {
                let radius = x.fuse.map_or(DEFAULT_BLAST_RADIUS, |f| f.blast_radius);
                (radius, x.default_damage)
            })
            .unwrap_or((DEFAULT_BLAST_RADIUS, DEFAULT_EXPLOSIVE_DAMAGE));

        for target in self.entities_in_radius(position, radius) {
            let mut hit = HitInfo::explosion_from(id, position, damage);
            plugin.on_entity_take_damage(self, target, &mut hit);
            // Targets come straight from the spatial query, so they exist
            let _ = self.apply_hit(target, hit);
        }

        self.kill(id);
    }

    fn process_deaths(&mut self, plugin: &mut ChargePlugin, result: &mut StepResult) {
        loop {
            let dead: Vec<EntityId> = self
                .entities
                .values()
                .filter(|e| e.is_dead())
                .map(|e| e.id)
                .collect();
            if dead.is_empty() {
                break;
            }

            for id in dead {
                let Some(entity) = self.entities.get(&id) else {
                    continue;
                };
                let cause = entity.last_hit.clone();
                plugin.on_entity_death(self, id, cause.as_ref());
                self.kill(id);
                result.died.push(id);
            }
        }
    }

    fn apply_hit(&mut self, target: EntityId, hit: HitInfo) -> Result<(), HostError> {
        let tick = self.tick;
        let entity = self
            .entities
            .get_mut(&target)
            .ok_or(HostError::EntityGone(target))?;
        if !entity.is_damageable() {
            return Err(HostError::Unsupported { entity: target, operation: "deliver_damage" });
        }

        let amount = hit.damage.total();
        entity.health -= amount;
        self.damage_log.push(DamageEntry {
            tick,
            target,
            initiator: hit.initiator,
            amount,
        });
        entity.last_hit = Some(hit);
        Ok(())
    }

    fn explosive_mut(&mut self, entity: EntityId, operation: &'static str) -> Result<&mut Explosive, HostError> {
        self.entities
            .get_mut(&entity)
            .ok_or(HostError::EntityGone(entity))?
            .explosive
            .as_mut()
            .ok_or(HostError::Unsupported { entity, operation })
    }
}

impl Host for SimWorld {
    fn now(&self) -> Tick {
        self.tick
    }

    fn register_permission(&mut self, permission: &str) {
        self.registered_permissions.insert(permission.to_string());
    }

    fn has_permission(&self, actor: ActorId, permission: &str) -> bool {
        self.grants
            .get(&actor)
            .is_some_and(|perms| perms.contains(permission))
    }

    fn mounted_station(&self, actor: ActorId) -> Option<EntityId> {
        self.mounts.get(&actor).copied()
    }

    fn controlled_entity(&self, station: EntityId) -> Option<EntityId> {
        self.controlling.get(&station).copied()
    }

    fn stations(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Station)
            .map(|e| e.id)
            .collect()
    }

    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind> {
        self.entities.get(&entity).map(|e| e.kind)
    }

    fn position(&self, entity: EntityId) -> Result<Vec3, HostError> {
        if self.invalid_transforms.contains(&entity) {
            return Err(HostError::TransformInvalid(entity));
        }
        self.entities
            .get(&entity)
            .map(|e| e.position)
            .ok_or(HostError::EntityGone(entity))
    }

    fn entities_in_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.is_damageable())
            .filter(|e| center.distance(e.position) <= radius)
            .map(|e| e.id)
            .collect()
    }

    fn create_entity(&mut self, prefab: &str, position: Vec3) -> Option<EntityId> {
        if self.unavailable_prefabs.contains(prefab) {
            return None;
        }

        if prefab == CHARGE_PREFAB {
            let id = self.insert(EntityKind::TimedExplosive, prefab, position, 1.0, false);
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.explosive = Some(Explosive {
                    fuse: None,
                    ground_watch: true,
                    detonate_at: None,
                    default_damage: DEFAULT_EXPLOSIVE_DAMAGE,
                });
            }
            Some(id)
        } else {
            Some(self.insert(EntityKind::Other, prefab, position, STRUCTURE_HEALTH, false))
        }
    }

    fn configure_fuse(&mut self, entity: EntityId, fuse: FuseSettings) -> Result<(), HostError> {
        self.explosive_mut(entity, "configure_fuse")?.fuse = Some(fuse);
        Ok(())
    }

    fn strip_ground_watch(&mut self, entity: EntityId) -> Result<(), HostError> {
        self.explosive_mut(entity, "strip_ground_watch")?.ground_watch = false;
        Ok(())
    }

    /// Explosives light their fuse here. The sim uses the minimum fuse.
    fn activate(&mut self, entity: EntityId) -> Result<(), HostError> {
        let tick = self.tick;
        let e = self
            .entities
            .get_mut(&entity)
            .ok_or(HostError::EntityGone(entity))?;
        e.active = true;
        if let Some(explosive) = e.explosive.as_mut() {
            let fuse = explosive
                .fuse
                .get_or_insert(FuseSettings::fixed(DEFAULT_FUSE_SECS, DEFAULT_BLAST_RADIUS));
            explosive.detonate_at = Some(tick + secs_to_ticks(fuse.min_secs));
        }
        Ok(())
    }

    fn kill(&mut self, entity: EntityId) -> bool {
        if self.entities.remove(&entity).is_none() {
            return false;
        }
        self.invalid_transforms.remove(&entity);
        self.controlling
            .retain(|station, target| *station != entity && *target != entity);
        self.mounts.retain(|_, station| *station != entity);
        true
    }

    fn deliver_damage(&mut self, entity: EntityId, hit: HitInfo) -> Result<(), HostError> {
        if self.invalid_transforms.contains(&entity) {
            return Err(HostError::TransformInvalid(entity));
        }
        self.apply_hit(entity, hit)
    }

    fn play_effect(&mut self, effect: &str, position: Vec3) {
        self.effects.push(PlayedEffect {
            tick: self.tick,
            effect: effect.to_string(),
            position,
        });
    }
}
