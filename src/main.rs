//! Carrier Charge Demo
//!
//! Loads (or creates) the configuration document, then drives the plugin
//! through one session on the simulated host: a charge drop, its fuse, a
//! carrier shot down while piloted, and plugin unload.

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use carrier_charge::{
    TICK_RATE, VERSION,
    config::{ConfigStore, DEFAULT_CONFIG_FILE},
    core::{ActorId, secs_to_ticks},
    game::{ChargeEvent, ChargeEventData, ChargePlugin, PERM_USE},
    host::{Button, EntityKind, InputState},
    sim::SimWorld,
};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Carrier Charge v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CARRIER_CHARGE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let store = ConfigStore::new(path);
    let config = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;

    demo_session(ChargePlugin::new(config));
    Ok(())
}

/// Demo session on the simulated host.
fn demo_session(mut plugin: ChargePlugin) {
    info!("=== Starting Demo Session ===");

    let mut world = SimWorld::new();
    plugin.init(&mut world);

    let pilot = ActorId::random();
    let station = world.spawn_station(Vec3::new(120.0, 0.0, 40.0));
    let carrier = world.spawn_carrier(Vec3::new(0.0, 8.0, 0.0));
    let wall = world.spawn_structure(Vec3::new(4.0, 0.0, 0.0));
    let bystander = world.spawn_player(Vec3::new(-6.0, 0.0, 2.0));
    world.grant(pilot, PERM_USE);
    world.mount(pilot, station);
    world.begin_control(&mut plugin, station, carrier);

    info!("Pilot {} at station {} flying carrier {}", pilot.short(), station, carrier);

    // Drop a charge, then fly clear of it
    let fire = InputState::pressed(Button::FirePrimary);
    let outcome = plugin.on_player_input(&mut world, pilot, &fire);
    info!("Trigger: {:?}", outcome);
    world.set_position(carrier, Vec3::new(0.0, 8.0, 60.0));

    // Holding the button does nothing
    let outcome = plugin.on_player_input(&mut world, pilot, &InputState::held(Button::FirePrimary));
    info!("Held trigger: {:?}", outcome);

    let fuse_ticks = secs_to_ticks(plugin.config().fuse_time);
    let result = world.advance(&mut plugin, fuse_ticks);
    info!(
        "Tick {}: {} detonated, {} died, wall at {:.0} hp, bystander {}",
        result.tick,
        result.detonated.len(),
        result.died.len(),
        world.health(wall).unwrap_or(0.0),
        if world.entity(bystander).is_some() { "alive" } else { "dead" }
    );
    log_events(&plugin.take_events());

    // Shoot the carrier down next to the wall while it is still piloted
    world.set_position(carrier, Vec3::new(4.0, 3.0, 0.0));
    let gunner = world.spawn_player(Vec3::new(40.0, 0.0, 0.0));
    if let Err(err) = world.shoot(&mut plugin, carrier, Some(gunner), f32::MAX) {
        info!("Shot missed: {}", err);
    }
    let result = world.step(&mut plugin);
    info!(
        "Tick {}: {} died, wall at {:.0} hp",
        result.tick,
        result.died.len(),
        world.health(wall).unwrap_or(0.0)
    );
    log_events(&plugin.take_events());

    // Let the registration window run out
    let window = plugin.config().hazard_lifetime_ticks();
    world.advance(&mut plugin, window);
    log_events(&plugin.take_events());

    // One more charge, left live for unload
    let carrier = world.spawn_carrier(Vec3::new(0.0, 30.0, 0.0));
    world.begin_control(&mut plugin, station, carrier);
    plugin.on_player_input(&mut world, pilot, &fire);
    info!("Live charges before unload: {}", world.count_kind(EntityKind::TimedExplosive));

    plugin.on_unload(&mut world);
    log_events(&plugin.take_events());

    info!("=== Session Results ===");
    info!("Live charges after unload: {}", world.count_kind(EntityKind::TimedExplosive));
    info!("Hits applied: {}", world.damage_log().len());
    info!("Effects played: {}", world.effects().len());
}

fn log_events(events: &[ChargeEvent]) {
    for event in events {
        match &event.data {
            ChargeEventData::HazardSpawned { hazard, owner, position } => {
                info!(
                    "[{}] {} dropped by {} at ({:.1}, {:.1}, {:.1})",
                    event.tick, hazard, owner.short(), position.x, position.y, position.z
                );
            }
            ChargeEventData::CarrierDetonated { carrier, hits, .. } => {
                info!("[{}] carrier {} exploded, {} hit", event.tick, carrier, hits);
            }
            ChargeEventData::HazardsPurged { killed, cleared } => {
                info!("[{}] unload: {} destroyed, {} cleared", event.tick, killed, cleared);
            }
            other => info!("[{}] {:?}", event.tick, other),
        }
    }
}
