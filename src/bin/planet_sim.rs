//! Headless Planet Simulation
//!
//! Run with: `cargo run --bin planet_sim -- --ticks 1200`
//!
//! Scatters trees and rocks over a bumpy planet, walks the agent in a slow
//! spiral, jumps now and then and fires a slingshot shot at a fixed interval.
//! Everything that happens is reported through `tracing`; set `RUST_LOG=debug`
//! (or `trace`) to see individual contacts.

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sling_planet_engine::config::SimConfig;
use sling_planet_engine::events::{ImpactSource, ImpactTarget};
use sling_planet_engine::physics::{Collidable, ColliderKind, ProjectileKind};
use sling_planet_engine::player::InputIntent;
use sling_planet_engine::sim::Simulation;

const LOG_FILTER: &str = "planet_sim=info,sling_planet_engine=info";

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Headless tiny-planet simulation", long_about = None)]
struct Args {
    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 1200)]
    ticks: u32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Fire a shot every N frames (0 disables shooting)
    #[arg(long, default_value_t = 45)]
    fire_every: u32,

    /// Slingshot launch speed (m/s)
    #[arg(long, default_value_t = 25.0)]
    speed: f32,

    /// Number of trees to scatter
    #[arg(long, default_value_t = 24)]
    trees: usize,

    /// Number of rocks to scatter
    #[arg(long, default_value_t = 12)]
    rocks: usize,

    /// Print the effective configuration as JSON and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

/// Rolling hills: a few low-frequency waves over the sphere.
fn hills(direction: Vec3) -> f32 {
    0.8 * (direction.x * 5.0).sin() * (direction.z * 4.0).cos() + 0.4 * (direction.y * 7.0).sin()
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1.0e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Planet entry first, then trees and rocks standing on the hills.
fn scatter_colliders(config: &SimConfig, trees: usize, rocks: usize) -> Vec<Collidable> {
    let mut rng = StdRng::seed_from_u64(config.seed ^ 0xC0FFEE);
    let planet = config.planet;
    let mut colliders = vec![Collidable::planet(planet.radius)];

    for _ in 0..trees {
        let dir = random_direction(&mut rng);
        let base = planet.surface_point(&hills, dir);
        let trunk_radius = rng.gen_range(0.25..0.6);
        let trunk_height = rng.gen_range(3.0..7.0);
        colliders.push(Collidable::tree(base, trunk_radius * 5.0, trunk_radius, trunk_height));
    }
    for _ in 0..rocks {
        let dir = random_direction(&mut rng);
        let center = planet.surface_point(&hills, dir);
        colliders.push(Collidable::rock(center, rng.gen_range(0.5..1.5)));
    }
    colliders
}

#[derive(Default)]
struct Summary {
    shots: u32,
    agent_bumps: u32,
    trunk_hits: u32,
    rock_hits: u32,
    terrain_bounces: u32,
    jumps_requested: u32,
    pooled: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LOG_FILTER)))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };

    if args.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let colliders = scatter_colliders(&config, args.trees, args.rocks);
    info!(
        radius = config.planet.radius,
        colliders = colliders.len(),
        seed = config.seed,
        "planet ready"
    );

    let mut sim = Simulation::new(config, hills, colliders);
    let mut summary = Summary::default();

    for tick in 0..args.ticks {
        let intent = InputIntent {
            forward: 1.0,
            sprint: tick % 300 > 200,
            jump: tick % 120 == 60,
            look_yaw: 0.01,
            look_pitch: if tick == 0 { 0.15 } else { 0.0 },
            ..Default::default()
        };
        if intent.jump {
            summary.jumps_requested += 1;
        }

        sim.step(args.dt, &intent);
        summary.pooled += sim.expired().len() as u32;

        if args.fire_every > 0 && tick % args.fire_every == 0 {
            let kind = match summary.shots % 3 {
                0 => ProjectileKind::Pebble,
                1 => ProjectileKind::Stone,
                _ => ProjectileKind::Acorn,
            };
            sim.fire_slingshot(args.speed, kind);
            summary.shots += 1;
        }

        for event in sim.drain_events() {
            match (event.source, event.target) {
                (ImpactSource::Agent, _) => summary.agent_bumps += 1,
                (ImpactSource::Projectile(_), ImpactTarget::Terrain) => summary.terrain_bounces += 1,
                (ImpactSource::Projectile(_), ImpactTarget::Collider(index)) => {
                    match sim.colliders().get(index).map(|c| c.kind) {
                        Some(ColliderKind::Tree { .. }) => summary.trunk_hits += 1,
                        _ => summary.rock_hits += 1,
                    }
                }
            }
        }
    }

    let agent = sim.controller().agent();
    let height = sim.controller().height_above_contact(sim.terrain());
    info!(
        seconds = sim.elapsed(),
        position = ?agent.position,
        height_above_contact = height,
        grounded = agent.is_grounded(),
        "agent final state"
    );
    info!(
        shots = summary.shots,
        in_flight = sim.ballistics().active_count(),
        pooled = summary.pooled,
        terrain_bounces = summary.terrain_bounces,
        trunk_hits = summary.trunk_hits,
        rock_hits = summary.rock_hits,
        agent_bumps = summary.agent_bumps,
        jumps_requested = summary.jumps_requested,
        "session summary"
    );

    Ok(())
}
