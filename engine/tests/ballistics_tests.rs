//! Integration tests for the projectile pool.

use glam::Vec3;

use sling_planet_engine::events::{ImpactSource, ImpactTarget};
use sling_planet_engine::physics::{BallisticsConfig, Collidable, ExpireReason, FlatTerrain, Planet, ProjectileKind};
use sling_planet_engine::systems::BallisticsEngine;

const DT: f32 = 1.0 / 60.0;

/// Straight-line flight, zero-radius probe, perfect mirror bounces.
fn straight_line_config() -> BallisticsConfig {
    BallisticsConfig {
        collision_radius: 0.0,
        bounce_jitter: 0.0,
        ..BallisticsConfig::without_gravity()
    }
}

/// Trunk of radius 1 and height 5 standing on the north pole.
fn trunk() -> Collidable {
    Collidable::tree(Vec3::new(0.0, 100.0, 0.0), 3.0, 1.0, 5.0)
}

#[test]
fn test_single_collision_with_trunk() {
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 1);
    let colliders = [Collidable::planet(100.0), trunk()];
    let handle = engine.fire(Vec3::new(-10.0, 102.0, 0.0), Vec3::new(20.0, 0.0, 0.0), ProjectileKind::Pebble);

    let mut events = Vec::new();
    for _ in 0..90 {
        engine.tick(DT, &FlatTerrain, &colliders);
        events.extend(engine.drain_events());
        if let Some(p) = engine.get(handle) {
            assert!(p.position.x <= 0.5, "Projectile passed the trunk axis: {:?}", p.position);
        }
    }

    assert_eq!(events.len(), 1, "Expected exactly one collision, got {events:?}");
    let event = events[0];
    assert_eq!(event.source, ImpactSource::Projectile(handle));
    assert_eq!(event.target, ImpactTarget::Collider(1));
    assert!((event.normal - Vec3::NEG_X).length() < 1e-3);
    assert!((event.point.x + 1.0).abs() < 0.05, "Contact at {:?}", event.point);
    assert!(event.rebound_speed <= event.impact_speed * 0.6 + 1e-4);
}

fn inside_trunk(p: Vec3) -> bool {
    let radial = Vec3::new(p.x, 0.0, p.z).length();
    radial < 1.0 - 1e-3 && p.y > 100.0 + 1e-3 && p.y < 105.0 - 1e-3
}

#[test]
fn test_shot_through_trunk_top_bounces_off_the_cap() {
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 1);
    let colliders = [trunk()];
    let handle = engine.fire(Vec3::new(-1.5, 106.5, 0.0), Vec3::new(10.0, -20.0, 0.0), ProjectileKind::Pebble);

    let mut events = Vec::new();
    for tick in 0..30 {
        engine.tick(DT, &FlatTerrain, &colliders);
        events.extend(engine.drain_events());
        if let Some(p) = engine.get(handle) {
            assert!(!inside_trunk(p.position), "tick {tick}: inside the trunk at {:?}", p.position);
        }
    }

    assert_eq!(events.len(), 1, "Expected one bounce off the top, got {events:?}");
    assert_eq!(events[0].target, ImpactTarget::Collider(0));
    assert!((events[0].normal - Vec3::Y).length() < 1e-3);
    assert!(events[0].point.y >= 105.0, "Contact at {:?}", events[0].point);
    let p = engine.get(handle).expect("still flying after one bounce");
    assert!(p.velocity.y > 0.0);
}

#[test]
fn test_shot_straight_down_onto_trunk_stays_outside() {
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 1);
    let colliders = [trunk()];
    let handle = engine.fire(Vec3::new(0.3, 110.0, 0.0), Vec3::new(0.0, -40.0, 0.0), ProjectileKind::Stone);

    let mut events = Vec::new();
    for tick in 0..30 {
        engine.tick(DT, &FlatTerrain, &colliders);
        events.extend(engine.drain_events());
        if let Some(p) = engine.get(handle) {
            assert!(!inside_trunk(p.position), "tick {tick}: inside the trunk at {:?}", p.position);
        }
    }

    assert_eq!(events.len(), 1);
    assert!((events[0].normal - Vec3::Y).length() < 1e-3);
    assert!((events[0].point.y - 105.0).abs() < 0.05);
    let p = engine.get(handle).expect("still flying after one bounce");
    assert!((p.velocity - Vec3::new(0.0, 24.0, 0.0)).length() < 1e-3);
}

#[test]
fn test_fast_projectile_does_not_tunnel() {
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 1);
    let colliders = [trunk()];
    // 2000 m/s covers 33 m per tick, far more than the trunk diameter
    let handle = engine.fire(Vec3::new(-10.0, 102.0, 0.0), Vec3::new(2000.0, 0.0, 0.0), ProjectileKind::Stone);

    engine.tick(DT, &FlatTerrain, &colliders);
    let events = engine.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].target, ImpactTarget::Collider(0));
    let p = engine.get(handle).expect("still flying after one bounce");
    assert!(p.position.x < -0.9, "Projectile ended up at {:?}", p.position);
    assert!(p.velocity.x < 0.0);
}

#[test]
fn test_fast_projectile_hits_rock() {
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 1);
    let colliders = [Collidable::rock(Vec3::new(0.0, 101.0, 0.0), 0.5)];
    engine.fire(Vec3::new(0.0, 101.0, 20.0), Vec3::new(0.0, 0.0, -3000.0), ProjectileKind::Pebble);

    engine.tick(DT, &FlatTerrain, &colliders);
    let events = engine.drain_events();
    assert_eq!(events.len(), 1);
    assert!((events[0].point.z - 0.5).abs() < 0.05);
    assert!((events[0].normal - Vec3::Z).length() < 1e-3);
}

#[test]
fn test_vertical_drop_runs_out_of_bounces() {
    let config = BallisticsConfig {
        max_gravity_multiplier: 1.0,
        lifetime: 60.0,
        restitution: 0.6,
        max_bounces: 3,
        bounce_jitter: 0.0,
        ..BallisticsConfig::default()
    };
    let mut engine = BallisticsEngine::new(config, Planet::new(100.0), 3);
    let handle = engine.fire(Vec3::new(0.0, 101.0, 0.0), Vec3::new(0.0, -30.0, 0.0), ProjectileKind::Stone);

    let mut bounces = Vec::new();
    for _ in 0..(20 * 60) {
        engine.tick(DT, &FlatTerrain, &[]);
        bounces.extend(engine.drain_events());
        if !engine.is_alive(handle) {
            break;
        }
    }

    assert!(!engine.is_alive(handle), "Projectile should be pooled");
    assert!(!bounces.is_empty() && bounces.len() <= 4, "Bounce count was {}", bounces.len());
    for bounce in &bounces {
        assert_eq!(bounce.target, ImpactTarget::Terrain);
        assert!(bounce.rebound_speed <= bounce.impact_speed * 0.6 + 1e-4);
    }

    let expired = engine.drain_expired();
    assert_eq!(expired.len(), 1);
    assert!(matches!(expired[0].1, ExpireReason::BounceBudget | ExpireReason::TooSlow));
}

#[test]
fn test_slope_deflects_bounce() {
    let slope = |dir: Vec3| 20.0 * dir.x;
    let mut engine = BallisticsEngine::new(straight_line_config(), Planet::new(100.0), 5);
    let handle = engine.fire(Vec3::new(0.0, 102.0, 0.0), Vec3::new(0.0, -20.0, 0.0), ProjectileKind::Pebble);

    let mut bounced = false;
    for _ in 0..30 {
        engine.tick(DT, &slope, &[]);
        if !engine.drain_events().is_empty() {
            bounced = true;
            break;
        }
    }
    assert!(bounced);
    let p = engine.get(handle).expect("alive after one bounce");
    assert!(p.velocity.x < -1.0, "Bounce should kick toward the downhill side: {:?}", p.velocity);
    assert!(p.velocity.y > 0.0);
}

#[test]
fn test_bounces_never_gain_energy_on_rough_ground() {
    let rough = |dir: Vec3| 0.6 * (dir.x * 40.0).sin() * (dir.z * 35.0).cos();
    let config = BallisticsConfig {
        bounce_jitter: 0.3,
        max_bounces: 8,
        min_bounce_speed: 0.5,
        ..BallisticsConfig::default()
    };
    let mut engine = BallisticsEngine::new(config, Planet::new(100.0), 11);
    for i in 0..16 {
        let angle = i as f32 * 0.4;
        let velocity = Vec3::new(angle.cos() * 12.0, 6.0, angle.sin() * 12.0);
        engine.fire(Vec3::new(0.0, 103.0, 0.0), velocity, ProjectileKind::Pebble);
    }

    let mut seen = 0;
    for _ in 0..600 {
        engine.tick(DT, &rough, &[]);
        for event in engine.drain_events() {
            seen += 1;
            assert!(
                event.rebound_speed <= event.impact_speed * config.restitution + 1e-4,
                "Bounce gained energy: {event:?}"
            );
        }
    }
    assert!(seen > 0);
}

#[test]
fn test_settling_projectiles_linger_then_pool() {
    let config = BallisticsConfig {
        max_bounces: 0,
        expire_delay: 0.5,
        bounce_jitter: 0.0,
        ..BallisticsConfig::without_gravity()
    };
    let mut engine = BallisticsEngine::new(config, Planet::new(100.0), 2);
    let handle = engine.fire(Vec3::new(0.0, 100.5, 0.0), Vec3::new(0.0, -40.0, 0.0), ProjectileKind::Acorn);

    engine.tick(DT, &FlatTerrain, &[]);
    assert_eq!(engine.drain_events().len(), 1);
    assert!(engine.is_alive(handle), "Settling projectiles stay visible");
    let resting = engine.get(handle).map(|p| p.position).expect("alive");

    for _ in 0..20 {
        engine.tick(DT, &FlatTerrain, &[]);
    }
    assert_eq!(engine.get(handle).map(|p| p.position), Some(resting));
    assert!(engine.drain_events().is_empty());

    for _ in 0..20 {
        engine.tick(DT, &FlatTerrain, &[]);
    }
    assert!(!engine.is_alive(handle));
}

#[test]
fn test_escaping_projectile_is_pooled() {
    let config = BallisticsConfig {
        escape_distance: 150.0,
        ..BallisticsConfig::without_gravity()
    };
    let mut engine = BallisticsEngine::new(config, Planet::new(100.0), 4);
    let handle = engine.fire(Vec3::new(0.0, 140.0, 0.0), Vec3::new(0.0, 100.0, 0.0), ProjectileKind::Pebble);
    for _ in 0..12 {
        engine.tick(DT, &FlatTerrain, &[]);
    }
    assert!(!engine.is_alive(handle));
    assert_eq!(engine.drain_expired(), vec![(handle, ExpireReason::Escaped)]);
}

#[test]
fn test_facing_follows_velocity() {
    let mut engine = BallisticsEngine::new(BallisticsConfig::default(), Planet::new(100.0), 6);
    let handle = engine.fire(Vec3::new(0.0, 130.0, 0.0), Vec3::new(15.0, 5.0, 0.0), ProjectileKind::Stone);
    for _ in 0..20 {
        engine.tick(DT, &FlatTerrain, &[]);
    }
    let p = engine.get(handle).expect("alive");
    let facing = p.facing * Vec3::NEG_Z;
    assert!((facing - p.velocity.normalize()).length() < 1e-3);
}
