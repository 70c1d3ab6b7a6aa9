//! Ballistics simulation for slingshot projectiles
//!
//! Projectiles fly under gravity pulled toward the planet center, are swept
//! against terrain and obstacles every step, and bounce with lossy
//! restitution until they run out of bounces, speed or lifetime.
//!
//! # Step order
//!
//! 1. Gravity (optionally ramped by time in flight)
//! 2. Intended position from velocity
//! 3. Swept test against colliders, then against terrain; first hit wins
//! 4. Bounce response at the hit point, or commit the intended position
//! 5. Face the direction of travel
//!
//! # Example
//!
//! ```ignore
//! use sling_planet_engine::physics::ballistics::{BallisticsConfig, Projectile, ProjectileKind};
//! use glam::Vec3;
//!
//! let config = BallisticsConfig::default();
//! let projectile = Projectile::spawn(
//!     Vec3::new(0.0, 102.0, 0.0),
//!     Vec3::new(0.0, 5.0, -20.0),
//!     ProjectileKind::Pebble,
//!     &config,
//! );
//! ```

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collider::Collidable;
use super::collision::{SweptHit, first_collider_hit};
use super::sphere::{finite_or, project_on_tangent, reflect, up_at};
use super::terrain::{Planet, TerrainHeight};
use crate::events::ImpactTarget;

/// Bisection passes used to refine a terrain contact between two samples.
const TERRAIN_REFINE_ITERATIONS: usize = 6;

/// Speeds below this are treated as "not moving" for facing updates.
const FACING_MIN_SPEED: f32 = 1.0e-3;

/// Cosmetic projectile archetype. Only changes how big it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Pebble,
    Stone,
    Acorn,
}

impl ProjectileKind {
    /// Radius the renderer should use (meters).
    pub fn visual_radius(self) -> f32 {
        match self {
            ProjectileKind::Pebble => 0.08,
            ProjectileKind::Stone => 0.15,
            ProjectileKind::Acorn => 0.1,
        }
    }
}

/// Why a projectile left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireReason {
    /// Lifetime ran out
    Lifetime,
    /// Bounced more times than allowed
    BounceBudget,
    /// Rebounded slower than the minimum bounce speed
    TooSlow,
    /// Flew too far from the planet
    Escaped,
    /// Evicted to make room for a newer shot
    Evicted,
    /// Removed by the host
    Removed,
}

/// Lifecycle state of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProjectileState {
    /// Moving and colliding
    #[default]
    Flying,
    /// Finished its last bounce; resting visibly until `remaining` runs out
    Settling {
        remaining: f32,
        reason: ExpireReason,
    },
}

/// Configuration for the ballistics simulation.
///
/// The constants are tuning values, not physical truths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsConfig {
    /// Gravity acceleration toward the planet center (m/s²)
    pub gravity: f32,
    /// Growth of the gravity multiplier per second in flight
    pub gravity_ramp_rate: f32,
    /// Cap for the gravity multiplier (1.0 disables the ramp)
    pub max_gravity_multiplier: f32,
    /// Seconds a projectile may live
    pub lifetime: f32,
    /// Bounces allowed before the projectile is retired
    pub max_bounces: u32,
    /// Fraction of speed kept on each bounce (must be < 1)
    pub restitution: f32,
    /// Rebounds slower than this retire the projectile (m/s)
    pub min_bounce_speed: f32,
    /// Collision radius shared by all projectiles (meters)
    pub collision_radius: f32,
    /// Terrain samples per step along the swept path
    pub terrain_samples: u32,
    /// Distance a projectile is pushed off a surface after contact (meters)
    pub separation: f32,
    /// Direction perturbation applied on bounce (0 = perfect mirror)
    pub bounce_jitter: f32,
    /// Seconds a retired projectile stays visible before it is pooled
    pub expire_delay: f32,
    /// Maximum simultaneously active projectiles before eviction
    pub max_active: usize,
    /// Distance from the planet center beyond which projectiles are dropped
    pub escape_distance: f32,
    /// Largest time step accepted by a single tick (seconds)
    pub max_dt: f32,
}

impl Default for BallisticsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            gravity_ramp_rate: 0.35,
            max_gravity_multiplier: 1.6,
            lifetime: 8.0,
            max_bounces: 3,
            restitution: 0.6,
            min_bounce_speed: 2.0,
            collision_radius: 0.12,
            terrain_samples: 4,
            separation: 0.02,
            bounce_jitter: 0.08,
            expire_delay: 0.0,
            max_active: 64,
            escape_distance: 5000.0,
            max_dt: 0.1,
        }
    }
}

impl BallisticsConfig {
    /// A config with no gravity at all (straight-line flight).
    pub fn without_gravity() -> Self {
        Self {
            gravity: 0.0,
            max_gravity_multiplier: 1.0,
            ..Self::default()
        }
    }

    /// A config with constant gravity of the given strength and no ramp.
    pub fn with_gravity(gravity: f32) -> Self {
        Self {
            gravity,
            max_gravity_multiplier: 1.0,
            ..Self::default()
        }
    }

    /// Gravity multiplier after `age` seconds in flight.
    pub fn gravity_multiplier(&self, age: f32) -> f32 {
        let max = self.max_gravity_multiplier.max(1.0);
        (1.0 + self.gravity_ramp_rate * age).clamp(1.0, max)
    }
}

/// Result of a bounce, handed to the engine for event reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub target: ImpactTarget,
    pub point: Vec3,
    pub normal: Vec3,
    pub impact_speed: f32,
    pub rebound_speed: f32,
}

/// What happened to a projectile during one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Contact resolved this step, if any
    pub impact: Option<Impact>,
    /// Set when the projectile must be returned to the pool
    pub expired: Option<ExpireReason>,
}

/// A slingshot projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Current position in world space (meters)
    pub position: Vec3,
    /// Current velocity (m/s)
    pub velocity: Vec3,
    /// Position at the start of the last step
    pub previous_position: Vec3,
    /// Seconds left before the projectile expires
    pub lifetime: f32,
    /// Seconds since the shot (drives the gravity ramp)
    pub age: f32,
    /// Bounces so far
    pub bounces: u32,
    /// Bounces allowed
    pub max_bounces: u32,
    /// Cosmetic archetype
    pub kind: ProjectileKind,
    /// Lifecycle state
    pub state: ProjectileState,
    /// Orientation facing the direction of travel (-Z forward)
    pub facing: Quat,
}

impl Projectile {
    /// Spawn a projectile with the given initial conditions.
    pub fn spawn(origin: Vec3, velocity: Vec3, kind: ProjectileKind, config: &BallisticsConfig) -> Self {
        let origin = finite_or(origin, Vec3::ZERO);
        let velocity = finite_or(velocity, Vec3::ZERO);
        Self {
            position: origin,
            velocity,
            previous_position: origin,
            lifetime: config.lifetime,
            age: 0.0,
            bounces: 0,
            max_bounces: config.max_bounces,
            kind,
            state: ProjectileState::Flying,
            facing: facing_for(velocity, Quat::IDENTITY),
        }
    }

    /// Current speed in m/s.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Whether the projectile is still moving.
    pub fn is_flying(&self) -> bool {
        matches!(self.state, ProjectileState::Flying)
    }

    /// Advance one step.
    ///
    /// The returned report carries the bounce (if any) and whether the
    /// projectile must be pooled; the caller owns removal.
    pub fn integrate<T, R>(
        &mut self,
        config: &BallisticsConfig,
        planet: &Planet,
        terrain: &T,
        colliders: &[Collidable],
        rng: &mut R,
        dt: f32,
    ) -> StepReport
    where
        T: TerrainHeight + ?Sized,
        R: Rng,
    {
        let mut report = StepReport::default();

        if let ProjectileState::Settling { remaining, reason } = self.state {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                report.expired = Some(reason);
            } else {
                self.state = ProjectileState::Settling { remaining, reason };
            }
            return report;
        }

        // A corrupted state falls back to the last known good one
        if !self.position.is_finite() {
            self.position = self.previous_position;
            self.velocity = Vec3::ZERO;
        }
        self.velocity = finite_or(self.velocity, Vec3::ZERO);

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            report.expired = Some(ExpireReason::Lifetime);
            return report;
        }

        // Gravity toward the planet center
        self.age += dt;
        let down = -up_at(self.position);
        self.velocity += down * (config.gravity * config.gravity_multiplier(self.age) * dt);

        let start = self.position;
        let intended = start + self.velocity * dt;
        self.previous_position = start;

        let radius = config.collision_radius;
        let collider_hit = first_collider_hit(colliders, start, intended, radius)
            .map(|h| (ImpactTarget::Collider(h.index), h.hit));
        let terrain_hit = sweep_terrain(planet, terrain, start, intended, radius, config.terrain_samples)
            .map(|hit| (ImpactTarget::Terrain, hit));

        let hit = match (collider_hit, terrain_hit) {
            (Some(c), Some(t)) => Some(if c.1.t <= t.1.t { c } else { t }),
            (c, t) => c.or(t),
        };

        match hit {
            Some((target, hit)) => {
                let impact = self.bounce(config, planet, terrain, target, hit, rng);
                report.impact = Some(impact);
                if let Some(reason) = self.retire_reason(config, impact.rebound_speed) {
                    if config.expire_delay > 0.0 {
                        self.velocity = Vec3::ZERO;
                        self.state = ProjectileState::Settling {
                            remaining: config.expire_delay,
                            reason,
                        };
                    } else {
                        report.expired = Some(reason);
                    }
                }
            }
            None => self.position = intended,
        }

        if self.position.length() > config.escape_distance {
            report.expired = Some(ExpireReason::Escaped);
        }

        self.facing = facing_for(self.velocity, self.facing);
        report
    }

    /// Place the projectile at the contact and reflect its velocity.
    fn bounce<T, R>(
        &mut self,
        config: &BallisticsConfig,
        planet: &Planet,
        terrain: &T,
        target: ImpactTarget,
        hit: SweptHit,
        rng: &mut R,
    ) -> Impact
    where
        T: TerrainHeight + ?Sized,
        R: Rng,
    {
        self.position = match target {
            ImpactTarget::Terrain => {
                let up = up_at(hit.point);
                up * (planet.surface_radius(terrain, up) + config.collision_radius + config.separation)
            }
            ImpactTarget::Collider(_) => hit.point + hit.normal * config.separation,
        };

        let incoming = self.velocity;
        let impact_speed = incoming.length();
        let reflected = if incoming.dot(hit.normal) < 0.0 {
            reflect(incoming, hit.normal)
        } else {
            incoming
        };
        let rebound_speed = impact_speed * config.restitution;

        let mut direction = reflected.normalize_or_zero();
        if config.bounce_jitter > 0.0 && direction != Vec3::ZERO {
            let noise = Vec3::new(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
            );
            direction = (direction + noise * config.bounce_jitter).normalize_or(direction);
            if direction.dot(hit.normal) < 0.0 {
                direction = project_on_tangent(direction, hit.normal).normalize_or(hit.normal);
            }
        }
        self.velocity = direction * rebound_speed;
        self.bounces += 1;

        tracing::trace!(
            bounces = self.bounces,
            impact_speed,
            rebound_speed,
            ?target,
            "projectile bounced"
        );

        Impact {
            target,
            point: self.position,
            normal: hit.normal,
            impact_speed,
            rebound_speed,
        }
    }

    fn retire_reason(&self, config: &BallisticsConfig, rebound_speed: f32) -> Option<ExpireReason> {
        if self.bounces > self.max_bounces {
            Some(ExpireReason::BounceBudget)
        } else if rebound_speed < config.min_bounce_speed {
            Some(ExpireReason::TooSlow)
        } else {
            None
        }
    }
}

/// Orientation that looks along `velocity`, keeping `previous` when at rest.
fn facing_for(velocity: Vec3, previous: Quat) -> Quat {
    if velocity.length_squared() > FACING_MIN_SPEED * FACING_MIN_SPEED {
        Quat::from_rotation_arc(Vec3::NEG_Z, velocity.normalize())
    } else {
        previous
    }
}

/// Swept terrain test by sampling the path.
///
/// The first sample whose radial distance dips below the terrain plus
/// `probe_radius` is refined by bisection against the previous (clear) sample.
pub fn sweep_terrain<T: TerrainHeight + ?Sized>(
    planet: &Planet,
    terrain: &T,
    start: Vec3,
    end: Vec3,
    probe_radius: f32,
    samples: u32,
) -> Option<SweptHit> {
    let clearance = |p: Vec3| {
        let up = up_at(p);
        p.length() - (planet.surface_radius(terrain, up) + probe_radius)
    };
    let normal_at = |p: Vec3| planet.surface_normal(terrain, up_at(p));

    if clearance(start) < 0.0 {
        return Some(SweptHit {
            t: 0.0,
            point: start,
            normal: normal_at(start),
        });
    }

    let samples = samples.max(1);
    let mut clear_t = 0.0_f32;
    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        if clearance(start.lerp(end, t)) >= 0.0 {
            clear_t = t;
            continue;
        }

        let (mut lo, mut hi) = (clear_t, t);
        for _ in 0..TERRAIN_REFINE_ITERATIONS {
            let mid = (lo + hi) * 0.5;
            if clearance(start.lerp(end, mid)) >= 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let point = start.lerp(end, lo);
        return Some(SweptHit {
            t: lo,
            point,
            normal: normal_at(point),
        });
    }
    None
}
