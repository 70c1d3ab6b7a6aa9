//! Projectile lifecycle management system.
//!
//! Owns the pool of active projectiles and their physics config, providing
//! fire / tick / remove / clear / iterate operations. Hosts only ever hold
//! [`ProjectileHandle`]s; a handle to a pooled projectile stays dead even
//! after its slot is reused by a later shot.

use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use slotmap::{SlotMap, new_key_type};

use crate::events::{CollisionEvent, ImpactSource};
use crate::physics::ballistics::{BallisticsConfig, ExpireReason, Projectile, ProjectileKind};
use crate::physics::collider::Collidable;
use crate::physics::terrain::{Planet, TerrainHeight};

new_key_type! {
    /// Generational handle to a projectile in a [`BallisticsEngine`].
    pub struct ProjectileHandle;
}

#[derive(Debug, Clone, Copy)]
struct ActiveProjectile {
    projectile: Projectile,
    /// Fire order, used to find the oldest shot when the pool is full
    seq: u64,
}

/// Simulates every projectile in flight.
pub struct BallisticsEngine {
    projectiles: SlotMap<ProjectileHandle, ActiveProjectile>,
    config: BallisticsConfig,
    planet: Planet,
    rng: StdRng,
    next_seq: u64,
    events: Vec<CollisionEvent>,
    expired: Vec<(ProjectileHandle, ExpireReason)>,
}

impl BallisticsEngine {
    /// Create an engine. `seed` drives the bounce perturbation.
    pub fn new(config: BallisticsConfig, planet: Planet, seed: u64) -> Self {
        Self {
            projectiles: SlotMap::with_key(),
            config,
            planet,
            rng: StdRng::seed_from_u64(seed),
            next_seq: 0,
            events: Vec::new(),
            expired: Vec::new(),
        }
    }

    /// Launch a projectile.
    ///
    /// Never fails: when `max_active` shots are already in flight the oldest
    /// one is pooled to make room.
    pub fn fire(&mut self, origin: Vec3, initial_velocity: Vec3, kind: ProjectileKind) -> ProjectileHandle {
        let limit = self.config.max_active.max(1);
        while self.projectiles.len() >= limit {
            let Some(oldest) = self
                .projectiles
                .iter()
                .min_by_key(|(_, active)| active.seq)
                .map(|(handle, _)| handle)
            else {
                break;
            };
            tracing::debug!(?oldest, limit, "projectile pool full, evicting oldest shot");
            self.projectiles.remove(oldest);
            self.expired.push((oldest, ExpireReason::Evicted));
        }

        let projectile = Projectile::spawn(origin, initial_velocity, kind, &self.config);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.projectiles.insert(ActiveProjectile { projectile, seq })
    }

    /// Advance every projectile by one step.
    ///
    /// Projectiles that expire during the step are pooled before this
    /// returns. A non-finite or non-positive `dt` does nothing.
    pub fn tick<T: TerrainHeight + ?Sized>(&mut self, dt: f32, terrain: &T, colliders: &[Collidable]) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_dt);

        let mut finished = Vec::new();
        for (handle, active) in self.projectiles.iter_mut() {
            let report = active.projectile.integrate(
                &self.config,
                &self.planet,
                terrain,
                colliders,
                &mut self.rng,
                dt,
            );

            if let Some(impact) = report.impact {
                self.events.push(CollisionEvent {
                    source: ImpactSource::Projectile(handle),
                    target: impact.target,
                    point: impact.point,
                    normal: impact.normal,
                    impact_speed: impact.impact_speed,
                    rebound_speed: impact.rebound_speed,
                });
            }
            if let Some(reason) = report.expired {
                finished.push((handle, reason));
            }
        }

        for (handle, reason) in finished {
            tracing::trace!(?handle, ?reason, "projectile expired");
            self.projectiles.remove(handle);
            self.expired.push((handle, reason));
        }
    }

    /// Pool a single projectile. Returns it if the handle was still alive.
    pub fn remove(&mut self, handle: ProjectileHandle) -> Option<Projectile> {
        let removed = self.projectiles.remove(handle).map(|active| active.projectile);
        if removed.is_some() {
            self.expired.push((handle, ExpireReason::Removed));
        }
        removed
    }

    /// Pool every projectile.
    pub fn clear(&mut self) {
        let handles: Vec<_> = self.projectiles.keys().collect();
        for handle in handles {
            self.remove(handle);
        }
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.projectiles.get(handle).map(|active| &active.projectile)
    }

    pub fn is_alive(&self, handle: ProjectileHandle) -> bool {
        self.projectiles.contains_key(handle)
    }

    /// Number of projectiles in flight (or settling).
    pub fn active_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Iterate over live projectiles (e.g. for drawing).
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> {
        self.projectiles
            .iter()
            .map(|(handle, active)| (handle, &active.projectile))
    }

    /// Take all bounce events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take the handles pooled since the last call, with the reason.
    pub fn drain_expired(&mut self) -> Vec<(ProjectileHandle, ExpireReason)> {
        std::mem::take(&mut self.expired)
    }

    /// Access the ballistics configuration.
    pub fn config(&self) -> &BallisticsConfig {
        &self.config
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }
}
