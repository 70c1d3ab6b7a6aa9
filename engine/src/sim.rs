//! Host-side driver
//!
//! Bundles one walking agent, the projectile pool, the terrain and the static
//! collider list, and steps them together. The controller and the ballistics
//! engine never talk to each other; this is the only place they meet.
//!
//! # Example
//!
//! ```ignore
//! use sling_planet_engine::sim::Simulation;
//! use sling_planet_engine::config::SimConfig;
//! use sling_planet_engine::physics::{Collidable, FlatTerrain, ProjectileKind};
//!
//! let mut sim = Simulation::new(SimConfig::default(), FlatTerrain, vec![Collidable::planet(100.0)]);
//! sim.step(1.0 / 60.0, &intent);
//! sim.fire_slingshot(25.0, ProjectileKind::Pebble);
//! for event in sim.drain_events() { /* play sounds, shake trees */ }
//! ```

use glam::Vec3;

use crate::config::SimConfig;
use crate::events::CollisionEvent;
use crate::physics::ballistics::{ExpireReason, ProjectileKind};
use crate::physics::collider::Collidable;
use crate::physics::terrain::TerrainHeight;
use crate::player::input::InputIntent;
use crate::player::movement_controller::SurfaceController;
use crate::systems::projectile_system::{BallisticsEngine, ProjectileHandle};

/// One agent, one projectile pool, one planet.
pub struct Simulation<T: TerrainHeight> {
    config: SimConfig,
    terrain: T,
    colliders: Vec<Collidable>,
    controller: SurfaceController,
    ballistics: BallisticsEngine,
    events: Vec<CollisionEvent>,
    expired: Vec<(ProjectileHandle, ExpireReason)>,
    elapsed: f64,
}

impl<T: TerrainHeight> Simulation<T> {
    /// Build a session and spawn the agent.
    pub fn new(config: SimConfig, terrain: T, colliders: Vec<Collidable>) -> Self {
        let controller = SurfaceController::new(config.controller, config.planet, &terrain);
        let ballistics = BallisticsEngine::new(config.ballistics, config.planet, config.seed);
        Self {
            config,
            terrain,
            colliders,
            controller,
            ballistics,
            events: Vec::new(),
            expired: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Advance the agent and every projectile by one frame.
    pub fn step(&mut self, dt: f32, intent: &InputIntent) {
        self.controller.tick(dt, intent, &self.terrain, &self.colliders);
        self.ballistics.tick(dt, &self.terrain, &self.colliders);

        self.events.extend(self.controller.drain_events());
        self.events.extend(self.ballistics.drain_events());

        // Only the latest step's pooled shots are kept
        self.expired.clear();
        self.expired.extend(self.ballistics.drain_expired());

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += f64::from(dt.min(self.config.controller.max_dt));
        }
    }

    /// Shoot from the agent's eye along the camera direction.
    ///
    /// The shot starts just outside the agent's body so it cannot hit the
    /// terrain the agent stands on at `t = 0`.
    pub fn fire_slingshot(&mut self, speed: f32, kind: ProjectileKind) -> ProjectileHandle {
        let forward = self.controller.camera_forward();
        let clearance = self.config.controller.agent_radius + self.config.ballistics.collision_radius;
        let origin = self.controller.eye_position() + forward * clearance;
        self.ballistics.fire(origin, forward * speed.max(0.0), kind)
    }

    /// Respawn the agent and pool every projectile.
    pub fn reset(&mut self) {
        self.controller.reset(&self.terrain);
        self.ballistics.clear();
        self.ballistics.drain_events();
        self.ballistics.drain_expired();
        self.events.clear();
        self.expired.clear();
        self.elapsed = 0.0;
    }

    /// Take every collision event from both components since the last call.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Projectiles pooled during the last `step`, including shots evicted by
    /// `fire_slingshot` since the step before.
    pub fn expired(&self) -> &[(ProjectileHandle, ExpireReason)] {
        &self.expired
    }

    pub fn controller(&self) -> &SurfaceController {
        &self.controller
    }

    pub fn ballistics(&self) -> &BallisticsEngine {
        &self.ballistics
    }

    pub fn ballistics_mut(&mut self) -> &mut BallisticsEngine {
        &mut self.ballistics
    }

    pub fn colliders(&self) -> &[Collidable] {
        &self.colliders
    }

    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulated seconds since creation or the last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Eye position of the agent.
    pub fn agent_position(&self) -> Vec3 {
        self.controller.eye_position()
    }
}
