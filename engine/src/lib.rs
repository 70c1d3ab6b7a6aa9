//! Sling Planet Engine Library
//!
//! Movement and collision core for a first-person game on a tiny planet:
//! a character controller that walks, jumps and falls toward the planet
//! center, and a ballistics engine for slingshot projectiles that bounce off
//! terrain, tree trunks and rocks.
//!
//! The host owns the terrain (anything implementing
//! [`physics::TerrainHeight`]) and the obstacle list; the core borrows both
//! every tick and reports contacts as [`events::CollisionEvent`]s.
//!
//! # Modules
//!
//! - [`physics`] - Sphere math, terrain queries, collider shapes, ballistics
//! - [`player`] - Surface controller, ground state machine, input intent
//! - [`systems`] - Projectile pool ([`BallisticsEngine`])
//! - [`events`] - Collision notifications
//! - [`config`] - JSON-backed tuning with validation
//! - [`sim`] - Driver stepping both components together
//!
//! # Example
//!
//! ```ignore
//! use sling_planet_engine::{BallisticsEngine, InputIntent, SurfaceController};
//! use sling_planet_engine::physics::{BallisticsConfig, Collidable, Planet, ProjectileKind};
//! use sling_planet_engine::player::ControllerConfig;
//!
//! let planet = Planet::new(100.0);
//! let terrain = |dir: glam::Vec3| 0.5 * (dir.x * 6.0).sin();
//! let colliders = vec![Collidable::planet(100.0)];
//!
//! let mut controller = SurfaceController::new(ControllerConfig::default(), planet, &terrain);
//! let mut ballistics = BallisticsEngine::new(BallisticsConfig::default(), planet, 7);
//!
//! // Each frame:
//! controller.tick(dt, &intent, &terrain, &colliders);
//! ballistics.tick(dt, &terrain, &colliders);
//! if fire_pressed {
//!     let dir = controller.camera_forward();
//!     ballistics.fire(controller.eye_position(), dir * 25.0, ProjectileKind::Pebble);
//! }
//! ```

pub mod config;
pub mod events;
pub mod physics;
pub mod player;
pub mod sim;
pub mod systems;

pub use config::{ConfigError, SimConfig};
pub use events::{CollisionEvent, ImpactSource, ImpactTarget};
pub use player::{InputIntent, SurfaceController};
pub use sim::Simulation;
pub use systems::{BallisticsEngine, ProjectileHandle};
