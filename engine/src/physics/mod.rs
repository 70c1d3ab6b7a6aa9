//! Physics for a tiny spherical world
//!
//! Everything here assumes a planet centered at the world origin, so "up" at
//! any point is simply the normalized position.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//!
//! # Submodules
//!
//! - [`sphere`] - Radial/tangential vector helpers on a sphere
//! - [`terrain`] - Host terrain trait and the planet surface queries built on it
//! - [`collider`] - Static obstacles and their collision shapes
//! - [`collision`] - Swept and overlap tests against those shapes
//! - [`ballistics`] - Projectile integration and bounce response

pub mod ballistics;
pub mod collider;
pub mod collision;
pub mod sphere;
pub mod terrain;

// Re-export commonly used types at the physics module level
pub use ballistics::{BallisticsConfig, ExpireReason, Projectile, ProjectileKind, ProjectileState};
pub use collider::{Collidable, ColliderKind, ColliderShape};
pub use collision::{ColliderHit, SurfaceContact, SweptHit, first_collider_hit};
pub use terrain::{FlatTerrain, Planet, TerrainHeight};
pub use glam::{Quat, Vec3};
