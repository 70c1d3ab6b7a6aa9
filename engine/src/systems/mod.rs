//! Systems that own simulated objects across frames.

pub mod projectile_system;

pub use projectile_system::{BallisticsEngine, ProjectileHandle};
