//! Collision notifications for the host
//!
//! The core only reports geometry. Whether a hit knocks fruit out of a tree,
//! plays a sound or spawns dust is decided by whoever drains these events.

use glam::Vec3;

use crate::systems::projectile_system::ProjectileHandle;

/// What was struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactTarget {
    /// Index into the collider list passed to the tick that produced the event
    Collider(usize),
    /// The planet's terrain
    Terrain,
}

/// Who did the striking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactSource {
    /// The walking agent bumped into an obstacle
    Agent,
    /// A projectile bounced off something
    Projectile(ProjectileHandle),
}

/// A single contact reported during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub source: ImpactSource,
    pub target: ImpactTarget,
    /// World-space contact point
    pub point: Vec3,
    /// Outward surface normal at the contact
    pub normal: Vec3,
    /// Speed just before the contact (m/s)
    pub impact_speed: f32,
    /// Speed just after the response (m/s)
    pub rebound_speed: f32,
}

impl CollisionEvent {
    /// Struck collider index, if the target was a collider.
    pub fn collider_index(&self) -> Option<usize> {
        match self.target {
            ImpactTarget::Collider(index) => Some(index),
            ImpactTarget::Terrain => None,
        }
    }

    /// Whether the event was produced by a projectile.
    pub fn is_projectile(&self) -> bool {
        matches!(self.source, ImpactSource::Projectile(_))
    }
}
