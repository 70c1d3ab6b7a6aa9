//! Static obstacles on the planet surface
//!
//! The host builds the collider list (trees, rocks, ponds, the planet itself)
//! and lends it to the core every tick. Collision code never looks at the
//! obstacle kind directly; it asks [`Collidable::shape`] for one of the two
//! [`ColliderShape`] variants and handles each shape in exactly one place.

use glam::Vec3;

use super::sphere::up_at;

/// What a collidable represents in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderKind {
    /// The planet itself. Conventionally the first entry; never collided with.
    Planet,
    /// A tree: only the trunk is solid.
    Tree {
        /// Radius of the solid trunk (meters)
        trunk_radius: f32,
        /// Height of the trunk above its base (meters)
        trunk_height: f32,
    },
    /// A rock, treated as a sphere around its position.
    Rock,
    /// Water surface; walkable and transparent to projectiles.
    Water,
    /// Any other solid prop, treated as a sphere.
    Object,
    /// Decorative only.
    NoCollision,
}

/// A static obstacle supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collidable {
    /// Base position in world space
    pub position: Vec3,
    /// Unit vector from the planet center through `position` (local up, trunk axis)
    pub direction: Vec3,
    /// Overall radius (foliage / rock extent)
    pub radius: f32,
    /// Kind discriminator
    pub kind: ColliderKind,
}

/// Collision geometry for a [`Collidable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Vertical capped cylinder standing on `base` along `axis`.
    Cylinder {
        base: Vec3,
        axis: Vec3,
        radius: f32,
        height: f32,
    },
    /// Sphere around `center`.
    Sphere { center: Vec3, radius: f32 },
}

impl Collidable {
    /// Create a collidable, deriving `direction` from `position`.
    pub fn new(position: Vec3, radius: f32, kind: ColliderKind) -> Self {
        Self {
            position,
            direction: up_at(position),
            radius,
            kind,
        }
    }

    /// The planet entry that heads a collider list.
    pub fn planet(radius: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::Y,
            radius,
            kind: ColliderKind::Planet,
        }
    }

    /// A tree with a solid trunk.
    pub fn tree(position: Vec3, radius: f32, trunk_radius: f32, trunk_height: f32) -> Self {
        Self::new(
            position,
            radius,
            ColliderKind::Tree {
                trunk_radius,
                trunk_height,
            },
        )
    }

    /// A spherical rock.
    pub fn rock(position: Vec3, radius: f32) -> Self {
        Self::new(position, radius, ColliderKind::Rock)
    }

    /// A generic spherical prop.
    pub fn object(position: Vec3, radius: f32) -> Self {
        Self::new(position, radius, ColliderKind::Object)
    }

    /// A pond or lake patch.
    pub fn water(position: Vec3, radius: f32) -> Self {
        Self::new(position, radius, ColliderKind::Water)
    }

    /// Whether anything can bump into this collidable.
    pub fn is_solid(&self) -> bool {
        matches!(
            self.kind,
            ColliderKind::Tree { .. } | ColliderKind::Rock | ColliderKind::Object
        )
    }

    /// Collision geometry, or `None` for non-solid kinds.
    pub fn shape(&self) -> Option<ColliderShape> {
        match self.kind {
            ColliderKind::Tree {
                trunk_radius,
                trunk_height,
            } => Some(ColliderShape::Cylinder {
                base: self.position,
                axis: self.direction,
                radius: trunk_radius,
                height: trunk_height,
            }),
            ColliderKind::Rock | ColliderKind::Object => Some(ColliderShape::Sphere {
                center: self.position,
                radius: self.radius,
            }),
            ColliderKind::Planet | ColliderKind::Water | ColliderKind::NoCollision => None,
        }
    }

    /// Whether `direction` agrees with `position` (within `tolerance`).
    pub fn is_consistent(&self, tolerance: f32) -> bool {
        (up_at(self.position) - self.direction).length() <= tolerance
    }
}

impl ColliderShape {
    /// Horizontal extent used for surface-distance overlap tests.
    pub fn footprint_radius(&self) -> f32 {
        match *self {
            ColliderShape::Cylinder { radius, .. } | ColliderShape::Sphere { radius, .. } => radius,
        }
    }

    /// Range of heights (relative to the shape's base altitude) that the shape
    /// occupies along its local up axis.
    pub fn height_band(&self) -> (f32, f32) {
        match *self {
            ColliderShape::Cylinder { height, .. } => (0.0, height),
            ColliderShape::Sphere { radius, .. } => (-radius, radius),
        }
    }

    /// Distance from the planet center to the shape's base.
    pub fn base_altitude(&self) -> f32 {
        match *self {
            ColliderShape::Cylinder { base, .. } => base.length(),
            ColliderShape::Sphere { center, .. } => center.length(),
        }
    }
}
