//! Collision detection module
//!
//! Shape-level collision queries shared by the surface controller and the
//! ballistics engine.
//!
//! # Swept tests
//!
//! Projectiles move far enough in one step to skip clean over a thin trunk, so
//! they are tested as a segment from the previous position to the intended
//! next one. Each shape solves for the first parameter `t ∈ [0, 1]` at which
//! the (radius-inflated) segment touches it:
//!
//! - Sphere: quadratic in `t` for `|start + d·t − center| = r`.
//! - Cylinder: the same quadratic after projecting onto the plane
//!   perpendicular to the trunk axis, with the along-axis coordinate of the
//!   contact within `[0, height]`, plus a plane test against each cap disc.
//!   The earliest of the three wins.
//!
//! # Surface overlap
//!
//! The agent is tested by great-circle distance between its direction and the
//! obstacle's, measured as an arc on the sphere through the obstacle base.
//!
//! # Example
//!
//! ```ignore
//! use sling_planet_engine::physics::collision::{sweep_sphere, SweptHit};
//! use glam::Vec3;
//!
//! let start = Vec3::new(0.0, 0.0, -5.0);
//! let end = Vec3::new(0.0, 0.0, 5.0);
//! if let Some(hit) = sweep_sphere(start, end, Vec3::ZERO, 1.0) {
//!     println!("Hit at t={} point={:?}", hit.t, hit.point);
//! }
//! ```

use glam::Vec3;

use super::collider::{Collidable, ColliderShape};
use super::sphere::{project_on_tangent, surface_distance, up_at};

/// Squared segment length below which a step is treated as stationary.
const STATIONARY_EPSILON: f32 = 1.0e-10;

/// Result of a swept segment test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptHit {
    /// Fraction of the segment travelled before contact (0..=1)
    pub t: f32,
    /// Position of the moving body's center at contact
    pub point: Vec3,
    /// Outward surface normal at contact (normalized)
    pub normal: Vec3,
}

/// A swept hit against one entry of a collider list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderHit {
    /// Index of the struck collidable in the host's list
    pub index: usize,
    /// Contact details
    pub hit: SweptHit,
}

/// Penetration of the agent into a static obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    /// How far (meters of arc) the bodies overlap
    pub penetration: f32,
    /// Tangent-plane direction that separates the agent from the obstacle
    pub push_direction: Vec3,
}

/// Swept sphere test: segment `start → end` against a sphere.
///
/// A segment that starts inside only reports a hit (at `t = 0`) when it moves
/// deeper, so a body that was just pushed out is free to leave. The reported
/// point is then on the surface, never inside.
pub fn sweep_sphere(start: Vec3, end: Vec3, center: Vec3, radius: f32) -> Option<SweptHit> {
    let d = end - start;
    let f = start - center;
    let c = f.length_squared() - radius * radius;
    let b = f.dot(d);

    if c <= 0.0 {
        if b < 0.0 {
            let normal = f.try_normalize().unwrap_or_else(|| -d.normalize_or_zero());
            return Some(SweptHit {
                t: 0.0,
                point: center + normal * radius,
                normal,
            });
        }
        return None;
    }

    let a = d.length_squared();
    if a < STATIONARY_EPSILON || b >= 0.0 {
        return None;
    }

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / a;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let point = start + d * t;
    let normal = (point - center)
        .try_normalize()
        .unwrap_or_else(|| -d.normalize_or_zero());
    Some(SweptHit { t, point, normal })
}

/// Swept cylinder test: segment `start → end` against a solid trunk standing
/// on `base` along `axis` with the given radius and height.
///
/// The trunk is capped at both ends, so the first contact may be on the
/// lateral wall, the top disc or the bottom disc. A segment that starts inside
/// the solid reports `t = 0` only when it moves deeper, with the contact
/// point moved out through the nearest face.
pub fn sweep_cylinder(
    start: Vec3,
    end: Vec3,
    base: Vec3,
    axis: Vec3,
    radius: f32,
    height: f32,
) -> Option<SweptHit> {
    let axis = axis.try_normalize()?;
    let d = end - start;
    let s = start - base;

    // Work in the plane perpendicular to the trunk axis
    let s_perp = s - axis * s.dot(axis);
    let d_perp = d - axis * d.dot(axis);
    let start_along = s.dot(axis);
    let in_band = |h: f32| (0.0..=height).contains(&h);
    let radial_normal = |perp: Vec3| {
        perp.try_normalize()
            .or_else(|| (-d_perp).try_normalize())
            .unwrap_or_else(|| axis.any_orthonormal_vector())
    };

    let c = s_perp.length_squared() - radius * radius;
    if c <= 0.0 && in_band(start_along) {
        // Already inside: leave through the nearest face
        let faces = [
            (radius - s_perp.length(), radial_normal(s_perp)),
            (height - start_along, axis),
            (start_along, -axis),
        ];
        let (depth, normal) = faces
            .into_iter()
            .min_by(|x, y| x.0.total_cmp(&y.0))
            .unwrap_or(faces[0]);
        if d.dot(normal) >= 0.0 {
            return None;
        }
        return Some(SweptHit {
            t: 0.0,
            point: start + normal * depth.max(0.0),
            normal,
        });
    }

    let mut closest: Option<SweptHit> = None;
    let mut consider = |hit: SweptHit| {
        if closest.is_none_or(|best| hit.t < best.t) {
            closest = Some(hit);
        }
    };

    // Lateral wall
    let a = d_perp.length_squared();
    let b = s_perp.dot(d_perp);
    if c > 0.0 && a >= STATIONARY_EPSILON && b < 0.0 {
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let t = (-b - discriminant.sqrt()) / a;
            if (0.0..=1.0).contains(&t) && in_band(start_along + d.dot(axis) * t) {
                consider(SweptHit {
                    t,
                    point: start + d * t,
                    normal: radial_normal(s_perp + d_perp * t),
                });
            }
        }
    }

    // Top and bottom discs
    for (plane, normal) in [(height, axis), (0.0, -axis)] {
        let gap = (start_along - plane) * normal.dot(axis);
        let approach = d.dot(normal);
        if gap < 0.0 || approach >= 0.0 {
            continue;
        }
        let t = gap / -approach;
        if t > 1.0 {
            continue;
        }
        if (s_perp + d_perp * t).length_squared() <= radius * radius {
            consider(SweptHit {
                t,
                point: start + d * t,
                normal,
            });
        }
    }

    closest
}

impl ColliderShape {
    /// Swept test for a body of `probe_radius` moving from `start` to `end`.
    pub fn sweep(&self, start: Vec3, end: Vec3, probe_radius: f32) -> Option<SweptHit> {
        match *self {
            ColliderShape::Cylinder {
                base,
                axis,
                radius,
                height,
            } => sweep_cylinder(start, end, base, axis, radius + probe_radius, height),
            ColliderShape::Sphere { center, radius } => {
                sweep_sphere(start, end, center, radius + probe_radius)
            }
        }
    }

    /// Conservative bounding sphere (center, radius) for broad-phase culling.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        match *self {
            ColliderShape::Cylinder {
                base,
                axis,
                radius,
                height,
            } => {
                let half = height * 0.5;
                (base + axis * half, (radius * radius + half * half).sqrt())
            }
            ColliderShape::Sphere { center, radius } => (center, radius),
        }
    }

    /// Overlap between the agent and this shape, measured along the surface.
    ///
    /// `position` is the agent's world position, `feet_altitude` the distance
    /// from the planet center to its feet, `body_height` how far its body
    /// extends above the feet and `body_radius` its horizontal radius.
    pub fn surface_overlap(
        &self,
        position: Vec3,
        feet_altitude: f32,
        body_height: f32,
        body_radius: f32,
    ) -> Option<SurfaceContact> {
        let (base_point, axis) = match *self {
            ColliderShape::Cylinder { base, axis, .. } => (base, axis.normalize_or_zero()),
            ColliderShape::Sphere { center, .. } => (center, up_at(center)),
        };

        // Vertical band: feet below the top, head above the bottom
        let relative_feet = feet_altitude - self.base_altitude();
        let (band_low, band_high) = self.height_band();
        if relative_feet >= band_high || relative_feet + body_height <= band_low {
            return None;
        }

        let up = up_at(position);
        let distance = surface_distance(up, axis, self.base_altitude());
        let combined = self.footprint_radius() + body_radius;
        if distance >= combined {
            return None;
        }

        let push_direction = project_on_tangent(position - base_point, up)
            .try_normalize()
            .unwrap_or_else(|| up.any_orthonormal_vector());
        Some(SurfaceContact {
            penetration: combined - distance,
            push_direction,
        })
    }
}

/// First collidable struck by a body moving from `start` to `end`.
///
/// Non-solid entries (the planet, water, decorations) are skipped. Among all
/// intersected colliders the one with the smallest `t` wins.
pub fn first_collider_hit(
    colliders: &[Collidable],
    start: Vec3,
    end: Vec3,
    probe_radius: f32,
) -> Option<ColliderHit> {
    let mid = (start + end) * 0.5;
    let half_len = (end - start).length() * 0.5;

    let mut closest: Option<ColliderHit> = None;
    for (index, collidable) in colliders.iter().enumerate() {
        let Some(shape) = collidable.shape() else {
            continue;
        };

        let (center, bound) = shape.bounding_sphere();
        let reach = bound + half_len + probe_radius;
        if center.distance_squared(mid) > reach * reach {
            continue;
        }

        if let Some(hit) = shape.sweep(start, end, probe_radius) {
            if closest.is_none_or(|best| hit.t < best.hit.t) {
                closest = Some(ColliderHit { index, hit });
            }
        }
    }
    closest
}
