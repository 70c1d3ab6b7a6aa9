//! Curved-space vector helpers
//!
//! Everything on a planet is relative to the radial direction at the current
//! position: "up" points away from the planet center, horizontal movement
//! lives in the tangent plane, and gravity pulls toward the center.
//!
//! The planet center is always the world origin. None of these functions keep
//! state; "up" is re-derived from a position every time it is needed so it can
//! never drift out of sync with the position it belongs to.

use glam::{Quat, Vec3};

/// Up direction used when a position collapses onto the planet center.
pub const FALLBACK_UP: Vec3 = Vec3::Y;

/// Squared length below which a vector is treated as degenerate.
const DEGENERATE_LENGTH_SQ: f32 = 1.0e-8;

/// Radial "up" at a world position (surface normal of a perfect sphere).
///
/// Returns [`FALLBACK_UP`] at the planet center or for non-finite input.
pub fn up_at(position: Vec3) -> Vec3 {
    if !position.is_finite() || position.length_squared() < DEGENERATE_LENGTH_SQ {
        FALLBACK_UP
    } else {
        position.normalize()
    }
}

/// Gravity direction (toward the planet center) at a world position.
#[inline]
pub fn down_at(position: Vec3) -> Vec3 {
    -up_at(position)
}

/// Component of `v` along the unit vector `up`.
#[inline]
pub fn radial_component(v: Vec3, up: Vec3) -> f32 {
    v.dot(up)
}

/// Removes the component of `v` along `up`, leaving the tangent-plane part.
#[inline]
pub fn project_on_tangent(v: Vec3, up: Vec3) -> Vec3 {
    v - up * v.dot(up)
}

/// Splits `v` into its radial scalar and tangent-plane vector.
#[inline]
pub fn split_radial(v: Vec3, up: Vec3) -> (f32, Vec3) {
    let radial = v.dot(up);
    (radial, v - up * radial)
}

/// Projects `hint` onto the tangent plane and normalizes it.
///
/// When `hint` is (almost) parallel to `up`, for example a camera looking
/// straight down, an arbitrary but deterministic tangent is returned instead.
pub fn tangent_direction(hint: Vec3, up: Vec3) -> Vec3 {
    let tangent = project_on_tangent(hint, up);
    if tangent.is_finite() && tangent.length_squared() > DEGENERATE_LENGTH_SQ {
        tangent.normalize()
    } else {
        up.any_orthonormal_vector()
    }
}

/// Orthonormal (forward, right) pair spanning the tangent plane.
///
/// `right = forward × up`, so with up = +Y and forward = -Z, right is +X.
pub fn tangent_basis(forward_hint: Vec3, up: Vec3) -> (Vec3, Vec3) {
    let forward = tangent_direction(forward_hint, up);
    let right = forward.cross(up).normalize_or_zero();
    (forward, right)
}

/// Great-circle angle between two directions in radians.
pub fn angular_separation(a: Vec3, b: Vec3) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Arc length along a sphere of `radius` subtended by `angle` radians.
#[inline]
pub fn arc_length(angle: f32, radius: f32) -> f32 {
    angle * radius
}

/// Surface distance between two directions measured on a sphere of `radius`.
pub fn surface_distance(a: Vec3, b: Vec3, radius: f32) -> f32 {
    arc_length(angular_separation(a, b), radius)
}

/// Rotates `direction` by `angle` radians about `axis` (right-handed).
pub fn rotate_about(direction: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle) * direction,
        None => direction,
    }
}

/// Reflects `v` about a unit `normal` (mirror the normal component).
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * (2.0 * v.dot(normal))
}

/// Returns `v` if every component is finite, otherwise `fallback`.
#[inline]
pub fn finite_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.is_finite() { v } else { fallback }
}

/// Returns `x` if finite, otherwise zero.
#[inline]
pub fn finite_scalar(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}
