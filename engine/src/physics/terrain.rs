//! Planet surface queries
//!
//! The terrain is owned by the host. The core only sees it through the
//! [`TerrainHeight`] trait: a pure function from a unit direction to a height
//! offset above the nominal planet radius. [`Planet`] combines that offset with
//! the base radius and guards against hosts that return garbage.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::sphere::{tangent_basis, up_at};

/// Height field over the unit sphere.
///
/// Implementations must be deterministic and side-effect free; the controller
/// and ballistics engine may call them several times per tick.
pub trait TerrainHeight {
    /// Height offset (meters) above the nominal planet radius for `direction`.
    fn height(&self, direction: Vec3) -> f32;
}

impl<F> TerrainHeight for F
where
    F: Fn(Vec3) -> f32,
{
    #[inline]
    fn height(&self, direction: Vec3) -> f32 {
        self(direction)
    }
}

/// A perfectly smooth planet (height offset is always zero).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatTerrain;

impl TerrainHeight for FlatTerrain {
    #[inline]
    fn height(&self, _direction: Vec3) -> f32 {
        0.0
    }
}

/// Angular step used for finite-difference terrain normals (radians).
const NORMAL_SAMPLE_ANGLE: f32 = 0.002;

/// The planet the agent walks on, centered at the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    /// Nominal sphere radius in meters (terrain heights are offsets from this)
    pub radius: f32,
}

impl Default for Planet {
    fn default() -> Self {
        Self { radius: 100.0 }
    }
}

impl Planet {
    /// Create a planet with the given nominal radius.
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Sanitized terrain height for a direction.
    ///
    /// Non-finite samples are a host contract violation; they are logged and
    /// treated as zero so a single bad sample cannot corrupt a position.
    pub fn terrain_height<T: TerrainHeight + ?Sized>(&self, terrain: &T, direction: Vec3) -> f32 {
        let height = terrain.height(direction);
        if height.is_finite() {
            height
        } else {
            tracing::warn!(?direction, height, "terrain returned a non-finite height, using 0");
            0.0
        }
    }

    /// Distance from the planet center to the terrain surface along `direction`.
    pub fn surface_radius<T: TerrainHeight + ?Sized>(&self, terrain: &T, direction: Vec3) -> f32 {
        self.radius + self.terrain_height(terrain, direction)
    }

    /// World-space terrain point directly below (or above) `position`.
    pub fn surface_point<T: TerrainHeight + ?Sized>(&self, terrain: &T, position: Vec3) -> Vec3 {
        let up = up_at(position);
        up * self.surface_radius(terrain, up)
    }

    /// Signed height of `position` above the terrain (negative = underground).
    pub fn height_above_surface<T: TerrainHeight + ?Sized>(&self, terrain: &T, position: Vec3) -> f32 {
        let up = up_at(position);
        position.length() - self.surface_radius(terrain, up)
    }

    /// Outward terrain normal at `direction`, from central differences.
    ///
    /// On a flat planet this is the radial direction itself.
    pub fn surface_normal<T: TerrainHeight + ?Sized>(&self, terrain: &T, direction: Vec3) -> Vec3 {
        let up = up_at(direction);
        let (forward, right) = tangent_basis(Vec3::NEG_Z, up);

        let sample = |offset: Vec3| {
            let dir = (up + offset).normalize();
            dir * self.surface_radius(terrain, dir)
        };
        let step = NORMAL_SAMPLE_ANGLE;
        let along_forward = sample(forward * step) - sample(-forward * step);
        let along_right = sample(right * step) - sample(-right * step);

        let normal = along_right.cross(along_forward);
        match normal.try_normalize() {
            Some(n) if n.dot(up) > 0.0 => n,
            Some(n) if n.dot(up) < 0.0 => -n,
            _ => up,
        }
    }
}
