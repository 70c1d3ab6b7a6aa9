//! Agent orientation on a sphere
//!
//! Yaw is not stored as an angle: on a sphere there is no global "north" to
//! measure it from. Instead the agent keeps a heading vector in the tangent
//! plane and carries it along (parallel transport) as "up" changes with the
//! position. Pitch is a plain angle relative to the tangent plane.
//!
//! Conventions match the camera: yaw 0 faces -Z on the north pole, positive
//! yaw turns right, positive pitch looks up.

use glam::{Mat3, Quat, Vec3};

use crate::physics::sphere::{tangent_basis, tangent_direction};

/// Pitch limit: ±89 degrees in radians
pub const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// Local frame of the agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Local up (radial direction at the agent)
    pub up: Vec3,
    /// Unit tangent the body faces
    pub heading: Vec3,
    /// Look angle above the tangent plane (radians)
    pub pitch: f32,
}

impl Orientation {
    /// Orientation at `up`, facing the projection of -Z (or any tangent at the poles).
    pub fn new(up: Vec3) -> Self {
        Self {
            up,
            heading: tangent_direction(Vec3::NEG_Z, up),
            pitch: 0.0,
        }
    }

    /// Apply mouse look deltas. Positive yaw turns right.
    pub fn apply_look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if yaw_delta != 0.0 {
            let turned = Quat::from_axis_angle(self.up, -yaw_delta) * self.heading;
            self.heading = tangent_direction(turned, self.up);
        }
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Carry the heading over to a new up direction.
    ///
    /// The heading is rotated by the same minimal rotation that takes the old
    /// up to the new one, then re-projected onto the new tangent plane.
    pub fn realign(&mut self, new_up: Vec3) {
        let transport = if self.up.dot(new_up) > -0.999 {
            Quat::from_rotation_arc(self.up, new_up)
        } else {
            Quat::IDENTITY
        };
        self.heading = tangent_direction(transport * self.heading, new_up);
        self.up = new_up;
    }

    /// (forward, right) tangent basis for movement.
    pub fn movement_basis(&self) -> (Vec3, Vec3) {
        tangent_basis(self.heading, self.up)
    }

    /// Unit direction the camera looks along (heading tilted by pitch).
    pub fn camera_forward(&self) -> Vec3 {
        let (sin, cos) = self.pitch.sin_cos();
        (self.heading * cos + self.up * sin).normalize_or(self.heading)
    }

    /// Body rotation (no pitch): -Z maps to the heading, +Y to up.
    pub fn body_rotation(&self) -> Quat {
        let (forward, right) = self.movement_basis();
        Quat::from_mat3(&Mat3::from_cols(right, self.up, -forward)).normalize()
    }

    /// Camera rotation: body rotation pitched about its local X axis.
    pub fn camera_rotation(&self) -> Quat {
        self.body_rotation() * Quat::from_rotation_x(self.pitch)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::new(Vec3::Y)
    }
}
