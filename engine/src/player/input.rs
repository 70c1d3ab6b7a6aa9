//! Movement input
//!
//! Key flags are tracked in [`MovementKeys`], decoupled from any windowing
//! library. Once per frame they are folded, together with the mouse look
//! deltas, into an [`InputIntent`] that the controller consumes.

use crate::physics::sphere::finite_scalar;

/// Generic key codes for movement input, independent of windowing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    ShiftLeft,
    ShiftRight,
    /// Catch-all for unhandled keys
    Unknown,
}

/// Tracks the current state of movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    /// W / Up - move forward
    pub forward: bool,
    /// S / Down - move backward
    pub backward: bool,
    /// A / Left - strafe left
    pub left: bool,
    /// D / Right - strafe right
    pub right: bool,
    /// Space - jump
    pub jump: bool,
    /// Shift - sprint
    pub sprint: bool,
}

impl MovementKeys {
    /// Create a new movement keys state with all keys released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update movement state based on key press/release.
    ///
    /// Returns `true` if the key was a movement key and was handled,
    /// `false` otherwise.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::W | KeyCode::ArrowUp => self.forward = pressed,
            KeyCode::S | KeyCode::ArrowDown => self.backward = pressed,
            KeyCode::A | KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::D | KeyCode::ArrowRight => self.right = pressed,
            KeyCode::Space => self.jump = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.sprint = pressed,
            KeyCode::Unknown => return false,
        }
        true
    }

    /// Reset all movement keys to released state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Get the forward/backward movement direction (-1, 0, or 1).
    pub fn forward_axis(&self) -> f32 {
        (self.forward as i32 - self.backward as i32) as f32
    }

    /// Get the left/right movement direction (-1, 0, or 1).
    pub fn right_axis(&self) -> f32 {
        (self.right as i32 - self.left as i32) as f32
    }
}

/// What the agent wants to do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputIntent {
    /// Forward (+) / backward (-) in `[-1, 1]`
    pub forward: f32,
    /// Right (+) / left (-) in `[-1, 1]`
    pub right: f32,
    pub sprint: bool,
    /// Request a jump this tick
    pub jump: bool,
    /// Yaw delta in radians (positive turns right)
    pub look_yaw: f32,
    /// Pitch delta in radians (positive looks up)
    pub look_pitch: f32,
}

impl InputIntent {
    /// Intent with no movement and no look change.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Build an intent from held keys and this frame's look deltas.
    pub fn from_keys(keys: &MovementKeys, look_yaw: f32, look_pitch: f32) -> Self {
        Self {
            forward: keys.forward_axis(),
            right: keys.right_axis(),
            sprint: keys.sprint,
            jump: keys.jump,
            look_yaw,
            look_pitch,
        }
    }

    /// Copy with non-finite values zeroed and axes clamped to `[-1, 1]`.
    pub fn sanitized(&self) -> Self {
        if !self.is_finite() {
            tracing::warn!(intent = ?self, "non-finite input intent, zeroing bad fields");
        }
        Self {
            forward: finite_scalar(self.forward).clamp(-1.0, 1.0),
            right: finite_scalar(self.right).clamp(-1.0, 1.0),
            sprint: self.sprint,
            jump: self.jump,
            look_yaw: finite_scalar(self.look_yaw),
            look_pitch: finite_scalar(self.look_pitch),
        }
    }

    fn is_finite(&self) -> bool {
        self.forward.is_finite()
            && self.right.is_finite()
            && self.look_yaw.is_finite()
            && self.look_pitch.is_finite()
    }

    /// Whether any movement axis is non-zero.
    pub fn wants_to_move(&self) -> bool {
        self.forward != 0.0 || self.right != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_key_updates_flags() {
        let mut keys = MovementKeys::new();
        assert!(keys.handle_key(KeyCode::W, true));
        assert!(keys.handle_key(KeyCode::ShiftLeft, true));
        assert!(!keys.handle_key(KeyCode::Unknown, true));
        assert!(keys.forward);
        assert!(keys.sprint);

        keys.handle_key(KeyCode::W, false);
        assert!(!keys.forward);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut keys = MovementKeys::new();
        keys.handle_key(KeyCode::A, true);
        keys.handle_key(KeyCode::D, true);
        assert_eq!(keys.right_axis(), 0.0);
        keys.handle_key(KeyCode::A, false);
        assert_eq!(keys.right_axis(), 1.0);
    }

    #[test]
    fn test_from_keys() {
        let mut keys = MovementKeys::new();
        keys.handle_key(KeyCode::S, true);
        keys.handle_key(KeyCode::Space, true);
        let intent = InputIntent::from_keys(&keys, 0.1, -0.2);
        assert_eq!(intent.forward, -1.0);
        assert_eq!(intent.right, 0.0);
        assert!(intent.jump);
        assert!(!intent.sprint);
        assert_eq!(intent.look_yaw, 0.1);
        assert_eq!(intent.look_pitch, -0.2);
    }

    #[test]
    fn test_sanitized_clamps_and_zeroes() {
        let intent = InputIntent {
            forward: 3.0,
            right: f32::NAN,
            look_yaw: f32::INFINITY,
            look_pitch: 0.5,
            ..Default::default()
        };
        let clean = intent.sanitized();
        assert_eq!(clean.forward, 1.0);
        assert_eq!(clean.right, 0.0);
        assert_eq!(clean.look_yaw, 0.0);
        assert_eq!(clean.look_pitch, 0.5);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut keys = MovementKeys::new();
        keys.handle_key(KeyCode::D, true);
        keys.handle_key(KeyCode::Space, true);
        keys.reset();
        assert_eq!(keys, MovementKeys::default());
        assert!(!InputIntent::from_keys(&keys, 0.0, 0.0).wants_to_move());
    }
}
