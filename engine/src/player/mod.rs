//! Player Module
//!
//! Provides the walking agent and its control systems.
//!
//! # Components
//!
//! - [`SurfaceController`] - Curved-space walking, jumping and falling
//!   - Multi-jump budget with cooldown and coyote time
//!   - Static collision against tree trunks and rocks
//! - [`GroundState`] - Grounded / airborne / just-jumped state machine
//! - [`Orientation`] - Heading and pitch carried along the sphere
//! - [`InputIntent`] - Per-tick movement and look request

pub mod ground_state;
pub mod input;
pub mod movement_controller;
pub mod orientation;

pub use ground_state::GroundState;
pub use input::{InputIntent, KeyCode, MovementKeys};
pub use movement_controller::{
    Agent, ControllerConfig, SurfaceController,
    WALK_SPEED, SPRINT_SPEED, JUMP_VELOCITY, GRAVITY, COYOTE_TIME,
};
pub use orientation::{Orientation, PITCH_LIMIT};
