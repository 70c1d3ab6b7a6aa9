//! Ground contact state machine
//!
//! ```text
//!            land                      leave ground
//!   Airborne ─────► Grounded ─────────────────────► Airborne { coyote }
//!      ▲               │ jump                            │ jump (coyote > 0)
//!      │               ▼                                 ▼
//!      └────────── JustJumped { grace } ◄────────────────┘
//!        grace expires
//! ```
//!
//! While `JustJumped`, ground snapping is suppressed so the jump impulse
//! cannot be cancelled on the very next tick.

/// Contact state of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GroundState {
    /// Standing on terrain
    #[default]
    Grounded,
    /// Falling or rising; a ground jump is still allowed while
    /// `coyote_remaining > 0`
    Airborne { coyote_remaining: f32 },
    /// Just launched; ground detection is off until `grace_remaining` runs out
    JustJumped { grace_remaining: f32 },
}

impl GroundState {
    /// Airborne with no coyote time left.
    pub const FALLING: GroundState = GroundState::Airborne { coyote_remaining: 0.0 };

    /// Whether the agent is standing on terrain.
    pub fn is_grounded(&self) -> bool {
        matches!(self, GroundState::Grounded)
    }

    /// Whether ground snapping must be skipped this tick.
    pub fn suppresses_ground_detection(&self) -> bool {
        matches!(self, GroundState::JustJumped { .. })
    }

    /// Whether a jump now counts as a jump from the ground (grounded or in
    /// the coyote window).
    pub fn allows_ground_jump(&self) -> bool {
        match *self {
            GroundState::Grounded => true,
            GroundState::Airborne { coyote_remaining } => coyote_remaining > 0.0,
            GroundState::JustJumped { .. } => false,
        }
    }

    /// Count down the coyote or grace timer.
    ///
    /// An expired grace window turns into plain falling.
    pub fn advance(&mut self, dt: f32) {
        match self {
            GroundState::Grounded => {}
            GroundState::Airborne { coyote_remaining } => {
                *coyote_remaining = (*coyote_remaining - dt).max(0.0);
            }
            GroundState::JustJumped { grace_remaining } => {
                let remaining = *grace_remaining - dt;
                *self = if remaining > 0.0 {
                    GroundState::JustJumped {
                        grace_remaining: remaining,
                    }
                } else {
                    GroundState::FALLING
                };
            }
        }
    }

    /// Walked off an edge or got lifted away from the terrain.
    ///
    /// Only a grounded agent gets a coyote window; other states are left alone.
    pub fn on_leave_ground(&mut self, coyote_time: f32) {
        if self.is_grounded() {
            *self = GroundState::Airborne {
                coyote_remaining: coyote_time.max(0.0),
            };
        }
    }

    /// Took off with a jump.
    pub fn on_jump(&mut self, grace: f32) {
        *self = GroundState::JustJumped {
            grace_remaining: grace.max(0.0),
        };
    }

    /// Touched down.
    pub fn on_land(&mut self) {
        *self = GroundState::Grounded;
    }
}
