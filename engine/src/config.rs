//! Simulation configuration
//!
//! Every tuning value lives here rather than in constants, so a session can be
//! reproduced from a single JSON file. Missing fields fall back to the
//! defaults, which means `{}` is a valid configuration.
//!
//! # Example
//!
//! ```ignore
//! use sling_planet_engine::config::SimConfig;
//!
//! let config = SimConfig::from_json_str(r#"{ "planet": { "radius": 60.0 }, "seed": 9 }"#)?;
//! assert_eq!(config.controller.max_jumps, 2);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::ballistics::BallisticsConfig;
use crate::physics::terrain::Planet;
use crate::player::movement_controller::ControllerConfig;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Complete configuration for a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub planet: Planet,
    pub controller: ControllerConfig,
    pub ballistics: BallisticsConfig,
    /// Seed for the bounce perturbation RNG
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            planet: Planet::default(),
            controller: ControllerConfig::default(),
            ballistics: BallisticsConfig::default(),
            seed: 0x5EED,
        }
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive finite number"))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a non-negative finite number"))
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to human-readable JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("planet.radius", self.planet.radius)?;

        let c = &self.controller;
        require_positive("controller.max_dt", c.max_dt)?;
        require_positive("controller.contact_offset", c.contact_offset)?;
        require_non_negative("controller.agent_radius", c.agent_radius)?;
        require_non_negative("controller.walk_speed", c.walk_speed)?;
        require_non_negative("controller.sprint_speed", c.sprint_speed)?;
        require_non_negative("controller.gravity", c.gravity)?;
        require_positive("controller.max_step_distance", c.max_step_distance)?;
        require_positive("controller.max_height_above_ground", c.max_height_above_ground)?;
        require_non_negative("controller.ground_snap_threshold", c.ground_snap_threshold)?;
        require_non_negative("controller.ground_release_hysteresis", c.ground_release_hysteresis)?;
        if c.max_jumps == 0 {
            return Err(invalid("controller.max_jumps", "must allow at least one jump"));
        }
        if c.max_gravity_multiplier < 1.0 {
            return Err(invalid("controller.max_gravity_multiplier", "must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&c.collision_damping) {
            return Err(invalid("controller.collision_damping", "must be between 0.0 and 1.0"));
        }
        if !c.spawn_direction.is_finite() || c.spawn_direction.length_squared() < 1.0e-8 {
            return Err(invalid("controller.spawn_direction", "must be a non-zero finite vector"));
        }

        let b = &self.ballistics;
        require_positive("ballistics.max_dt", b.max_dt)?;
        require_positive("ballistics.lifetime", b.lifetime)?;
        require_positive("ballistics.escape_distance", b.escape_distance)?;
        require_non_negative("ballistics.gravity", b.gravity)?;
        require_non_negative("ballistics.collision_radius", b.collision_radius)?;
        require_non_negative("ballistics.separation", b.separation)?;
        require_non_negative("ballistics.bounce_jitter", b.bounce_jitter)?;
        require_non_negative("ballistics.expire_delay", b.expire_delay)?;
        require_non_negative("ballistics.min_bounce_speed", b.min_bounce_speed)?;
        if !(0.0..1.0).contains(&b.restitution) {
            return Err(invalid("ballistics.restitution", "must be in [0.0, 1.0)"));
        }
        if b.terrain_samples == 0 {
            return Err(invalid("ballistics.terrain_samples", "must be at least 1"));
        }
        if b.max_active == 0 {
            return Err(invalid("ballistics.max_active", "must be at least 1"));
        }
        if b.max_gravity_multiplier < 1.0 {
            return Err(invalid("ballistics.max_gravity_multiplier", "must be at least 1.0"));
        }
        Ok(())
    }
}
