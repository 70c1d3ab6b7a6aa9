//! Surface Movement Controller
//!
//! Walks, jumps and falls on a small planet. All directions are local:
//! "up" is the radial direction at the agent, movement happens in the tangent
//! plane, and gravity pulls toward the planet center.
//!
//! # Physics Model
//!
//! - Walk speed: 5.0 m/s
//! - Sprint speed: 10.0 m/s
//! - Jump impulse: 8.0 m/s along local up
//! - Gravity: 20.0 m/s², ramping up to 2x the longer the agent is airborne
//!
//! # Tick Order
//!
//! 1. Look, timers, optional jump
//! 2. Safety clamp (underground / absurdly high)
//! 3. Gravity while airborne
//! 4. Steering (lerp on ground, bounded acceleration in the air)
//! 5. Integrate with a per-tick displacement cap
//! 6. Ground snap / release
//! 7. Orientation realignment
//! 8. Static collisions against trunks and rocks
//! 9. Minimum altitude enforcement
//!
//! # Usage
//!
//! ```rust,ignore
//! use sling_planet_engine::player::{ControllerConfig, InputIntent, SurfaceController};
//! use sling_planet_engine::physics::{FlatTerrain, Planet};
//!
//! let mut controller = SurfaceController::new(ControllerConfig::default(), Planet::new(100.0), &FlatTerrain);
//!
//! // Each frame:
//! controller.tick(delta_time, &intent, &terrain, &colliders);
//! camera.position = controller.eye_position();
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::ground_state::GroundState;
use super::input::InputIntent;
use super::orientation::Orientation;
use crate::events::{CollisionEvent, ImpactSource, ImpactTarget};
use crate::physics::collider::Collidable;
use crate::physics::sphere::{finite_scalar, project_on_tangent, rotate_about, split_radial, up_at};
use crate::physics::terrain::{Planet, TerrainHeight};

/// Walk speed in meters per second
pub const WALK_SPEED: f32 = 5.0;

/// Sprint speed in meters per second
pub const SPRINT_SPEED: f32 = 10.0;

/// Jump velocity in meters per second
pub const JUMP_VELOCITY: f32 = 8.0;

/// Gravity acceleration in meters per second squared
pub const GRAVITY: f32 = 20.0;

/// Coyote time duration in seconds
/// Allows jumping shortly after leaving ground
pub const COYOTE_TIME: f32 = 0.1;

/// Tuning for [`SurfaceController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Largest time step accepted by a single tick (seconds)
    pub max_dt: f32,
    /// Height of the agent's eye above the terrain when standing (meters)
    pub contact_offset: f32,
    /// Horizontal body radius used for obstacle collisions (meters)
    pub agent_radius: f32,
    pub walk_speed: f32,
    pub sprint_speed: f32,
    /// Lerp rate toward the target ground speed (1/s)
    pub ground_acceleration: f32,
    /// Steering acceleration while airborne (m/s²)
    pub air_acceleration: f32,
    /// Tangential speed limit while airborne (m/s)
    pub air_speed_cap: f32,
    /// Base gravity (m/s²)
    pub gravity: f32,
    /// Gravity multiplier reached after `gravity_ramp_duration` airborne
    pub max_gravity_multiplier: f32,
    /// Seconds of airtime to reach the full multiplier
    pub gravity_ramp_duration: f32,
    /// Radial speed added by a jump (m/s)
    pub jump_impulse: f32,
    /// Jumps available between landings (ground jump included)
    pub max_jumps: u32,
    /// Minimum seconds between jumps
    pub jump_cooldown: f32,
    /// Seconds after a jump during which ground snapping is disabled
    pub jump_grace: f32,
    /// Seconds after walking off an edge during which a ground jump is allowed
    pub coyote_time: f32,
    /// Altitude above contact height at which a falling agent lands (meters)
    pub ground_snap_threshold: f32,
    /// Extra altitude a grounded agent may gain before it counts as airborne
    pub ground_release_hysteresis: f32,
    /// Maximum displacement per tick (meters)
    pub max_step_distance: f32,
    /// Beyond this height above terrain the agent is teleported back (meters)
    pub max_height_above_ground: f32,
    /// Direction from the planet center to the spawn point
    pub spawn_direction: Vec3,
    /// Spawn altitude above contact height (meters)
    pub spawn_altitude: f32,
    /// Outward speed added when bumping into an obstacle (m/s)
    pub collision_push_impulse: f32,
    /// Fraction of tangential speed removed on obstacle contact
    pub collision_damping: f32,
    /// Extra clearance added when pushing out of an obstacle (meters)
    pub collision_skin: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_dt: 0.1,
            contact_offset: 1.7,
            agent_radius: 0.4,
            walk_speed: WALK_SPEED,
            sprint_speed: SPRINT_SPEED,
            ground_acceleration: 10.0,
            air_acceleration: 8.0,
            air_speed_cap: SPRINT_SPEED,
            gravity: GRAVITY,
            max_gravity_multiplier: 2.0,
            gravity_ramp_duration: 1.0,
            jump_impulse: JUMP_VELOCITY,
            max_jumps: 2,
            jump_cooldown: 0.25,
            jump_grace: 0.1,
            coyote_time: COYOTE_TIME,
            ground_snap_threshold: 0.15,
            ground_release_hysteresis: 0.1,
            max_step_distance: 2.0,
            max_height_above_ground: 500.0,
            spawn_direction: Vec3::Y,
            spawn_altitude: 2.0,
            collision_push_impulse: 1.5,
            collision_damping: 0.5,
            collision_skin: 0.01,
        }
    }
}

impl ControllerConfig {
    /// Gravity multiplier after `airborne_time` seconds in the air.
    pub fn gravity_multiplier(&self, airborne_time: f32) -> f32 {
        let max = self.max_gravity_multiplier.max(1.0);
        if self.gravity_ramp_duration <= 0.0 {
            return max;
        }
        let progress = (airborne_time / self.gravity_ramp_duration).clamp(0.0, 1.0);
        1.0 + (max - 1.0) * progress
    }
}

/// Mutable state of the walking agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    /// Eye position in world space; its length encodes altitude
    pub position: Vec3,
    /// Velocity in world space (m/s)
    pub velocity: Vec3,
    pub orientation: Orientation,
    pub ground: GroundState,
    pub jumps_remaining: u32,
    /// Seconds until the next jump is allowed
    pub jump_cooldown: f32,
    /// Seconds since the agent last stood on terrain
    pub airborne_time: f32,
    /// Last position known to be finite
    pub last_valid_position: Vec3,
}

impl Agent {
    /// Local up at the agent.
    pub fn up(&self) -> Vec3 {
        up_at(self.position)
    }

    pub fn is_grounded(&self) -> bool {
        self.ground.is_grounded()
    }
}

/// Character controller for a spherical world.
#[derive(Debug, Clone)]
pub struct SurfaceController {
    config: ControllerConfig,
    planet: Planet,
    agent: Agent,
    events: Vec<CollisionEvent>,
}

impl SurfaceController {
    /// Create a controller and place the agent at the configured spawn point.
    pub fn new<T: TerrainHeight + ?Sized>(config: ControllerConfig, planet: Planet, terrain: &T) -> Self {
        let up = up_at(config.spawn_direction);
        let position = up * (planet.radius + config.contact_offset + config.spawn_altitude);
        let mut controller = Self {
            config,
            planet,
            agent: Agent {
                position,
                velocity: Vec3::ZERO,
                orientation: Orientation::new(up),
                ground: GroundState::FALLING,
                jumps_remaining: config.max_jumps,
                jump_cooldown: 0.0,
                airborne_time: 0.0,
                last_valid_position: position,
            },
            events: Vec::new(),
        };
        controller.reset(terrain);
        controller
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn planet(&self) -> &Planet {
        &self.planet
    }

    /// Current agent state.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Set the position directly (e.g. for teleportation).
    ///
    /// Non-finite positions are ignored. The next tick re-applies every
    /// altitude rule, so a position below the terrain is fixed there.
    pub fn set_position(&mut self, position: Vec3) {
        if position.is_finite() {
            self.agent.position = position;
            self.agent.last_valid_position = position;
        }
    }

    /// Set velocity directly (e.g. for knockback).
    pub fn set_velocity(&mut self, velocity: Vec3) {
        if velocity.is_finite() {
            self.agent.velocity = velocity;
        }
    }

    /// Camera position (the agent position is its eye).
    pub fn eye_position(&self) -> Vec3 {
        self.agent.position
    }

    /// Direction the camera looks along, pitch included.
    pub fn camera_forward(&self) -> Vec3 {
        self.agent.orientation.camera_forward()
    }

    /// Camera rotation (-Z forward, +Y up).
    pub fn camera_rotation(&self) -> Quat {
        self.agent.orientation.camera_rotation()
    }

    /// Take all collision events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Distance from the planet center at which the eye rests on terrain.
    fn contact_altitude<T: TerrainHeight + ?Sized>(&self, terrain: &T, up: Vec3) -> f32 {
        self.planet.surface_radius(terrain, up) + self.config.contact_offset
    }

    /// Signed height of the eye above its resting altitude.
    pub fn height_above_contact<T: TerrainHeight + ?Sized>(&self, terrain: &T) -> f32 {
        let up = self.agent.up();
        self.agent.position.length() - self.contact_altitude(terrain, up)
    }

    /// Teleport to the configured spawn point with zero velocity and a full
    /// jump budget. Calling it twice is the same as calling it once.
    pub fn reset<T: TerrainHeight + ?Sized>(&mut self, terrain: &T) {
        self.spawn_at(self.config.spawn_direction, self.config.spawn_altitude, terrain);
    }

    /// Place the agent `altitude` meters above its resting height along
    /// `direction`.
    pub fn spawn_at<T: TerrainHeight + ?Sized>(&mut self, direction: Vec3, altitude: f32, terrain: &T) {
        let up = up_at(direction);
        let altitude = finite_scalar(altitude).max(0.0);
        let position = up * (self.contact_altitude(terrain, up) + altitude);
        let ground = if altitude <= self.config.ground_snap_threshold {
            GroundState::Grounded
        } else {
            GroundState::FALLING
        };

        self.agent = Agent {
            position,
            velocity: Vec3::ZERO,
            orientation: Orientation::new(up),
            ground,
            jumps_remaining: self.config.max_jumps,
            jump_cooldown: 0.0,
            airborne_time: 0.0,
            last_valid_position: position,
        };
        self.events.clear();
    }

    /// Try to jump.
    ///
    /// Fails without touching any state when the budget is spent or the
    /// cooldown is still running.
    pub fn jump(&mut self) -> bool {
        let agent = &mut self.agent;
        if agent.jumps_remaining == 0 || agent.jump_cooldown > 0.0 {
            return false;
        }

        let up = agent.up();
        let (radial, tangential) = split_radial(agent.velocity, up);
        tracing::trace!(radial, remaining = agent.jumps_remaining, "jump");
        agent.velocity = tangential + up * self.config.jump_impulse;

        agent.jumps_remaining = if agent.ground.allows_ground_jump() {
            self.config.max_jumps.saturating_sub(1)
        } else {
            agent.jumps_remaining - 1
        };
        agent.jump_cooldown = self.config.jump_cooldown;
        agent.airborne_time = 0.0;
        agent.ground.on_jump(self.config.jump_grace);
        true
    }

    /// Advance the agent by one frame.
    ///
    /// A non-finite or non-positive `dt` does nothing; larger steps are
    /// clamped to `max_dt`.
    pub fn tick<T: TerrainHeight + ?Sized>(
        &mut self,
        dt: f32,
        intent: &InputIntent,
        terrain: &T,
        colliders: &[Collidable],
    ) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(self.config.max_dt);
        let intent = intent.sanitized();

        self.recover_non_finite();

        self.agent.orientation.apply_look(intent.look_yaw, intent.look_pitch);
        self.agent.jump_cooldown = (self.agent.jump_cooldown - dt).max(0.0);
        self.agent.ground.advance(dt);
        if intent.jump {
            self.jump();
        }

        self.safety_clamp(terrain);
        self.apply_gravity(dt);
        self.apply_steering(dt, &intent);
        self.integrate(dt);
        self.resolve_ground(terrain);
        self.align_orientation();
        self.resolve_obstacles(colliders);
        self.enforce_min_altitude(terrain);
        self.align_orientation();

        self.agent.last_valid_position = self.agent.position;
    }

    fn recover_non_finite(&mut self) {
        let agent = &mut self.agent;
        if !agent.position.is_finite() {
            tracing::warn!(restored = ?agent.last_valid_position, "non-finite agent position, restoring");
            agent.position = agent.last_valid_position;
            agent.velocity = Vec3::ZERO;
        }
        if !agent.velocity.is_finite() {
            tracing::warn!("non-finite agent velocity, zeroing");
            agent.velocity = Vec3::ZERO;
        }
    }

    fn land(&mut self) {
        let agent = &mut self.agent;
        if agent.ground.is_grounded() {
            return;
        }
        agent.ground.on_land();
        agent.jumps_remaining = self.config.max_jumps;
        agent.jump_cooldown = 0.0;
        agent.airborne_time = 0.0;
    }

    fn safety_clamp<T: TerrainHeight + ?Sized>(&mut self, terrain: &T) {
        let up = self.agent.up();
        let surface = self.planet.surface_radius(terrain, up);
        let radius = self.agent.position.length();

        if radius < surface + 0.5 * self.config.contact_offset {
            tracing::debug!(radius, surface, "agent below terrain, snapping to contact height");
            self.agent.position = up * (surface + self.config.contact_offset);
            self.agent.velocity = Vec3::ZERO;
            self.land();
        } else if radius - surface > self.config.max_height_above_ground {
            tracing::debug!(height = radius - surface, "agent too high, teleporting down");
            self.agent.position = up * (surface + self.config.contact_offset + self.config.spawn_altitude);
            self.agent.velocity = Vec3::ZERO;
            self.agent.airborne_time = 0.0;
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        let agent = &mut self.agent;
        if agent.ground.is_grounded() {
            return;
        }
        agent.airborne_time += dt;
        let multiplier = self.config.gravity_multiplier(agent.airborne_time);
        let down = -agent.up();
        agent.velocity += down * (self.config.gravity * multiplier * dt);
    }

    fn apply_steering(&mut self, dt: f32, intent: &InputIntent) {
        let agent = &mut self.agent;
        let up = agent.up();
        let (forward, right) = agent.orientation.movement_basis();

        let mut wish = forward * intent.forward + right * intent.right;
        if wish.length_squared() > 1.0 {
            wish = wish.normalize();
        }

        let (radial, tangential) = split_radial(agent.velocity, up);
        let tangential = if agent.ground.is_grounded() {
            let speed = if intent.sprint {
                self.config.sprint_speed
            } else {
                self.config.walk_speed
            };
            let blend = (self.config.ground_acceleration * dt).min(1.0);
            tangential.lerp(wish * speed, blend)
        } else {
            // Radial speed is kept aside, so the cap never dampens a jump
            (tangential + wish * (self.config.air_acceleration * dt)).clamp_length_max(self.config.air_speed_cap)
        };
        agent.velocity = tangential + up * radial;
    }

    fn integrate(&mut self, dt: f32) {
        let step = (self.agent.velocity * dt).clamp_length_max(self.config.max_step_distance);
        self.agent.position += step;
    }

    fn resolve_ground<T: TerrainHeight + ?Sized>(&mut self, terrain: &T) {
        let up = self.agent.up();
        let contact = self.contact_altitude(terrain, up);
        let altitude = self.agent.position.length() - contact;

        if self.agent.ground.suppresses_ground_detection() {
            if altitude < 0.0 {
                self.agent.position = up * contact;
                self.cancel_inward_velocity(up);
            }
            return;
        }

        let radial_speed = self.agent.velocity.dot(up);
        if self.agent.ground.is_grounded() {
            if altitude <= self.config.ground_snap_threshold + self.config.ground_release_hysteresis {
                self.agent.position = up * contact;
                self.agent.velocity = project_on_tangent(self.agent.velocity, up);
            } else {
                self.agent.ground.on_leave_ground(self.config.coyote_time);
            }
        } else if altitude <= self.config.ground_snap_threshold && radial_speed <= 0.0 {
            self.agent.position = up * contact;
            self.agent.velocity = project_on_tangent(self.agent.velocity, up);
            self.land();
        }
    }

    fn align_orientation(&mut self) {
        let up = self.agent.up();
        self.agent.orientation.realign(up);
    }

    fn cancel_inward_velocity(&mut self, up: Vec3) {
        let radial = self.agent.velocity.dot(up);
        if radial < 0.0 {
            self.agent.velocity -= up * radial;
        }
    }

    /// Push the agent out of trunks and rocks, measured along the surface.
    fn resolve_obstacles(&mut self, colliders: &[Collidable]) {
        for (index, collidable) in colliders.iter().enumerate() {
            let Some(shape) = collidable.shape() else {
                continue;
            };

            let position = self.agent.position;
            let feet = position.length() - self.config.contact_offset;
            let Some(contact) =
                shape.surface_overlap(position, feet, self.config.contact_offset, self.config.agent_radius)
            else {
                continue;
            };

            let up = up_at(position);
            let normal = contact.push_direction;
            let impact_speed = self.agent.velocity.length();

            let angle = (contact.penetration + self.config.collision_skin) / shape.base_altitude().max(1.0e-3);
            self.agent.position = rotate_about(position, up.cross(normal), angle);

            let new_up = self.agent.up();
            let normal = project_on_tangent(normal, new_up).normalize_or(normal);
            let into = self.agent.velocity.dot(normal);
            if into < 0.0 {
                self.agent.velocity -= normal * into;
            }
            let (radial, tangential) = split_radial(self.agent.velocity, new_up);
            let damping = self.config.collision_damping.clamp(0.0, 1.0);
            self.agent.velocity = new_up * radial
                + tangential * (1.0 - damping)
                + normal * self.config.collision_push_impulse;

            // Contact on the body's outline at foot level
            let feet = new_up * (self.agent.position.length() - self.config.contact_offset);
            self.events.push(CollisionEvent {
                source: ImpactSource::Agent,
                target: ImpactTarget::Collider(index),
                point: feet - normal * self.config.agent_radius,
                normal,
                impact_speed,
                rebound_speed: self.agent.velocity.length(),
            });
        }
    }

    fn enforce_min_altitude<T: TerrainHeight + ?Sized>(&mut self, terrain: &T) {
        let up = self.agent.up();
        let contact = self.contact_altitude(terrain, up);
        if self.agent.position.length() < contact {
            self.agent.position = up * contact;
            self.cancel_inward_velocity(up);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::terrain::FlatTerrain;

    const DT: f32 = 1.0 / 60.0;

    fn grounded_controller() -> SurfaceController {
        let mut controller = SurfaceController::new(ControllerConfig::default(), Planet::new(100.0), &FlatTerrain);
        controller.spawn_at(Vec3::Y, 0.0, &FlatTerrain);
        controller
    }

    fn run(controller: &mut SurfaceController, intent: InputIntent, ticks: usize) {
        for _ in 0..ticks {
            controller.tick(DT, &intent, &FlatTerrain, &[]);
        }
    }

    #[test]
    fn test_default_config_values() {
        let config = ControllerConfig::default();
        assert_eq!(config.walk_speed, 5.0);
        assert_eq!(config.sprint_speed, 10.0);
        assert_eq!(config.jump_impulse, 8.0);
        assert_eq!(config.gravity, 20.0);
        assert_eq!(config.coyote_time, 0.1);
        assert_eq!(config.max_jumps, 2);
    }

    #[test]
    fn test_gravity_multiplier_ramp() {
        let config = ControllerConfig::default();
        assert_eq!(config.gravity_multiplier(0.0), 1.0);
        assert!((config.gravity_multiplier(0.5) - 1.5).abs() < 1e-6);
        assert_eq!(config.gravity_multiplier(3.0), 2.0);
    }

    #[test]
    fn test_new_spawns_above_terrain() {
        let controller = SurfaceController::new(ControllerConfig::default(), Planet::new(100.0), &FlatTerrain);
        let agent = controller.agent();
        assert!((agent.position.length() - (100.0 + 1.7 + 2.0)).abs() < 1e-4);
        assert!(!agent.is_grounded());
        assert_eq!(agent.jumps_remaining, 2);
        assert_eq!(agent.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_spawn_at_zero_altitude_is_grounded() {
        let controller = grounded_controller();
        assert!(controller.agent().is_grounded());
        assert!((controller.height_above_contact(&FlatTerrain)).abs() < 1e-4);
    }

    #[test]
    fn test_no_input_no_movement() {
        let mut controller = grounded_controller();
        let before = controller.agent().position;
        run(&mut controller, InputIntent::idle(), 30);
        assert!((controller.agent().position - before).length() < 1e-4);
        assert!(controller.agent().is_grounded());
    }

    #[test]
    fn test_walk_forward_follows_heading() {
        let mut controller = grounded_controller();
        let intent = InputIntent {
            forward: 1.0,
            ..Default::default()
        };
        run(&mut controller, intent, 60);

        let agent = controller.agent();
        // Heading starts at -Z on the north pole
        assert!(agent.position.z < -2.0, "Should have walked toward -Z: {:?}", agent.position);
        assert!(agent.is_grounded());
        let speed = project_on_tangent(agent.velocity, agent.up()).length();
        assert!((speed - 5.0).abs() < 0.1, "Speed {speed} should approach walk speed");
        assert!(controller.height_above_contact(&FlatTerrain).abs() < 1e-3);
    }

    #[test]
    fn test_sprint_is_faster() {
        let mut controller = grounded_controller();
        let intent = InputIntent {
            forward: 1.0,
            sprint: true,
            ..Default::default()
        };
        run(&mut controller, intent, 90);
        let speed = controller.agent().velocity.length();
        assert!((speed - 10.0).abs() < 0.2, "Sprint speed was {speed}");
    }

    #[test]
    fn test_strafe_right() {
        let mut controller = grounded_controller();
        let intent = InputIntent {
            right: 1.0,
            ..Default::default()
        };
        run(&mut controller, intent, 30);
        assert!(controller.agent().position.x > 0.5);
    }

    #[test]
    fn test_jump_when_grounded() {
        let mut controller = grounded_controller();
        assert!(controller.jump());
        let agent = controller.agent();
        assert_eq!(agent.jumps_remaining, 1);
        assert!((agent.velocity.dot(agent.up()) - 8.0).abs() < 1e-5);
        assert!(agent.ground.suppresses_ground_detection());
    }

    #[test]
    fn test_jump_refused_during_cooldown() {
        let mut controller = grounded_controller();
        assert!(controller.jump());
        let snapshot = *controller.agent();
        assert!(!controller.jump(), "Cooldown should block the second jump");
        assert_eq!(*controller.agent(), snapshot);
    }

    #[test]
    fn test_jump_from_intent() {
        let mut controller = grounded_controller();
        let intent = InputIntent {
            jump: true,
            ..Default::default()
        };
        controller.tick(DT, &intent, &FlatTerrain, &[]);
        let agent = controller.agent();
        assert!(!agent.is_grounded());
        assert_eq!(agent.jumps_remaining, 1);
        assert!(controller.height_above_contact(&FlatTerrain) > 0.1);
    }

    #[test]
    fn test_full_jump_arc_lands() {
        let mut controller = grounded_controller();
        controller.jump();

        let mut max_height = 0.0_f32;
        let mut landed = false;
        for _ in 0..300 {
            controller.tick(DT, &InputIntent::idle(), &FlatTerrain, &[]);
            max_height = max_height.max(controller.height_above_contact(&FlatTerrain));
            if controller.agent().is_grounded() {
                landed = true;
                break;
            }
        }

        assert!(landed, "Agent should land again");
        // v0 = 8 and g ramps from 20 upward, so the apex stays below 1.6 m
        assert!(max_height > 0.8 && max_height < 1.6, "Max height was {max_height}");
        assert_eq!(controller.agent().jumps_remaining, 2, "Landing restores the budget");
        assert!(controller.height_above_contact(&FlatTerrain).abs() < 1e-3);
    }

    #[test]
    fn test_coyote_time_counts_as_ground_jump() {
        let mut controller = grounded_controller();
        controller.agent.ground = GroundState::Airborne { coyote_remaining: 0.05 };
        controller.agent.jumps_remaining = 1;
        assert!(controller.jump());
        assert_eq!(controller.agent().jumps_remaining, 1, "Coyote jump uses the ground jump");
    }

    #[test]
    fn test_air_jump_decrements() {
        let mut controller = grounded_controller();
        controller.agent.ground = GroundState::FALLING;
        assert!(controller.jump());
        assert_eq!(controller.agent().jumps_remaining, 1);
    }

    #[test]
    fn test_airborne_agent_falls() {
        let mut controller = grounded_controller();
        controller.spawn_at(Vec3::X, 5.0, &FlatTerrain);
        run(&mut controller, InputIntent::idle(), 10);
        let agent = controller.agent();
        assert!(agent.velocity.dot(agent.up()) < -1.0);
        assert!(agent.airborne_time > 0.1);
    }

    #[test]
    fn test_air_speed_is_capped_but_radial_kept() {
        let mut controller = grounded_controller();
        controller.spawn_at(Vec3::Y, 50.0, &FlatTerrain);
        controller.agent.velocity = Vec3::new(0.0, 5.0, -14.0);
        let intent = InputIntent {
            forward: 1.0,
            ..Default::default()
        };
        controller.tick(DT, &intent, &FlatTerrain, &[]);

        let config = *controller.config();
        let agent = controller.agent();
        let (radial, tangential) = split_radial(agent.velocity, agent.up());
        assert!(
            (tangential.length() - config.air_speed_cap).abs() < 0.05,
            "Tangential speed {} not held at the cap",
            tangential.length()
        );
        let expected_radial = 5.0 - config.gravity * config.gravity_multiplier(DT) * DT;
        assert!(
            (radial - expected_radial).abs() < 0.05,
            "Radial speed {radial}, expected {expected_radial}"
        );
    }

    #[test]
    fn test_invalid_dt_is_noop() {
        let mut controller = grounded_controller();
        let before = *controller.agent();
        let intent = InputIntent {
            forward: 1.0,
            ..Default::default()
        };
        controller.tick(f32::NAN, &intent, &FlatTerrain, &[]);
        controller.tick(0.0, &intent, &FlatTerrain, &[]);
        controller.tick(-1.0, &intent, &FlatTerrain, &[]);
        assert_eq!(*controller.agent(), before);
    }

    #[test]
    fn test_too_high_teleports_down() {
        let mut controller = grounded_controller();
        controller.agent.position = Vec3::Y * 2000.0;
        controller.agent.ground = GroundState::FALLING;
        controller.tick(DT, &InputIntent::idle(), &FlatTerrain, &[]);
        let height = controller.height_above_contact(&FlatTerrain);
        assert!(height < 3.0, "Height after teleport was {height}");
    }

    #[test]
    fn test_non_finite_position_restored() {
        let mut controller = grounded_controller();
        let good = controller.agent().position;
        controller.agent.position = Vec3::splat(f32::NAN);
        controller.tick(DT, &InputIntent::idle(), &FlatTerrain, &[]);
        assert!(controller.agent().position.is_finite());
        assert!((controller.agent().position - good).length() < 1e-3);
    }

    #[test]
    fn test_tree_pushes_agent_out() {
        let mut controller = grounded_controller();
        // Trunk stands 0.5 m ahead of the agent along -Z
        let base = Vec3::new(0.0, 100.0, -0.5).normalize() * 100.0;
        let tree = Collidable::tree(base, 3.0, 0.5, 6.0);

        controller.tick(DT, &InputIntent::idle(), &FlatTerrain, &[tree]);
        let events = controller.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, ImpactTarget::Collider(0));
        assert_eq!(events[0].source, ImpactSource::Agent);

        // Pushed away from the trunk, i.e. toward +Z
        assert!(controller.agent().position.z > 0.0);
        let dir = controller.agent().up();
        let distance = crate::physics::sphere::surface_distance(dir, tree.direction, 100.0);
        assert!(distance >= 0.9 - 1e-3, "Still overlapping: {distance}");
        assert!(controller.drain_events().is_empty());
    }
}
