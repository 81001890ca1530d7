//! Kinematic body component for tile-world actors.
//!
//! The [`RigidBody`] component stores the velocity and the per-actor tuning
//! the resolver reads every tick: walking acceleration, traction, speed caps
//! and jump impulse. Constant accelerations such as gravity are kept as named
//! forces that can be toggled individually; the movement system applies the
//! enabled ones to airborne actors after the resolver has run.
//!
//! The `frozen` flag takes an actor out of physics entirely, used while its
//! position is driven by something else (an enemy caught on a tongue).

use bevy_ecs::prelude::Component;
use glam::{IVec2, Vec2};
use rustc_hash::FxHashMap;

/// A named acceleration force that can be toggled on/off.
#[derive(Clone, Copy, Debug)]
pub struct AccelerationForce {
    /// The acceleration vector in world units per second squared.
    pub value: Vec2,
    /// Whether this force is currently active.
    pub enabled: bool,
}

impl AccelerationForce {
    /// Create a new enabled acceleration force.
    pub fn new(value: Vec2) -> Self {
        Self {
            value,
            enabled: true,
        }
    }
}

/// Kinematic body of an actor.
///
/// # Fields
/// - `velocity` - Current velocity in pixels per second
/// - `terminal_velocity` - Per-axis magnitude cap applied every tick
/// - `traction` - Horizontal deceleration per second while grounded and walking
/// - `max_walk_speed` - Horizontal cap while grounded and walking
/// - `move_speed` - Velocity added per tick of grounded movement intent
/// - `air_move_speed` - Velocity added per tick of airborne movement intent
/// - `walking` - Enables traction and the walking cap
/// - `can_move` - Enables movement intent
/// - `size` - Extent of the actor's rectangle used for tile probes
#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    pub velocity: Vec2,
    /// Named acceleration forces. The total acceleration is the sum of all enabled forces.
    pub forces: FxHashMap<String, AccelerationForce>,
    pub terminal_velocity: Vec2,
    pub traction: f32,
    pub max_walk_speed: f32,
    pub move_speed: f32,
    pub air_move_speed: f32,
    pub jump_strength: f32,
    pub walking: bool,
    pub can_move: bool,
    pub size: IVec2,
    /// When true, movement systems skip this entity.
    pub frozen: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Body with the stock actor tuning, falling at 100 px/s.
    pub fn new() -> Self {
        Self {
            velocity: Vec2::new(0.0, 100.0),
            forces: FxHashMap::default(),
            terminal_velocity: Vec2::new(300.0, 600.0),
            traction: 500.0,
            max_walk_speed: 800.0,
            move_speed: 10.0,
            air_move_speed: 1.0,
            jump_strength: 80.0,
            walking: true,
            can_move: true,
            size: IVec2::new(50, 50),
            frozen: false,
        }
    }

    pub fn with_size(mut self, size: IVec2) -> Self {
        self.size = size;
        self
    }

    /// Add or update a named acceleration force (enabled by default).
    pub fn add_force(&mut self, name: &str, value: Vec2) {
        self.forces
            .insert(name.to_string(), AccelerationForce::new(value));
    }

    /// Remove a named force entirely.
    pub fn remove_force(&mut self, name: &str) {
        self.forces.remove(name);
    }

    /// Enable or disable a specific force by name.
    /// Returns false if the force doesn't exist.
    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(force) = self.forces.get_mut(name) {
            force.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Check if a force exists and is enabled.
    pub fn is_force_enabled(&self, name: &str) -> bool {
        self.forces.get(name).is_some_and(|f| f.enabled)
    }

    /// Calculate the total acceleration from all enabled forces.
    pub fn total_acceleration(&self) -> Vec2 {
        self.forces
            .values()
            .filter(|force| force.enabled)
            .map(|force| force.value)
            .sum()
    }

    /// Clamp both velocity axes to `±terminal_velocity`.
    pub fn clamp_to_terminal(&mut self) {
        self.velocity = self
            .velocity
            .clamp(-self.terminal_velocity, self.terminal_velocity);
    }

    /// Freeze the body, preventing movement systems from updating it.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_rigidbody_new() {
        let rb = RigidBody::new();
        assert!(approx_eq(rb.velocity.y, 100.0));
        assert!(rb.forces.is_empty());
        assert!(rb.walking);
        assert!(rb.can_move);
        assert!(!rb.frozen);
        assert_eq!(rb.size, IVec2::new(50, 50));
    }

    #[test]
    fn test_add_force_overwrites() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, 100.0));
        rb.add_force("gravity", Vec2::new(0.0, 600.0));
        assert_eq!(rb.forces.len(), 1);
        assert!(approx_eq(rb.total_acceleration().y, 600.0));
    }

    #[test]
    fn test_disabled_force_excluded_from_total() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, 600.0));
        rb.add_force("wind", Vec2::new(20.0, 0.0));
        assert!(rb.set_force_enabled("gravity", false));
        assert!(!rb.is_force_enabled("gravity"));
        let total = rb.total_acceleration();
        assert!(approx_eq(total.x, 20.0));
        assert!(approx_eq(total.y, 0.0));
    }

    #[test]
    fn test_set_force_enabled_nonexistent() {
        let mut rb = RigidBody::new();
        assert!(!rb.set_force_enabled("nonexistent", true));
        rb.remove_force("nonexistent");
        assert!(rb.forces.is_empty());
    }

    #[test]
    fn test_clamp_to_terminal_both_axes() {
        let mut rb = RigidBody::new();
        rb.velocity = Vec2::new(-900.0, 1200.0);
        rb.clamp_to_terminal();
        assert!(approx_eq(rb.velocity.x, -300.0));
        assert!(approx_eq(rb.velocity.y, 600.0));
    }

    #[test]
    fn test_freeze_unfreeze() {
        let mut rb = RigidBody::new();
        rb.freeze();
        assert!(rb.frozen);
        rb.unfreeze();
        assert!(!rb.frozen);
    }
}
