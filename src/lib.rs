//! Tile platformer simulation core.
//!
//! Moves actors through a tile grid, resolves their collisions against the
//! grid and against each other, and keeps each actor's animation state in
//! step with the outcome of its movement. Rendering, audio and device input
//! stay outside; [`game::Simulation`] is the entry point for a driver.
//!
//! - [`actors`] – actor kinds and the behavior interface
//! - [`components`] – ECS components (position, body, boxes, animation, etc.)
//! - [`events`] – gameplay messages and collision events
//! - [`game`] – level loading and the per-tick driver
//! - [`physics`] – kinematic resolver and tile probes
//! - [`resources`] – tile world, configuration, input, time and session
//! - [`systems`] – ECS systems run every tick

pub mod actors;
pub mod components;
pub mod events;
pub mod game;
pub mod physics;
pub mod resources;
pub mod systems;
