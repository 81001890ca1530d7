//! ECS components for actors and pickups.
//!
//! This module groups all component types that can be attached to entities in
//! the simulation. Every actor carries the full set bundled in
//! [`ActorBundle`](crate::actors::ActorBundle); pickups only need a position
//! and a [`collectible::Collectible`].
//!
//! Submodules overview:
//! - [`actorstatus`] – enabled / visible / dead flags
//! - [`animation`] – name-addressable animation state machine
//! - [`boxcollider`] – composite list of axis-aligned collision boxes
//! - [`collectible`] – pickup that scores when the player touches it
//! - [`collision`] – responder signature and box snapshots passed to it
//! - [`locomotion`] – movement intent, facing and jump bookkeeping
//! - [`mapposition`] – world-space top-left corner of an entity
//! - [`rigidbody`] – velocity, named forces and per-actor movement tuning

pub mod actorstatus;
pub mod animation;
pub mod boxcollider;
pub mod collectible;
pub mod collision;
pub mod locomotion;
pub mod mapposition;
pub mod rigidbody;
