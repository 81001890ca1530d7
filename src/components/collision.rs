//! Responder types for composite collision boxes.
//!
//! A responder is a plain function pointer stored on a
//! [`CollisionBox`](super::boxcollider::CollisionBox). It cannot capture
//! anything; instead it receives the whole [`World`] plus a description of
//! its own box and of the box it touched, and looks the owners up by
//! [`Entity`]. Owners may have been changed, disabled or stripped of their
//! boxes by an earlier responder in the same pass.

use bevy_ecs::prelude::*;
use glam::IVec2;

/// Snapshot of one box involved in a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxInfo {
    pub owner: Entity,
    pub name: &'static str,
    pub offset: IVec2,
    pub size: IVec2,
}

/// Callback invoked with (own box, other box) when two boxes intersect.
pub type CollisionResponder = fn(world: &mut World, me: &BoxInfo, other: &BoxInfo);
