//! Debug toggle resource.
//!
//! The mere presence of this resource turns on per-tick `debug!` traces of
//! every actor's position, velocity, tile and animation state. Remove it to
//! silence them.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, systems log per-actor diagnostics each tick.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct DebugMode {}
