//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` by `dt_ms` unscaled milliseconds.
pub fn update_world_time(world: &mut World, dt_ms: u32) {
    world.resource_mut::<WorldTime>().advance(dt_ms);
}
