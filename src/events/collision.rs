//! Collision notifications.
//!
//! The composite collision pass triggers one [`CollisionEvent`] for every
//! pair of intersecting boxes, after both responders of that pair have run.
//! Responders already carry the gameplay consequences; observers of this
//! event are for diagnostics and external listeners.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

/// Event fired when a box of `a` intersects a box of `b`.
///
/// `a` is the actor with the lower entity index. `a_box` and `b_box` name
/// the boxes that touched.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
    pub a_box: &'static str,
    pub b_box: &'static str,
}

/// Observer that logs every box hit at `debug` level.
pub fn log_collision(trigger: On<CollisionEvent>) {
    let event = trigger.event();
    debug!(
        "collision {:?}.{} <-> {:?}.{}",
        event.a, event.a_box, event.b, event.b_box
    );
}
