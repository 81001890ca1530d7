//! Actor movement systems.
//!
//! [`actor_physics`] runs every enabled, unfrozen actor through its kind's
//! `advance` (which drives the tile resolver), then applies the actor's
//! named forces, world gravity included, if it is still airborne.
//! [`debug_actors`] traces actor state when
//! [`DebugMode`](crate::resources::debugmode::DebugMode) is present.
use bevy_ecs::prelude::*;
use log::debug;

use crate::actors::{ActorBehavior, ActorKind, ActorMut, ActorQuery, TickContext};
use crate::components::actorstatus::ActorStatus;
use crate::components::animation::AnimationMachine;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::gameplay::GameplayEvent;
use crate::physics;
use crate::resources::gameconfig::GameConfig;
use crate::resources::tileworld::TileWorld;
use crate::resources::worldtime::WorldTime;

pub fn actor_physics(
    mut actors: Query<ActorQuery>,
    tiles: Res<TileWorld>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let dt = time.delta;
    let mut ctx = TickContext::new(&tiles, &config, dt);
    for item in actors.iter_mut() {
        let (mut actor, kind) = ActorMut::split(item);
        if !actor.status.enabled || actor.body.frozen {
            continue;
        }
        kind.advance(&mut actor, &mut ctx);
        physics::apply_forces(&mut actor, &tiles, &config, dt);
    }
    writer.write_batch(ctx.events);
}

pub fn debug_actors(
    actors: Query<(
        Entity,
        &MapPosition,
        &RigidBody,
        &ActorStatus,
        &AnimationMachine,
        &ActorKind,
    )>,
    tiles: Res<TileWorld>,
    config: Res<GameConfig>,
) {
    for (entity, position, body, status, animation, kind) in actors.iter() {
        let center = physics::center(position.pos, body.size);
        debug!(
            "{} {:?} pos={:?} v={:?} tile={:?} grounded={} dead={} state={}",
            kind.name(),
            entity,
            position.pos,
            body.velocity,
            tiles.world_to_grid(center),
            physics::is_grounded(&tiles, &config, position.pos, body.size),
            status.dead,
            animation.current_name().unwrap_or("none"),
        );
    }
}
