//! Animation playback system.
//!
//! Advances every enabled actor's
//! [`AnimationMachine`](crate::components::animation::AnimationMachine) by the
//! tick's scaled milliseconds, then hands the cues its listeners
//! raised (this tick, or earlier during physics) to the actor's kind.
use bevy_ecs::prelude::*;

use crate::actors::{ActorBehavior, ActorMut, ActorQuery, TickContext};
use crate::events::gameplay::GameplayEvent;
use crate::resources::gameconfig::GameConfig;
use crate::resources::tileworld::TileWorld;
use crate::resources::worldtime::WorldTime;

pub fn advance_animations(
    mut actors: Query<ActorQuery>,
    tiles: Res<TileWorld>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let mut ctx = TickContext::new(&tiles, &config, time.delta);
    for item in actors.iter_mut() {
        let (mut actor, kind) = ActorMut::split(item);
        if !actor.status.enabled {
            continue;
        }
        actor.animation.advance(time.delta_ms);
        for cue in actor.animation.take_cues() {
            kind.animation_cue(&mut actor, cue, &mut ctx);
        }
    }
    writer.write_batch(ctx.events);
}
