//! Player intent system.
//!
//! Reads the [`InputState`] the driver filled in for this tick and forwards
//! it to every player actor. Sounds and level requests raised while doing so
//! are written as [`GameplayEvent`] messages.
use bevy_ecs::prelude::*;

use crate::actors::{ActorMut, ActorQuery, TickContext};
use crate::events::gameplay::GameplayEvent;
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::tileworld::TileWorld;
use crate::resources::worldtime::WorldTime;

pub fn player_input(
    mut actors: Query<ActorQuery>,
    input: Res<InputState>,
    tiles: Res<TileWorld>,
    config: Res<GameConfig>,
    time: Res<WorldTime>,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let mut ctx = TickContext::new(&tiles, &config, time.delta);
    for item in actors.iter_mut() {
        let (mut actor, kind) = ActorMut::split(item);
        if let Some(player) = kind.as_player_mut() {
            player.apply_input(&mut actor, &input, &mut ctx);
        }
    }
    writer.write_batch(ctx.events);
}
