//! Session bookkeeping systems.
//!
//! - [`session_is_playing`] gates physics and collisions once the level is
//!   over, so a dead player stays put while its death animation plays.
//! - [`collect_items`] scores pickups touched by a live player.
//! - [`apply_gameplay_events`] folds this tick's [`GameplayEvent`]s into the
//!   [`GameSession`] and into the actors they name.
use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::actors::ActorKind;
use crate::components::actorstatus::ActorStatus;
use crate::components::animation::AnimationMachine;
use crate::components::boxcollider::{BoxRect, CollisionBoxes};
use crate::components::collectible::Collectible;
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::gameplay::{GameplayEvent, sounds};
use crate::physics;
use crate::resources::gamestate::{GameSession, SessionState};

const COLLECTIBLE_SCORE: i64 = 100;

pub fn session_is_playing(session: Res<GameSession>) -> bool {
    session.is_playing()
}

pub fn collect_items(
    mut items: Query<(&MapPosition, &mut Collectible)>,
    players: Query<(&MapPosition, &RigidBody, &ActorStatus, &ActorKind)>,
    mut writer: MessageWriter<GameplayEvent>,
) {
    let total = items.iter().count();
    let mut collected = items.iter().filter(|(_, item)| item.collected).count();

    for (position, body, status, kind) in players.iter() {
        if !kind.is_player() || status.dead {
            continue;
        }
        let player_rect = BoxRect::new(
            position.pos.x.floor() as i32,
            position.pos.y.floor() as i32,
            body.size.x,
            body.size.y,
        );
        for (item_position, mut item) in items.iter_mut() {
            if item.collected || !item.rect(item_position.pos).intersects(&player_rect) {
                continue;
            }
            item.collected = true;
            collected += 1;
            let sound = if collected >= total {
                sounds::ALL_COINS
            } else {
                sounds::COIN
            };
            writer.write(GameplayEvent::Sound(sound));
            writer.write(GameplayEvent::Score(COLLECTIBLE_SCORE));
        }
    }
}

pub fn apply_gameplay_events(
    mut reader: MessageReader<GameplayEvent>,
    mut session: ResMut<GameSession>,
    mut actors: Query<(
        &mut MapPosition,
        &RigidBody,
        &mut ActorStatus,
        &mut CollisionBoxes,
        &mut AnimationMachine,
    )>,
) {
    for event in reader.read() {
        match event {
            GameplayEvent::Sound(_) => {}
            GameplayEvent::Score(points) => session.add_score(*points),
            GameplayEvent::PlayerDied { entity } => {
                if let Ok((_, _, mut status, _, mut animation)) = actors.get_mut(*entity) {
                    status.dead = true;
                    // Death overrides locked states.
                    animation.clear_state();
                    animation.set_state("death");
                }
                if session.is_playing() {
                    info!("Player died with score {}", session.score);
                    session.set_state(SessionState::Dead);
                }
            }
            GameplayEvent::LevelAdvance => {
                if session.is_playing() {
                    info!("Level {} complete", session.level);
                    session.level_advance_requested = true;
                    session.set_state(SessionState::LevelComplete);
                }
            }
            GameplayEvent::CarryActor { entity, center } => {
                if let Ok((mut position, body, _, _, _)) = actors.get_mut(*entity) {
                    position.pos = *center - physics::half_size(body.size);
                }
            }
            GameplayEvent::Swallow { entity } => {
                if let Ok((_, _, mut status, mut boxes, _)) = actors.get_mut(*entity) {
                    debug!("{entity:?} swallowed");
                    status.visible = false;
                    status.enabled = false;
                    boxes.clear();
                }
            }
        }
    }
}
