//! Shelled patrol enemy.
//!
//! Walks back and forth, turning at walls and ledges. Stomping it once pulls
//! it into its shell; a shell slides at a fixed speed, ignores ledges, and
//! kills every other koopa it touches. Stomping a sliding shell stops it for
//! a tick; a koopa or shell without a direction always sets off to the right.

use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};
use log::debug;

use super::{ActorBehavior, ActorBundle, ActorKind, ActorMut, TickContext};
use crate::components::actorstatus::ActorStatus;
use crate::components::animation::{AnimationMachine, StateConfig};
use crate::components::boxcollider::{CollisionBox, CollisionBoxes};
use crate::components::collision::BoxInfo;
use crate::components::locomotion::{HorizontalDirection, Locomotion};
use crate::components::mapposition::MapPosition;
use crate::events::gameplay::{GameplayEvent, emit, sounds};
use crate::physics;
use crate::resources::gameconfig::GameConfig;

pub const BODY_BOX: &str = "body";

const SHELL_SPEED: f32 = 400.0;
const SHELL_TERMINAL_X: f32 = 1000.0;
const SHELL_KILL_SCORE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct Koopa {
    pub shelled: bool,
}

impl Koopa {
    /// A walking koopa heading left with its top-left corner at `position`.
    pub fn bundle(position: Vec2, config: &GameConfig) -> ActorBundle {
        let body = CollisionBox::new(BODY_BOX, IVec2::ZERO, IVec2::new(50, 50))
            .with_responder(shell_hit);
        let boxes: CollisionBoxes = std::iter::once(body).collect();

        let mut animation = animations();
        animation.set_state("idleleft");

        ActorBundle {
            position: MapPosition::from_vec(position),
            body: super::enemy_body(config),
            locomotion: Locomotion::facing(HorizontalDirection::Left),
            status: ActorStatus::default(),
            boxes,
            animation,
            kind: ActorKind::Koopa(Koopa::default()),
        }
    }
}

impl ActorBehavior for Koopa {
    fn advance(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        physics::step(self, actor, ctx);

        if actor.status.dead {
            super::float_away(actor, ctx.dt);
            return;
        }

        if actor.locomotion.move_direction == HorizontalDirection::None {
            // Stopped koopas and shells set off to the right on the next tick.
            actor.locomotion.set_direction(HorizontalDirection::Right);
        } else {
            super::patrol(actor, ctx.tiles, !self.shelled);
        }

        if self.shelled {
            actor.body.traction = 0.0;
            actor.body.walking = false;
            actor.body.terminal_velocity.x = SHELL_TERMINAL_X;
            actor.body.velocity.x = actor.locomotion.move_direction.sign() * SHELL_SPEED;
        }
    }

    fn process_animation(
        &mut self,
        actor: &mut ActorMut<'_>,
        ctx: &mut TickContext<'_>,
        horizontal_ok: bool,
        vertical_ok: bool,
    ) {
        if actor.status.dead {
            actor.animation.set_state("wingedright");
        } else if self.shelled {
            actor.animation.set_state("shell");
        } else {
            physics::default_animation(actor, ctx.tiles, ctx.config, horizontal_ok, vertical_ok);
        }
    }
}

fn animations() -> AnimationMachine {
    let mut machine = AnimationMachine::new();
    super::register_facing(
        &mut machine,
        "koopa",
        "walk",
        IVec2::ZERO,
        IVec2::X,
        8,
        StateConfig::default(),
    );
    super::register_facing(
        &mut machine,
        "koopa",
        "idle",
        IVec2::new(7, 0),
        IVec2::ZERO,
        1,
        StateConfig::default(),
    );
    super::register_facing(
        &mut machine,
        "koopa_winged",
        "winged",
        IVec2::ZERO,
        IVec2::X,
        5,
        StateConfig::default(),
    );
    machine.register(
        "shell",
        "koopa_shell",
        IVec2::ZERO,
        IVec2::X,
        super::FRAME_SIZE,
        4,
        StateConfig::default(),
    );
    machine
}

/// Reaction of a koopa to the player's feet.
pub(crate) fn stomped(world: &mut World, entity: Entity) {
    let Ok(mut target) = world.get_entity_mut(entity) else {
        return;
    };
    let shelled = target
        .get::<ActorKind>()
        .and_then(ActorKind::as_koopa)
        .is_some_and(|koopa| koopa.shelled);

    if shelled {
        if let Some(mut locomotion) = target.get_mut::<Locomotion>() {
            let next = if locomotion.move_direction == HorizontalDirection::None {
                HorizontalDirection::Right
            } else {
                HorizontalDirection::None
            };
            locomotion.set_direction(next);
        }
    } else if let Some(mut kind) = target.get_mut::<ActorKind>()
        && let Some(koopa) = kind.as_koopa_mut()
    {
        koopa.shelled = true;
        debug!("{entity:?} retreated into its shell");
    }
}

/// A shell kills the other koopas it runs into.
fn shell_hit(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    let is_shell = world
        .get::<ActorKind>(me.owner)
        .and_then(ActorKind::as_koopa)
        .is_some_and(|koopa| koopa.shelled);
    let other_is_koopa = world
        .get::<ActorKind>(other.owner)
        .is_some_and(|kind| kind.as_koopa().is_some());
    if !is_shell || !other_is_koopa {
        return;
    }

    let Some(mut status) = world.get_mut::<ActorStatus>(other.owner) else {
        return;
    };
    if status.dead {
        return;
    }
    status.dead = true;
    emit(world, GameplayEvent::Sound(sounds::ENEMY_DIE));
    emit(world, GameplayEvent::Score(SHELL_KILL_SCORE));
}
