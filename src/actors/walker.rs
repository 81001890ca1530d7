//! Patrol enemy that hops every few seconds.

use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};

use super::{ActorBehavior, ActorBundle, ActorKind, ActorMut, TickContext};
use crate::components::actorstatus::ActorStatus;
use crate::components::animation::{AnimationMachine, StateConfig};
use crate::components::boxcollider::{CollisionBox, CollisionBoxes};
use crate::components::locomotion::{HorizontalDirection, Locomotion};
use crate::components::mapposition::MapPosition;
use crate::events::gameplay::{GameplayEvent, emit, sounds};
use crate::physics;
use crate::resources::gameconfig::GameConfig;

pub const BODY_BOX: &str = "body";

/// Seconds of simulation time between hops.
pub const JUMP_INTERVAL: f32 = 5.0;
const JUMP_IMPULSE: f32 = 150.0;

#[derive(Debug, Clone, Default)]
pub struct Walker;

impl Walker {
    pub fn bundle(position: Vec2, config: &GameConfig) -> ActorBundle {
        let mut body = super::enemy_body(config);
        body.jump_strength = JUMP_IMPULSE;

        let boxes: CollisionBoxes =
            std::iter::once(CollisionBox::new(BODY_BOX, IVec2::ZERO, IVec2::new(50, 50))).collect();

        let mut machine = AnimationMachine::new();
        let still = IVec2::ZERO;
        let plain = StateConfig::default;
        super::register_facing(&mut machine, "walker", "idle", IVec2::ZERO, still, 1, plain());
        super::register_facing(&mut machine, "walker", "walk", IVec2::ZERO, IVec2::X, 4, plain());
        super::register_facing(&mut machine, "walker", "jump", IVec2::new(0, 1), still, 1, plain());
        machine.register(
            "dead",
            "walker",
            IVec2::new(1, 1),
            IVec2::ZERO,
            super::FRAME_SIZE,
            1,
            StateConfig::default().once(),
        );
        machine.set_state("idleleft");

        ActorBundle {
            position: MapPosition::from_vec(position),
            body,
            locomotion: Locomotion::facing(HorizontalDirection::Left),
            status: ActorStatus::default(),
            boxes,
            animation: machine,
            kind: ActorKind::Walker(Walker),
        }
    }
}

impl ActorBehavior for Walker {
    fn advance(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        physics::step(self, actor, ctx);

        if actor.status.dead {
            super::float_away(actor, ctx.dt);
            return;
        }

        let locomotion = &actor.locomotion;
        if locomotion.sim_time - locomotion.last_jump_time >= JUMP_INTERVAL && !locomotion.jumping {
            physics::try_jump(actor, ctx.tiles, ctx.config);
        }
        super::patrol(actor, ctx.tiles, true);
    }

    fn process_animation(
        &mut self,
        actor: &mut ActorMut<'_>,
        ctx: &mut TickContext<'_>,
        horizontal_ok: bool,
        vertical_ok: bool,
    ) {
        if actor.status.dead {
            actor.animation.set_state("dead");
        } else {
            physics::default_animation(actor, ctx.tiles, ctx.config, horizontal_ok, vertical_ok);
        }
    }
}

/// Stomped by the player.
pub(crate) fn kill(world: &mut World, entity: Entity) {
    let Some(mut status) = world.get_mut::<ActorStatus>(entity) else {
        return;
    };
    if status.dead {
        return;
    }
    status.dead = true;
    emit(world, GameplayEvent::Sound(sounds::ENEMY_DIE));
}
