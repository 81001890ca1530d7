//! Player-controlled actor.
//!
//! The player walks, jumps with one flutter per airborne excursion, crouches
//! (which also triggers level-advance tiles) and attacks with an extending
//! tongue. The tongue grows one segment per loop of the `attack*` state and
//! shrinks one per loop of the locked `endattack*` state; both loops report
//! back through animation cues. A shelled enemy caught by the tongue is
//! carried to its tip and swallowed once the tongue is fully retracted.
//!
//! Collision boxes:
//!
//! | box      | offset  | size    | on contact                        |
//! |----------|---------|---------|-----------------------------------|
//! | `body`   | (0, 0)  | 50 × 40 | the player dies                   |
//! | `feet`   | (3, 40) | 45 × 10 | stomp while falling               |
//! | `tongue` | dynamic | dynamic | capture a shelled enemy           |

use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};
use log::debug;

use super::{ActorBehavior, ActorBundle, ActorKind, ActorMut, TickContext, koopa, walker};
use crate::components::actorstatus::ActorStatus;
use crate::components::animation::{AnimationMachine, StateConfig, chain_listener, cue_listener};
use crate::components::boxcollider::{CollisionBox, CollisionBoxes};
use crate::components::collision::BoxInfo;
use crate::components::locomotion::{HorizontalDirection, Locomotion};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::gameplay::{GameplayEvent, emit, sounds};
use crate::physics::{self, directional};
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::InputState;
use crate::resources::tileworld::{SpecialFunction, TileDescriptor};

const SHEET: &str = "player";

pub const BODY_BOX: &str = "body";
pub const FEET_BOX: &str = "feet";
pub const TONGUE_BOX: &str = "tongue";

/// Size of one tongue segment in pixels.
pub const TONGUE_SEGMENT: IVec2 = IVec2::new(16, 8);
pub const MAX_TONGUE_SEGMENTS: u32 = 5;

/// Vertical velocity set by a stomp.
const STOMP_BOUNCE: f32 = -200.0;
/// Largest horizontal speed at which the tongue can be used.
const ATTACK_MAX_SPEED: f32 = 2.0;
const SWALLOW_SCORE: i64 = 200;
const STOMP_SCORE: i64 = 100;

pub const CUE_TONGUE_EXTEND: &str = "tongue_extend";
pub const CUE_TONGUE_RETRACT: &str = "tongue_retract";
pub const CUE_PUSH: &str = "push";
pub const CUE_SMASH: &str = "smash";

/// Player-specific state, carried in [`ActorKind::Player`].
#[derive(Debug, Clone, Default)]
pub struct Player {
    /// Set by the flutter; clears on landing.
    pub fluttering: bool,
    pub crouching: bool,
    pub attacking: bool,
    pub tongue_segments: u32,
    /// Enemy held by the tongue.
    pub captured: Option<Entity>,
    /// World position of the tongue tip.
    pub tongue_tip: Vec2,
    pub flutter_strength: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            flutter_strength: config.flutter_strength,
            ..Self::default()
        }
    }

    /// Everything needed to spawn a player with its top-left corner at `position`.
    pub fn bundle(position: Vec2, config: &GameConfig) -> ActorBundle {
        let mut body = RigidBody::new();
        body.jump_strength = config.jump_strength;
        body.max_walk_speed = config.max_walk_speed;
        body.traction = config.traction;
        body.move_speed = config.move_speed;
        body.add_force("gravity", Vec2::new(0.0, config.gravity));

        let boxes: CollisionBoxes = [
            CollisionBox::new(BODY_BOX, IVec2::ZERO, IVec2::new(50, 40)).with_responder(body_hit),
            CollisionBox::new(FEET_BOX, IVec2::new(3, 40), IVec2::new(45, 10))
                .with_responder(feet_hit),
        ]
        .into_iter()
        .collect();

        let mut animation = animations();
        animation.set_state("idleleft");

        ActorBundle {
            position: MapPosition::from_vec(position),
            body,
            locomotion: Locomotion::default(),
            status: ActorStatus::default(),
            boxes,
            animation,
            kind: ActorKind::Player(Player::new(config)),
        }
    }

    /// Turn this tick's controls into intent. Does nothing once dead.
    pub fn apply_input(
        &mut self,
        actor: &mut ActorMut<'_>,
        input: &InputState,
        ctx: &mut TickContext<'_>,
    ) {
        if actor.status.dead {
            return;
        }

        if input.crouch.just_pressed || input.crouch.just_released {
            self.crouch(actor, input.crouch.active, ctx);
        }

        if !self.crouching {
            let direction = match (input.left.active, input.right.active) {
                (true, false) => HorizontalDirection::Left,
                (false, true) => HorizontalDirection::Right,
                _ => HorizontalDirection::None,
            };
            self.walk(actor, direction);
        }

        if input.jump.just_pressed {
            self.jump(actor, ctx);
        }

        // A held button starts a new tongue as soon as the last one is back.
        if input.attack.active != self.attacking {
            self.attack(actor, input.attack.active, ctx);
        }
    }

    /// Request a walking direction. Ignored while sliding to a stop.
    pub fn walk(&mut self, actor: &mut ActorMut<'_>, direction: HorizontalDirection) {
        if actor.status.dead || actor.animation.is_in_any(&["slideleft", "slideright"]) {
            return;
        }
        actor.locomotion.set_direction(direction);
    }

    /// Jump from the ground, or flutter once while falling from a jump.
    pub fn jump(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) -> bool {
        if actor.status.dead {
            return false;
        }
        let (tiles, config) = (ctx.tiles, ctx.config);
        if physics::try_jump(actor, tiles, config) {
            self.fluttering = false;
            ctx.sound(sounds::JUMP);
            true
        } else if actor.falling(tiles, config) && actor.locomotion.jumping && !self.fluttering {
            actor.body.velocity.y -= self.flutter_strength;
            self.fluttering = true;
            actor.locomotion.start_jump();
            ctx.sound(sounds::FLUTTER);
            true
        } else {
            false
        }
    }

    /// Crouch only works on the ground. Crouching on a level-advance tile
    /// requests the next level.
    pub fn crouch(&mut self, actor: &mut ActorMut<'_>, pressed: bool, ctx: &mut TickContext<'_>) {
        if actor.status.dead {
            return;
        }
        let (tiles, config) = (ctx.tiles, ctx.config);
        self.crouching = pressed && actor.grounded(tiles, config);
        actor.body.can_move = !self.crouching;

        if self.crouching {
            let under = physics::underneath_tile(tiles, config, actor.pos(), actor.size());
            if under.special == SpecialFunction::AdvanceLevel {
                debug!("{:?} crouched on a level exit", actor.entity);
                ctx.emit(GameplayEvent::LevelAdvance);
            }
        }
        actor.locomotion.set_direction(HorizontalDirection::None);
    }

    /// Start the tongue on press, start retracting it on release.
    pub fn attack(&mut self, actor: &mut ActorMut<'_>, pressed: bool, ctx: &mut TickContext<'_>) {
        let facing = actor.locomotion.last_move_direction;
        if pressed {
            if self.attacking
                || !actor.grounded(ctx.tiles, ctx.config)
                || actor.body.velocity.x.abs() > ATTACK_MAX_SPEED
            {
                return;
            }
            if !actor.animation.set_state(&directional("attack", facing)) {
                return;
            }
            self.attacking = true;
            self.tongue_segments = 0;
            let tongue = CollisionBox::new(TONGUE_BOX, IVec2::ZERO, TONGUE_SEGMENT);
            actor.boxes.add(tongue.with_responder(tongue_hit));
            self.update_tongue(actor);
            ctx.sound(sounds::TONGUE);
        } else if self.attacking {
            actor.animation.set_state(&directional("endattack", facing));
        }
    }

    /// Place the tongue tip and resize the tongue box for the current length.
    fn update_tongue(&mut self, actor: &mut ActorMut<'_>) {
        let size = actor.size();
        let half_height = size.y / 2;
        let segments = self.tongue_segments as i32;
        let length = TONGUE_SEGMENT.x * (segments + 1);

        let (start, offset, sign) = match actor.locomotion.last_move_direction {
            HorizontalDirection::Right => (
                physics::right_edge(actor.pos(), size),
                IVec2::new(size.x, half_height),
                1.0,
            ),
            HorizontalDirection::Left | HorizontalDirection::None => (
                physics::left_edge(actor.pos(), size),
                IVec2::new(-length, half_height),
                -1.0,
            ),
        };
        self.tongue_tip = start + Vec2::new(sign * (segments * TONGUE_SEGMENT.x) as f32, 0.0);

        if let Some(tongue) = actor.boxes.get_mut(TONGUE_BOX) {
            tongue.offset = offset;
            tongue.size = IVec2::new(length, TONGUE_SEGMENT.y);
        }
    }

    fn extend_tongue(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        if self.tongue_segments >= MAX_TONGUE_SEGMENTS
            || ctx.tiles.tile_at_position(self.tongue_tip).solid
        {
            let facing = actor.locomotion.last_move_direction;
            actor.animation.set_state(&directional("endattack", facing));
            return;
        }
        actor.body.can_move = false;
        self.tongue_segments += 1;
        self.update_tongue(actor);
    }

    fn retract_tongue(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        if self.tongue_segments > 0 {
            if let Some(entity) = self.captured {
                ctx.emit(GameplayEvent::CarryActor {
                    entity,
                    center: self.tongue_tip,
                });
            }
            self.tongue_segments -= 1;
            self.update_tongue(actor);
            return;
        }

        actor.boxes.remove(TONGUE_BOX);
        actor.body.can_move = true;
        self.attacking = false;
        // endattack is locked and looping; leave it so the next attack can start.
        let facing = actor.locomotion.last_move_direction;
        actor.animation.clear_state();
        actor.animation.set_state(&directional("idle", facing));
        if let Some(entity) = self.captured.take() {
            ctx.emit(GameplayEvent::Swallow { entity });
            ctx.emit(GameplayEvent::Score(SWALLOW_SCORE));
            ctx.sound(sounds::ENEMY_DIE);
        }
    }

    fn kill(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        if actor.status.dead {
            return;
        }
        actor.status.dead = true;
        ctx.emit(GameplayEvent::PlayerDied {
            entity: actor.entity,
        });
    }
}

impl ActorBehavior for Player {
    fn advance(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        physics::step(self, actor, ctx);

        if self.attacking {
            self.update_tongue(actor);
        }
        if actor.grounded(ctx.tiles, ctx.config) {
            self.fluttering = false;
        }

        let tiles = ctx.tiles;
        let fall_limit = tiles.tile_size().y as f32
            * (tiles.size().y - 1 + ctx.config.fall_limit_tiles as i32) as f32;
        if actor.pos().y >= fall_limit {
            debug!("{:?} fell out of the world", actor.entity);
            self.kill(actor, ctx);
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
            actor.animation.set_state("death");
            return;
        }
        if self.attacking {
            return;
        }

        let facing = actor.locomotion.last_move_direction;
        if !actor.grounded(ctx.tiles, ctx.config) {
            if actor.body.velocity.y < 0.0 && vertical_ok {
                let prefix = if self.fluttering { "flutter" } else { "jump" };
                actor.animation.set_state(&directional(prefix, facing));
            } else if !vertical_ok {
                actor.animation.set_state(&directional("smash", facing));
            }
        } else if self.crouching {
            actor.animation.set_state(&directional("crouch", facing));
            return;
        }

        physics::default_animation(actor, ctx.tiles, ctx.config, horizontal_ok, vertical_ok);
    }

    fn impacted_tile(
        &mut self,
        actor: &mut ActorMut<'_>,
        tile: &TileDescriptor,
        ctx: &mut TickContext<'_>,
    ) {
        if tile.lethal {
            self.kill(actor, ctx);
        }
    }

    fn animation_cue(
        &mut self,
        actor: &mut ActorMut<'_>,
        cue: &'static str,
        ctx: &mut TickContext<'_>,
    ) {
        match cue {
            CUE_TONGUE_EXTEND => self.extend_tongue(actor, ctx),
            CUE_TONGUE_RETRACT => self.retract_tongue(actor, ctx),
            CUE_PUSH => ctx.sound(sounds::PUSH),
            CUE_SMASH => ctx.sound(sounds::CEILING),
            _ => {}
        }
    }
}

fn animations() -> AnimationMachine {
    let mut machine = AnimationMachine::new();
    let still = IVec2::ZERO;
    let across = IVec2::X;
    let plain = StateConfig::default;

    super::register_facing(&mut machine, SHEET, "idle", IVec2::new(3, 0), still, 1, plain());
    super::register_facing(
        &mut machine,
        SHEET,
        "walk",
        IVec2::new(0, 3),
        across,
        2,
        StateConfig::default().millis(70),
    );
    super::register_facing(&mut machine, SHEET, "slide", IVec2::new(1, 0), still, 1, plain());
    super::register_facing(
        &mut machine,
        SHEET,
        "push",
        IVec2::new(0, 1),
        across,
        3,
        StateConfig::default().on_start(cue_listener(CUE_PUSH)),
    );
    super::register_facing(&mut machine, SHEET, "jump", IVec2::new(2, 0), still, 1, plain());
    super::register_facing(&mut machine, SHEET, "crouch", IVec2::new(6, 0), across, 1, plain());
    super::register_facing(
        &mut machine,
        SHEET,
        "attack",
        IVec2::new(4, 1),
        still,
        1,
        StateConfig::default()
            .millis(25)
            .on_end(cue_listener(CUE_TONGUE_EXTEND)),
    );
    super::register_facing(
        &mut machine,
        SHEET,
        "endattack",
        IVec2::new(4, 1),
        still,
        1,
        StateConfig::default()
            .millis(25)
            .locked()
            .incompatible_with("attackleft")
            .incompatible_with("attackright")
            .on_end(cue_listener(CUE_TONGUE_RETRACT)),
    );
    super::register_facing(&mut machine, SHEET, "fall", IVec2::new(4, 0), across, 1, plain());
    machine.register(
        "falllefttransition",
        SHEET,
        IVec2::new(5, 0),
        still,
        super::FRAME_SIZE,
        1,
        StateConfig::default()
            .millis(1200)
            .mirrored()
            .on_end(chain_listener("fallleft")),
    );
    machine.register(
        "fallrighttransition",
        SHEET,
        IVec2::new(5, 0),
        still,
        super::FRAME_SIZE,
        1,
        StateConfig::default()
            .millis(1200)
            .on_end(chain_listener("fallright")),
    );
    super::register_facing(
        &mut machine,
        SHEET,
        "flutter",
        IVec2::new(0, 2),
        across,
        2,
        StateConfig::default()
            .millis(100)
            .incompatible_with("jumpleft")
            .incompatible_with("jumpright"),
    );
    machine.register(
        "death",
        SHEET,
        IVec2::new(0, 4),
        across,
        super::FRAME_SIZE,
        5,
        StateConfig::default().millis(200).once(),
    );
    super::register_facing(
        &mut machine,
        SHEET,
        "smash",
        IVec2::ZERO,
        across,
        1,
        StateConfig::default()
            .millis(350)
            .once()
            .locked()
            .on_start(cue_listener(CUE_SMASH)),
    );
    machine
}

/// Any live actor touching the player's body kills it.
fn body_hit(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    if world.get::<ActorStatus>(other.owner).is_some_and(|s| s.dead) {
        return;
    }
    kill_player(world, me.owner);
}

pub(crate) fn kill_player(world: &mut World, entity: Entity) {
    let Some(mut status) = world.get_mut::<ActorStatus>(entity) else {
        return;
    };
    if status.dead {
        return;
    }
    status.dead = true;
    emit(world, GameplayEvent::PlayerDied { entity });
}

/// Landing on an enemy bounces the player and hurts the enemy.
fn feet_hit(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    let player_dead = world.get::<ActorStatus>(me.owner).is_none_or(|s| s.dead);
    let descending = world
        .get::<RigidBody>(me.owner)
        .is_some_and(|body| body.velocity.y > 0.0);
    let victim_live = world
        .get::<ActorStatus>(other.owner)
        .is_some_and(|s| s.enabled && !s.dead);
    if player_dead || !descending || !victim_live {
        return;
    }

    let Ok(mut player) = world.get_entity_mut(me.owner) else {
        return;
    };
    if let Some(mut body) = player.get_mut::<RigidBody>() {
        body.velocity.y = STOMP_BOUNCE;
    }
    if let Some(mut locomotion) = player.get_mut::<Locomotion>() {
        locomotion.jumping = false;
    }
    if let Some(mut kind) = player.get_mut::<ActorKind>()
        && let Some(state) = kind.as_player_mut()
    {
        state.fluttering = false;
    }
    emit(world, GameplayEvent::Sound(sounds::STOMP));

    let victim = world.get::<ActorKind>(other.owner).map(|kind| {
        (kind.as_koopa().is_some(), matches!(kind, ActorKind::Walker(_)))
    });
    match victim {
        Some((true, _)) => koopa::stomped(world, other.owner),
        Some((_, true)) => {
            walker::kill(world, other.owner);
            emit(world, GameplayEvent::Score(STOMP_SCORE));
        }
        _ => {}
    }
}

/// The tongue catches shelled enemies; the retraction starts at once.
fn tongue_hit(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    let catchable = world
        .get::<ActorKind>(other.owner)
        .is_some_and(|kind| kind.as_koopa().is_some())
        && world
            .get::<ActorStatus>(other.owner)
            .is_some_and(|s| s.enabled && !s.dead);
    if !catchable {
        return;
    }

    let Ok(mut player) = world.get_entity_mut(me.owner) else {
        return;
    };
    let facing = player
        .get::<Locomotion>()
        .map(|l| l.last_move_direction)
        .unwrap_or_default();
    {
        let Some(mut kind) = player.get_mut::<ActorKind>() else {
            return;
        };
        let Some(state) = kind.as_player_mut() else {
            return;
        };
        if state.captured.is_some() {
            return;
        }
        state.captured = Some(other.owner);
    }
    if let Some(mut animation) = player.get_mut::<AnimationMachine>() {
        animation.set_state(&directional("endattack", facing));
    }

    if let Ok(mut enemy) = world.get_entity_mut(other.owner) {
        if let Some(mut status) = enemy.get_mut::<ActorStatus>() {
            status.enabled = false;
        }
        if let Some(mut body) = enemy.get_mut::<RigidBody>() {
            body.freeze();
        }
    }
    debug!("{:?} caught {:?}", me.owner, other.owner);
}
