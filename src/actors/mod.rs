//! Actor kinds and the behavior interface the resolver drives.
//!
//! An actor is an entity carrying the components bundled in [`ActorBundle`].
//! Kind-specific policy (movement decisions, reactions to tiles, animation
//! selection, listener cues) lives behind [`ActorBehavior`]; [`ActorKind`]
//! is the component that selects the implementation by variant.
//!
//! Behaviors work on an [`ActorMut`] view of the actor's components and a
//! [`TickContext`] holding the read-only world data of the tick. Anything
//! that touches another actor or the session is raised as a
//! [`GameplayEvent`] on the context.

pub mod koopa;
pub mod player;
pub mod walker;

use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};

use crate::components::actorstatus::ActorStatus;
use crate::components::animation::{AnimationMachine, StateConfig};
use crate::components::boxcollider::CollisionBoxes;
use crate::components::locomotion::{HorizontalDirection, Locomotion};
use crate::components::mapposition::MapPosition;
use crate::components::rigidbody::RigidBody;
use crate::events::gameplay::GameplayEvent;
use crate::physics;
use crate::resources::gameconfig::GameConfig;
use crate::resources::tileworld::{TileDescriptor, TileWorld};

pub use koopa::Koopa;
pub use player::Player;
pub use walker::Walker;

/// Components every actor is spawned with.
#[derive(Bundle)]
pub struct ActorBundle {
    pub position: MapPosition,
    pub body: RigidBody,
    pub locomotion: Locomotion,
    pub status: ActorStatus,
    pub boxes: CollisionBoxes,
    pub animation: AnimationMachine,
    pub kind: ActorKind,
}

/// Query data matching [`ActorBundle`], in the order [`ActorMut::split`] expects.
pub type ActorQuery = (
    Entity,
    &'static mut MapPosition,
    &'static mut RigidBody,
    &'static mut Locomotion,
    &'static mut ActorStatus,
    &'static mut AnimationMachine,
    &'static mut CollisionBoxes,
    &'static mut ActorKind,
);

/// Mutable view of one actor's components, minus its kind.
pub struct ActorMut<'a> {
    pub entity: Entity,
    pub position: &'a mut MapPosition,
    pub body: &'a mut RigidBody,
    pub locomotion: &'a mut Locomotion,
    pub status: &'a mut ActorStatus,
    pub animation: &'a mut AnimationMachine,
    pub boxes: &'a mut CollisionBoxes,
}

impl<'a> ActorMut<'a> {
    /// Split a query item into the component view and the kind.
    #[allow(clippy::type_complexity)]
    pub fn split(
        item: (
            Entity,
            Mut<'a, MapPosition>,
            Mut<'a, RigidBody>,
            Mut<'a, Locomotion>,
            Mut<'a, ActorStatus>,
            Mut<'a, AnimationMachine>,
            Mut<'a, CollisionBoxes>,
            Mut<'a, ActorKind>,
        ),
    ) -> (ActorMut<'a>, &'a mut ActorKind) {
        let (entity, position, body, locomotion, status, animation, boxes, kind) = item;
        (
            ActorMut {
                entity,
                position: position.into_inner(),
                body: body.into_inner(),
                locomotion: locomotion.into_inner(),
                status: status.into_inner(),
                animation: animation.into_inner(),
                boxes: boxes.into_inner(),
            },
            kind.into_inner(),
        )
    }

    pub fn pos(&self) -> Vec2 {
        self.position.pos
    }

    pub fn size(&self) -> IVec2 {
        self.body.size
    }

    pub fn center(&self) -> Vec2 {
        physics::center(self.position.pos, self.body.size)
    }

    /// Place the actor so its center is at `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.position.pos = center - physics::half_size(self.body.size);
    }

    pub fn grounded(&self, tiles: &TileWorld, config: &GameConfig) -> bool {
        physics::is_grounded(tiles, config, self.position.pos, self.body.size)
    }

    /// Moving down and not standing on anything.
    pub fn falling(&self, tiles: &TileWorld, config: &GameConfig) -> bool {
        self.body.velocity.y > 0.0 && !self.grounded(tiles, config)
    }

    /// Grid cell under the actor's center.
    pub fn tile_coordinates(&self, tiles: &TileWorld) -> IVec2 {
        tiles.world_to_grid(self.center())
    }
}

/// Read-only world data for one tick plus the events raised during it.
pub struct TickContext<'a> {
    pub tiles: &'a TileWorld,
    pub config: &'a GameConfig,
    /// Tick length in seconds.
    pub dt: f32,
    pub events: Vec<GameplayEvent>,
}

impl<'a> TickContext<'a> {
    pub fn new(tiles: &'a TileWorld, config: &'a GameConfig, dt: f32) -> Self {
        Self {
            tiles,
            config,
            dt,
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameplayEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, name: &'static str) {
        self.events.push(GameplayEvent::Sound(name));
    }
}

/// Per-kind policy hooks. Every method has a default.
pub trait ActorBehavior {
    /// One simulation tick. The default runs the tile resolver.
    fn advance(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        physics::step(self, actor, ctx);
    }

    /// Pick an animation state from the movement outcome of this tick.
    fn process_animation(
        &mut self,
        actor: &mut ActorMut<'_>,
        ctx: &mut TickContext<'_>,
        horizontal_ok: bool,
        vertical_ok: bool,
    ) {
        physics::default_animation(actor, ctx.tiles, ctx.config, horizontal_ok, vertical_ok);
    }

    /// A solid tile stopped a move or lies just beneath the actor.
    fn impacted_tile(
        &mut self,
        _actor: &mut ActorMut<'_>,
        _tile: &TileDescriptor,
        _ctx: &mut TickContext<'_>,
    ) {
    }

    /// A cue raised by one of this actor's animation listeners.
    fn animation_cue(
        &mut self,
        _actor: &mut ActorMut<'_>,
        _cue: &'static str,
        _ctx: &mut TickContext<'_>,
    ) {
    }
}

/// Kind of an actor and its kind-specific state.
#[derive(Component, Debug, Clone)]
pub enum ActorKind {
    Player(Player),
    Walker(Walker),
    Koopa(Koopa),
}

impl ActorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActorKind::Player(_) => "player",
            ActorKind::Walker(_) => "walker",
            ActorKind::Koopa(_) => "koopa",
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            ActorKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            ActorKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_koopa(&self) -> Option<&Koopa> {
        match self {
            ActorKind::Koopa(koopa) => Some(koopa),
            _ => None,
        }
    }

    pub fn as_koopa_mut(&mut self) -> Option<&mut Koopa> {
        match self {
            ActorKind::Koopa(koopa) => Some(koopa),
            _ => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, ActorKind::Player(_))
    }
}

impl ActorBehavior for ActorKind {
    fn advance(&mut self, actor: &mut ActorMut<'_>, ctx: &mut TickContext<'_>) {
        match self {
            ActorKind::Player(player) => player.advance(actor, ctx),
            ActorKind::Walker(walker) => walker.advance(actor, ctx),
            ActorKind::Koopa(koopa) => koopa.advance(actor, ctx),
        }
    }

    fn process_animation(
        &mut self,
        actor: &mut ActorMut<'_>,
        ctx: &mut TickContext<'_>,
        horizontal_ok: bool,
        vertical_ok: bool,
    ) {
        match self {
            ActorKind::Player(player) => {
                player.process_animation(actor, ctx, horizontal_ok, vertical_ok)
            }
            ActorKind::Walker(walker) => {
                walker.process_animation(actor, ctx, horizontal_ok, vertical_ok)
            }
            ActorKind::Koopa(koopa) => {
                koopa.process_animation(actor, ctx, horizontal_ok, vertical_ok)
            }
        }
    }

    fn impacted_tile(
        &mut self,
        actor: &mut ActorMut<'_>,
        tile: &TileDescriptor,
        ctx: &mut TickContext<'_>,
    ) {
        match self {
            ActorKind::Player(player) => player.impacted_tile(actor, tile, ctx),
            ActorKind::Walker(walker) => walker.impacted_tile(actor, tile, ctx),
            ActorKind::Koopa(koopa) => koopa.impacted_tile(actor, tile, ctx),
        }
    }

    fn animation_cue(
        &mut self,
        actor: &mut ActorMut<'_>,
        cue: &'static str,
        ctx: &mut TickContext<'_>,
    ) {
        match self {
            ActorKind::Player(player) => player.animation_cue(actor, cue, ctx),
            ActorKind::Walker(walker) => walker.animation_cue(actor, cue, ctx),
            ActorKind::Koopa(koopa) => koopa.animation_cue(actor, cue, ctx),
        }
    }
}

/// Body tuned for a non-player actor, with world gravity attached.
pub(crate) fn enemy_body(config: &GameConfig) -> RigidBody {
    let mut body = RigidBody::new();
    body.max_walk_speed = 80.0;
    body.add_force("gravity", Vec2::new(0.0, config.gravity));
    body
}

/// Side of one animation frame on every actor sheet.
pub(crate) const FRAME_SIZE: IVec2 = IVec2::new(50, 50);

/// Register `{prefix}left` (mirrored) and `{prefix}right` with the same frames.
pub(crate) fn register_facing(
    machine: &mut AnimationMachine,
    sheet: &str,
    prefix: &str,
    start: IVec2,
    step: IVec2,
    count: u32,
    config: StateConfig,
) {
    machine.register(
        &format!("{prefix}left"),
        sheet,
        start,
        step,
        FRAME_SIZE,
        count,
        config.clone().mirrored(),
    );
    machine.register(
        &format!("{prefix}right"),
        sheet,
        start,
        step,
        FRAME_SIZE,
        count,
        config,
    );
}

/// Turn around in front of a solid cell, and in front of a gap when
/// `avoid_ledges` is set. Cells are taken from the actor's center.
pub(crate) fn patrol(actor: &mut ActorMut<'_>, tiles: &TileWorld, avoid_ledges: bool) {
    let reverse = match actor.locomotion.move_direction {
        HorizontalDirection::Left => HorizontalDirection::Right,
        HorizontalDirection::Right => HorizontalDirection::Left,
        HorizontalDirection::None => return,
    };
    let ahead = actor.tile_coordinates(tiles)
        + IVec2::new(actor.locomotion.move_direction.sign() as i32, 0);
    let blocked = tiles.tile_at(ahead).solid;
    let ledge = avoid_ledges && !tiles.tile_at(ahead + IVec2::Y).solid;
    if blocked || ledge {
        actor.locomotion.set_direction(reverse);
    }
}

/// Dead enemies drop their boxes and drift upward off screen.
pub(crate) fn float_away(actor: &mut ActorMut<'_>, dt: f32) {
    const FLOAT_SPEED: f32 = 130.0;
    actor.boxes.clear();
    actor.position.pos.y -= FLOAT_SPEED * dt;
}
