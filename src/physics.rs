//! Kinematic tile-collision resolver.
//!
//! [`step`] moves one actor through the [`TileWorld`] for one tick. The order
//! of the phases is fixed:
//!
//! 1. movement intent adds a grounded or airborne acceleration,
//! 2. traction and the walking cap apply while grounded,
//! 3. both axes are clamped to terminal velocity,
//! 4. the vertical move is integrated and rolled back on a solid tile,
//! 5. the horizontal move is integrated against a three-point leading-edge
//!    probe and rolled back on a solid tile,
//! 6. the tile slightly beneath the actor is reported if solid,
//! 7. landing clears the jumping flag,
//! 8. the actor's behavior picks an animation state from the outcome.
//!
//! Every probe is a solidity lookup; out-of-range lookups are solid, so an
//! actor can never integrate past the edge of the world.

use glam::{IVec2, Vec2};
use log::trace;

use crate::actors::{ActorBehavior, ActorMut, TickContext};
use crate::components::locomotion::HorizontalDirection;
use crate::components::rigidbody::RigidBody;
use crate::resources::gameconfig::GameConfig;
use crate::resources::tileworld::{TileDescriptor, TileWorld};

/// Whether each axis moved without hitting a solid tile this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub horizontal_ok: bool,
    pub vertical_ok: bool,
}

/// Half extents, using integer halves like the rectangle the sprite is drawn in.
pub fn half_size(size: IVec2) -> Vec2 {
    (size / 2).as_vec2()
}

pub fn center(pos: Vec2, size: IVec2) -> Vec2 {
    pos + half_size(size)
}

pub fn top_edge(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(half_size(size).x, 0.0)
}

pub fn bottom_edge(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(half_size(size).x, size.y as f32)
}

pub fn left_edge(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(0.0, half_size(size).y)
}

pub fn right_edge(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(size.x as f32, half_size(size).y)
}

fn bottom_left(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(0.0, size.y as f32)
}

fn top_right(pos: Vec2, size: IVec2) -> Vec2 {
    pos + Vec2::new(size.x as f32, 0.0)
}

fn bottom_right(pos: Vec2, size: IVec2) -> Vec2 {
    pos + size.as_vec2()
}

/// True iff the tile just beneath the bottom edge is solid.
pub fn is_grounded(tiles: &TileWorld, config: &GameConfig, pos: Vec2, size: IVec2) -> bool {
    let probe = bottom_edge(pos, size) + Vec2::new(0.0, config.ground_probe);
    tiles.tile_at_position(probe).solid
}

/// First solid tile among edge midpoint, top corner and bottom corner, or the
/// bottom corner's tile when none is solid.
fn leading_tile(tiles: &TileWorld, edge: Vec2, top: Vec2, bottom: Vec2) -> &TileDescriptor {
    let [edge_tile, top_tile, bottom_tile] = [edge, top, bottom].map(|p| tiles.tile_at_position(p));
    if edge_tile.solid {
        edge_tile
    } else if top_tile.solid {
        top_tile
    } else {
        bottom_tile
    }
}

pub fn left_tile(tiles: &TileWorld, pos: Vec2, size: IVec2) -> &TileDescriptor {
    leading_tile(tiles, left_edge(pos, size), pos, bottom_left(pos, size))
}

pub fn right_tile(tiles: &TileWorld, pos: Vec2, size: IVec2) -> &TileDescriptor {
    leading_tile(
        tiles,
        right_edge(pos, size),
        top_right(pos, size),
        bottom_right(pos, size),
    )
}

pub fn top_tile(tiles: &TileWorld, pos: Vec2, size: IVec2) -> &TileDescriptor {
    tiles.tile_at_position(top_edge(pos, size))
}

pub fn bottom_tile(tiles: &TileWorld, pos: Vec2, size: IVec2) -> &TileDescriptor {
    tiles.tile_at_position(bottom_edge(pos, size))
}

/// Tile a few pixels below the bottom edge, used for trigger tiles.
pub fn underneath_tile<'a>(
    tiles: &'a TileWorld,
    config: &GameConfig,
    pos: Vec2,
    size: IVec2,
) -> &'a TileDescriptor {
    tiles.tile_at_position(bottom_edge(pos, size) + Vec2::new(0.0, config.underneath_probe))
}

/// Decelerate toward zero without crossing it, drop downward velocity and
/// apply the walking cap.
fn apply_traction(body: &mut RigidBody, dt: f32) {
    let decay = body.traction * dt;
    let mut vx = body.velocity.x;
    if vx > 0.0 {
        vx = (vx - decay).max(0.0);
    } else if vx < 0.0 {
        vx = (vx + decay).min(0.0);
    }
    let vy = body.velocity.y.min(0.0);
    let cap = body.max_walk_speed.abs();
    body.velocity = Vec2::new(vx.clamp(-cap, cap), vy);
}

/// Resolve one tick of movement for `actor`.
///
/// Dead actors skip movement and only get an animation pass.
pub fn step<B: ActorBehavior + ?Sized>(
    behavior: &mut B,
    actor: &mut ActorMut<'_>,
    ctx: &mut TickContext<'_>,
) -> StepOutcome {
    if actor.status.dead {
        behavior.process_animation(actor, ctx, false, false);
        return StepOutcome {
            horizontal_ok: false,
            vertical_ok: false,
        };
    }

    let tiles = ctx.tiles;
    let config = ctx.config;
    let dt = ctx.dt;
    actor.locomotion.sim_time += dt;

    let grounded = actor.grounded(tiles, config);

    if actor.body.can_move {
        let sign = actor.locomotion.move_direction.sign();
        if sign != 0.0 {
            let rate = if grounded {
                actor.body.move_speed
            } else {
                actor.body.air_move_speed
            };
            actor.body.velocity.x += sign * rate;
        }
    }

    if grounded && actor.body.walking {
        apply_traction(actor.body, dt);
    }

    actor.body.clamp_to_terminal();

    let mut vertical_ok = true;
    let before = actor.position.pos;
    let vy = actor.body.velocity.y;
    if vy > 0.0 && !grounded {
        actor.position.pos.y += vy * dt;
        let tile = bottom_tile(tiles, actor.position.pos, actor.body.size);
        if tile.solid {
            behavior.impacted_tile(actor, tile, ctx);
            actor.position.pos = before;
            actor.body.velocity.y = 0.0;
        }
    } else if vy < 0.0 {
        actor.position.pos.y += vy * dt;
        let tile = top_tile(tiles, actor.position.pos, actor.body.size);
        if tile.solid {
            behavior.impacted_tile(actor, tile, ctx);
            actor.position.pos = before;
            actor.body.velocity.y = 0.0;
            vertical_ok = false;
        }
    }

    let mut horizontal_ok = true;
    let before = actor.position.pos;
    let vx = actor.body.velocity.x;
    if vx != 0.0 {
        actor.position.pos.x += vx * dt;
        let tile = if vx < 0.0 {
            left_tile(tiles, actor.position.pos, actor.body.size)
        } else {
            right_tile(tiles, actor.position.pos, actor.body.size)
        };
        if tile.solid {
            behavior.impacted_tile(actor, tile, ctx);
            actor.position.pos = before;
            actor.body.velocity.x = 0.0;
            horizontal_ok = false;
        }
    }

    let tile = underneath_tile(tiles, config, actor.position.pos, actor.body.size);
    if tile.solid {
        behavior.impacted_tile(actor, tile, ctx);
    }

    if actor.grounded(tiles, config) {
        actor.locomotion.jumping = false;
    }

    trace!(
        "{:?} stepped to {:?} v={:?} h_ok={} v_ok={}",
        actor.entity, actor.position.pos, actor.body.velocity, horizontal_ok, vertical_ok
    );

    behavior.process_animation(actor, ctx, horizontal_ok, vertical_ok);

    StepOutcome {
        horizontal_ok,
        vertical_ok,
    }
}

/// Apply the body's enabled forces to an airborne, live, unfrozen actor.
pub fn apply_forces(actor: &mut ActorMut<'_>, tiles: &TileWorld, config: &GameConfig, dt: f32) {
    if actor.status.dead || actor.body.frozen || actor.grounded(tiles, config) {
        return;
    }
    actor.body.velocity += actor.body.total_acceleration() * dt;
}

/// Start a jump if grounded and not already jumping.
pub fn try_jump(actor: &mut ActorMut<'_>, tiles: &TileWorld, config: &GameConfig) -> bool {
    if !actor.grounded(tiles, config) || actor.locomotion.jumping {
        return false;
    }
    actor.body.velocity.y -= actor.body.jump_strength;
    actor.locomotion.start_jump();
    true
}

/// `prefix` joined with the direction suffix, e.g. `walkleft`.
pub fn directional(prefix: &str, direction: HorizontalDirection) -> String {
    format!("{prefix}{}", direction.suffix())
}

/// Locomotion animation shared by all kinds: jump or fall while airborne,
/// walk, push, slide or idle on the ground.
pub fn default_animation(
    actor: &mut ActorMut<'_>,
    tiles: &TileWorld,
    config: &GameConfig,
    horizontal_ok: bool,
    _vertical_ok: bool,
) {
    let facing = actor.locomotion.last_move_direction;
    let velocity = actor.body.velocity;

    if !actor.grounded(tiles, config) {
        if velocity.y < 0.0 {
            actor.animation.set_state(&directional("jump", facing));
        } else if !actor.animation.is_in_any(&["fallleft", "fallright"]) {
            actor
                .animation
                .set_state(&format!("fall{}transition", facing.suffix()));
        }
        return;
    }

    let moving = actor.locomotion.move_direction;
    match moving {
        HorizontalDirection::Left | HorizontalDirection::Right => {
            let prefix = if horizontal_ok { "walk" } else { "push" };
            actor.animation.set_state(&directional(prefix, moving));
        }
        HorizontalDirection::None => {
            if velocity.x == 0.0 {
                actor.animation.set_state(&directional("idle", facing));
            } else if velocity.x > 0.0 {
                actor.animation.set_state("slideright");
            } else {
                actor.animation.set_state("slideleft");
            }
        }
    }
}
