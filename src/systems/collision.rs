//! Composite collision pass.
//!
//! [`detect_and_dispatch`] is an exclusive system: responders receive the
//! whole [`World`] so they can reach both actors of a hit. Every unordered
//! pair of enabled actors is visited once, in entity order. For each pair,
//! every box of the first actor is tested against every box of the second
//! one. On a hit the first box's responder runs, then the second box's, then
//! a [`CollisionEvent`] is triggered.
//!
//! Responders may change anything: positions, flags, box lists. Nothing is
//! snapshotted, so the pass re-reads boxes and positions by index before
//! every test and stops a pair as soon as either actor is disabled.
use bevy_ecs::prelude::*;

use crate::components::actorstatus::ActorStatus;
use crate::components::boxcollider::{BoxRect, CollisionBox, CollisionBoxes};
use crate::components::mapposition::MapPosition;
use crate::events::collision::CollisionEvent;

pub fn detect_and_dispatch(world: &mut World) {
    let mut query = world.query_filtered::<Entity, (With<CollisionBoxes>, With<MapPosition>)>();
    let mut actors: Vec<Entity> = query.iter(world).collect();
    actors.sort();

    for (i, &a) in actors.iter().enumerate() {
        for &b in &actors[i + 1..] {
            dispatch_pair(world, a, b);
        }
    }
}

fn enabled(world: &World, entity: Entity) -> bool {
    world
        .get::<ActorStatus>(entity)
        .is_none_or(|status| status.enabled)
}

fn box_at(world: &World, entity: Entity, index: usize) -> Option<CollisionBox> {
    world
        .get::<CollisionBoxes>(entity)
        .and_then(|boxes| boxes.by_index(index).copied())
}

fn rect_of(world: &World, entity: Entity, collision_box: &CollisionBox) -> Option<BoxRect> {
    world
        .get::<MapPosition>(entity)
        .map(|position| collision_box.world_rect(position.pos))
}

fn dispatch_pair(world: &mut World, a: Entity, b: Entity) {
    let mut i = 0;
    while enabled(world, a) && enabled(world, b) {
        let Some(box_a) = box_at(world, a, i) else {
            break;
        };
        let mut j = 0;
        while enabled(world, a) && enabled(world, b) {
            let Some(box_b) = box_at(world, b, j) else {
                break;
            };
            let rect_a = rect_of(world, a, &box_a);
            let rect_b = rect_of(world, b, &box_b);
            let (Some(rect_a), Some(rect_b)) = (rect_a, rect_b) else {
                return;
            };
            if rect_a.intersects(&rect_b) {
                let info_a = box_a.info(a);
                let info_b = box_b.info(b);
                if let Some(responder) = box_a.responder {
                    responder(world, &info_a, &info_b);
                }
                if let Some(responder) = box_b.responder {
                    responder(world, &info_b, &info_a);
                }
                world.trigger(CollisionEvent {
                    a,
                    b,
                    a_box: box_a.name,
                    b_box: box_b.name,
                });
            }
            j += 1;
        }
        i += 1;
    }
}
