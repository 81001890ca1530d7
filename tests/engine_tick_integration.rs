//! Engine tick integration tests for the collision pass, actor physics and
//! gameplay event application, each run through its own `Schedule`.

use std::sync::{Arc, Mutex};

use bevy_ecs::message::Messages;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};

use tileplat::actors::{ActorKind, Koopa, Walker};
use tileplat::components::actorstatus::ActorStatus;
use tileplat::components::boxcollider::{CollisionBox, CollisionBoxes};
use tileplat::components::collision::BoxInfo;
use tileplat::components::locomotion::{HorizontalDirection, Locomotion};
use tileplat::components::mapposition::MapPosition;
use tileplat::components::rigidbody::RigidBody;
use tileplat::events::collision::CollisionEvent;
use tileplat::events::gameplay::{GameplayEvent, sounds};
use tileplat::resources::gameconfig::GameConfig;
use tileplat::resources::gamestate::GameSession;
use tileplat::resources::tileworld::{DEFAULT_TILE_SIZE, TilePalette, TileWorld};
use tileplat::resources::worldtime::WorldTime;
use tileplat::systems::collision::detect_and_dispatch;
use tileplat::systems::gameplay::apply_gameplay_events;
use tileplat::systems::movement::actor_physics;
use tileplat::systems::time::update_world_time;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const OPEN_ROOM: [&str; 4] = ["      ", "      ", "      ", "bbbbbb"];

fn make_world(rows: &[&str]) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(GameConfig::new());
    world.insert_resource(GameSession::new());
    world.insert_resource(
        TileWorld::from_rows(rows, &TilePalette::default(), DEFAULT_TILE_SIZE).unwrap(),
    );
    world.init_resource::<Messages<GameplayEvent>>();
    world.init_resource::<Hits>();
    world
}

fn tick_collision(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(detect_and_dispatch);
    schedule.run(world);
}

fn tick_physics(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(actor_physics);
    schedule.run(world);
}

fn tick_gameplay_events(world: &mut World) {
    let mut schedule = Schedule::default();
    schedule.add_systems(apply_gameplay_events);
    schedule.run(world);
}

fn drain_events(world: &mut World) -> Vec<GameplayEvent> {
    world
        .resource_mut::<Messages<GameplayEvent>>()
        .drain()
        .collect()
}

/// Responder calls in the order they happened: (own entity, own box, other entity, other box).
#[derive(Resource, Default)]
struct Hits(Vec<(Entity, &'static str, Entity, &'static str)>);

fn record_hit(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    world
        .resource_mut::<Hits>()
        .0
        .push((me.owner, me.name, other.owner, other.name));
}

fn record_and_strip_other(world: &mut World, me: &BoxInfo, other: &BoxInfo) {
    record_hit(world, me, other);
    if let Some(mut boxes) = world.get_mut::<CollisionBoxes>(other.owner) {
        boxes.clear();
    }
}

fn spawn_boxed(world: &mut World, position: Vec2, boxes: Vec<CollisionBox>) -> Entity {
    world
        .spawn((
            MapPosition::from_vec(position),
            ActorStatus::default(),
            boxes.into_iter().collect::<CollisionBoxes>(),
        ))
        .id()
}

fn square(name: &'static str, size: i32) -> CollisionBox {
    CollisionBox::new(name, IVec2::ZERO, IVec2::splat(size)).with_responder(record_hit)
}

// =============================================================================
// Composite collision pass
// =============================================================================

#[test]
fn collision_overlapping_boxes_fire_both_responders_once() {
    let mut world = make_world(&OPEN_ROOM);
    let a = spawn_boxed(&mut world, Vec2::ZERO, vec![square("a", 10)]);
    let b = spawn_boxed(&mut world, Vec2::new(5.0, 5.0), vec![square("b", 10)]);

    tick_collision(&mut world);

    let hits = &world.resource::<Hits>().0;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0], (a, "a", b, "b"));
    assert_eq!(hits[1], (b, "b", a, "a"));
}

#[test]
fn collision_touching_edges_count_as_hit() {
    let mut world = make_world(&OPEN_ROOM);
    spawn_boxed(&mut world, Vec2::ZERO, vec![square("a", 10)]);
    spawn_boxed(&mut world, Vec2::new(10.0, 0.0), vec![square("b", 10)]);

    tick_collision(&mut world);

    assert_eq!(world.resource::<Hits>().0.len(), 2);
}

#[test]
fn collision_separated_boxes_do_not_fire() {
    let mut world = make_world(&OPEN_ROOM);
    spawn_boxed(&mut world, Vec2::ZERO, vec![square("a", 10)]);
    spawn_boxed(&mut world, Vec2::new(11.0, 0.0), vec![square("b", 10)]);

    tick_collision(&mut world);

    assert!(world.resource::<Hits>().0.is_empty());
}

#[test]
fn collision_box_without_responder_still_triggers_the_other() {
    let mut world = make_world(&OPEN_ROOM);
    let a = spawn_boxed(
        &mut world,
        Vec2::ZERO,
        vec![CollisionBox::new("quiet", IVec2::ZERO, IVec2::splat(10))],
    );
    let b = spawn_boxed(&mut world, Vec2::new(5.0, 0.0), vec![square("b", 10)]);

    tick_collision(&mut world);

    let hits = &world.resource::<Hits>().0;
    assert_eq!(hits.as_slice(), &[(b, "b", a, "quiet")]);
}

#[test]
fn collision_skips_disabled_actors() {
    let mut world = make_world(&OPEN_ROOM);
    spawn_boxed(&mut world, Vec2::ZERO, vec![square("a", 10)]);
    let b = spawn_boxed(&mut world, Vec2::new(5.0, 0.0), vec![square("b", 10)]);
    world.get_mut::<ActorStatus>(b).unwrap().enabled = false;

    tick_collision(&mut world);

    assert!(world.resource::<Hits>().0.is_empty());
}

#[test]
fn collision_responder_changes_are_seen_by_later_boxes() {
    let mut world = make_world(&OPEN_ROOM);
    let a = spawn_boxed(
        &mut world,
        Vec2::ZERO,
        vec![
            CollisionBox::new("first", IVec2::ZERO, IVec2::splat(10))
                .with_responder(record_and_strip_other),
            square("second", 10),
        ],
    );
    let b = spawn_boxed(&mut world, Vec2::new(5.0, 0.0), vec![square("target", 10)]);

    tick_collision(&mut world);

    // "second" never meets "target": the first responder removed it.
    let hits = &world.resource::<Hits>().0;
    assert_eq!(
        hits.as_slice(),
        &[(a, "first", b, "target"), (b, "target", a, "first")]
    );
    assert!(world.get::<CollisionBoxes>(b).unwrap().is_empty());
}

#[test]
fn collision_multiple_boxes_visit_every_pairing() {
    let mut world = make_world(&OPEN_ROOM);
    spawn_boxed(&mut world, Vec2::ZERO, vec![square("a1", 10), square("a2", 10)]);
    spawn_boxed(&mut world, Vec2::new(5.0, 0.0), vec![square("b1", 10), square("b2", 10)]);

    tick_collision(&mut world);

    // 2 × 2 box pairs, both responders each.
    assert_eq!(world.resource::<Hits>().0.len(), 8);
}

#[test]
fn collision_event_triggered_per_box_pair() {
    let mut world = make_world(&OPEN_ROOM);
    let a = spawn_boxed(&mut world, Vec2::ZERO, vec![square("a1", 10), square("a2", 10)]);
    let b = spawn_boxed(&mut world, Vec2::new(5.0, 0.0), vec![square("b", 10)]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    world.add_observer(move |trigger: On<CollisionEvent>| {
        seen_clone.lock().unwrap().push(*trigger.event());
    });
    world.flush();

    tick_collision(&mut world);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0],
        CollisionEvent {
            a,
            b,
            a_box: "a1",
            b_box: "b"
        }
    );
    assert_eq!(seen[1].a_box, "a2");
}

#[test]
fn shell_kills_the_koopa_it_touches() {
    let mut world = make_world(&OPEN_ROOM);
    let config = GameConfig::new();
    let shell = world.spawn(Koopa::bundle(Vec2::new(0.0, 99.0), &config)).id();
    let victim = world.spawn(Koopa::bundle(Vec2::new(50.0, 99.0), &config)).id();
    if let Some(koopa) = world.get_mut::<ActorKind>(shell).unwrap().as_koopa_mut() {
        koopa.shelled = true;
    }

    tick_collision(&mut world);

    assert!(world.get::<ActorStatus>(victim).unwrap().dead);
    assert!(!world.get::<ActorStatus>(shell).unwrap().dead);
    let events = drain_events(&mut world);
    assert!(events.contains(&GameplayEvent::Score(100)));
    assert!(events.contains(&GameplayEvent::Sound(sounds::ENEMY_DIE)));
}

#[test]
fn walking_koopas_ignore_each_other() {
    let mut world = make_world(&OPEN_ROOM);
    let config = GameConfig::new();
    let a = world.spawn(Koopa::bundle(Vec2::new(0.0, 99.0), &config)).id();
    let b = world.spawn(Koopa::bundle(Vec2::new(50.0, 99.0), &config)).id();

    tick_collision(&mut world);

    assert!(!world.get::<ActorStatus>(a).unwrap().dead);
    assert!(!world.get::<ActorStatus>(b).unwrap().dead);
    assert!(drain_events(&mut world).is_empty());
}

// =============================================================================
// Actor physics
// =============================================================================

#[test]
fn physics_applies_gravity_to_airborne_actor() {
    let mut world = make_world(&OPEN_ROOM);
    let walker = world
        .spawn(Walker::bundle(Vec2::new(100.0, 0.0), &GameConfig::new()))
        .id();

    update_world_time(&mut world, 16);
    tick_physics(&mut world);

    // Starts falling at 100 px/s, then gains 600 px/s² for 16 ms.
    let body = world.get::<RigidBody>(walker).unwrap();
    let position = world.get::<MapPosition>(walker).unwrap();
    assert!(approx_eq(position.pos.y, 1.6));
    assert!(approx_eq(body.velocity.y, 109.6));
}

#[test]
fn physics_leaves_grounded_actor_on_the_floor() {
    let mut world = make_world(&OPEN_ROOM);
    let walker = world
        .spawn(Walker::bundle(Vec2::new(100.0, 99.0), &GameConfig::new()))
        .id();

    update_world_time(&mut world, 16);
    tick_physics(&mut world);

    let body = world.get::<RigidBody>(walker).unwrap();
    let position = world.get::<MapPosition>(walker).unwrap();
    assert!(approx_eq(position.pos.y, 99.0));
    assert_eq!(body.velocity.y, 0.0);
}

#[test]
fn physics_skips_frozen_and_disabled_actors() {
    let mut world = make_world(&OPEN_ROOM);
    let config = GameConfig::new();
    let frozen = world.spawn(Walker::bundle(Vec2::new(0.0, 0.0), &config)).id();
    let disabled = world.spawn(Walker::bundle(Vec2::new(100.0, 0.0), &config)).id();
    world.get_mut::<RigidBody>(frozen).unwrap().freeze();
    world.get_mut::<ActorStatus>(disabled).unwrap().enabled = false;

    update_world_time(&mut world, 16);
    tick_physics(&mut world);

    assert_eq!(world.get::<MapPosition>(frozen).unwrap().pos, Vec2::ZERO);
    assert_eq!(
        world.get::<MapPosition>(disabled).unwrap().pos,
        Vec2::new(100.0, 0.0)
    );
}

#[test]
fn walker_turns_around_at_a_wall() {
    let rows = ["      ", "      ", "b     ", "bbbbbb"];
    let mut world = make_world(&rows);
    let walker = world
        .spawn(Walker::bundle(Vec2::new(51.0, 99.0), &GameConfig::new()))
        .id();

    update_world_time(&mut world, 16);
    for _ in 0..60 {
        tick_physics(&mut world);
    }

    let locomotion = world.get::<Locomotion>(walker).unwrap();
    assert_eq!(locomotion.move_direction, HorizontalDirection::Right);
}

#[test]
fn walker_turns_around_at_a_ledge() {
    let rows = ["      ", "      ", "      ", "   bbb"];
    let mut world = make_world(&rows);
    let walker = world
        .spawn(Walker::bundle(Vec2::new(160.0, 99.0), &GameConfig::new()))
        .id();

    update_world_time(&mut world, 16);
    for _ in 0..60 {
        tick_physics(&mut world);
    }

    let locomotion = world.get::<Locomotion>(walker).unwrap();
    assert_eq!(locomotion.move_direction, HorizontalDirection::Right);
    assert!(world.get::<MapPosition>(walker).unwrap().pos.x >= 125.0);
}

// =============================================================================
// Gameplay events
// =============================================================================

#[test]
fn gameplay_events_update_score_and_actors() {
    let mut world = make_world(&OPEN_ROOM);
    let koopa = world
        .spawn(Koopa::bundle(Vec2::new(0.0, 99.0), &GameConfig::new()))
        .id();
    {
        let mut messages = world.resource_mut::<Messages<GameplayEvent>>();
        messages.write(GameplayEvent::Score(100));
        messages.write(GameplayEvent::Score(-30));
        messages.write(GameplayEvent::CarryActor {
            entity: koopa,
            center: Vec2::new(200.0, 125.0),
        });
        messages.write(GameplayEvent::Swallow { entity: koopa });
    }

    tick_gameplay_events(&mut world);

    assert_eq!(world.resource::<GameSession>().score, 70);
    assert_eq!(
        world.get::<MapPosition>(koopa).unwrap().pos,
        Vec2::new(175.0, 100.0)
    );
    let status = world.get::<ActorStatus>(koopa).unwrap();
    assert!(!status.visible);
    assert!(!status.enabled);
    assert!(world.get::<CollisionBoxes>(koopa).unwrap().is_empty());
}
