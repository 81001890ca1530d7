//! Level loading and the per-tick driver.
//!
//! [`Simulation`] owns the ECS [`World`] and the update [`Schedule`]. The
//! embedding program loads levels, feeds [`InputState`], and calls
//! [`Simulation::advance`] once per tick with the elapsed milliseconds. Each
//! call returns the [`GameplayEvent`]s raised during that tick so a front end
//! can play sounds or react to deaths and level changes.
//!
//! # Tick order
//!
//! 1. world time
//! 2. player input
//! 3. actor physics (tile resolver, then forces)
//! 4. composite collision pass
//! 5. pickups
//! 6. animation playback and listener cues
//! 7. session and actor updates from gameplay events
//!
//! Steps 3 to 5 only run while the session is playing, so a dead player
//! stays where it died while its death animation plays out.
use bevy_ecs::message::Messages;
use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{info, warn};

use crate::actors::{ActorBundle, ActorKind, Koopa, Player, Walker};
use crate::components::collectible::Collectible;
use crate::components::mapposition::MapPosition;
use crate::events::collision::log_collision;
use crate::events::gameplay::GameplayEvent;
use crate::resources::debugmode::DebugMode;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::{GameSession, SessionState};
use crate::resources::input::InputState;
use crate::resources::tileworld::{SpecialFunction, TileWorld};
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::advance_animations;
use crate::systems::collision::detect_and_dispatch;
use crate::systems::gameplay::{apply_gameplay_events, collect_items, session_is_playing};
use crate::systems::input::player_input;
use crate::systems::movement::{actor_physics, debug_actors};
use crate::systems::time::update_world_time;

/// Player position used when a level has no spawn marker.
pub const DEFAULT_PLAYER_SPAWN: Vec2 = Vec2::new(200.0, 100.0);
/// Points lost when the current level is restarted.
pub const RELOAD_PENALTY: i64 = 500;

/// Build the update schedule in tick order.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            player_input,
            (
                actor_physics,
                debug_actors.run_if(resource_exists::<DebugMode>),
                detect_and_dispatch,
                collect_items,
            )
                .chain()
                .run_if(session_is_playing),
            advance_animations,
            apply_gameplay_events,
        )
            .chain(),
    );
    update
}

/// A running game: the world, its schedule, and the ordered level list.
pub struct Simulation {
    world: World,
    update: Schedule,
    levels: Vec<TileWorld>,
    player: Option<Entity>,
}

impl Simulation {
    /// Create a simulation over `levels` and load the first one.
    ///
    /// An empty level list leaves the session [`Finished`](SessionState::Finished).
    pub fn new(config: GameConfig, levels: Vec<TileWorld>) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(InputState::default());
        world.insert_resource(GameSession::new());
        world.insert_resource(config);
        world.init_resource::<Messages<GameplayEvent>>();
        world.spawn(Observer::new(log_collision));
        world.flush();

        let mut simulation = Self {
            world,
            update: build_schedule(),
            levels,
            player: None,
        };
        if simulation.load_level(0).is_none() {
            warn!("No levels to play");
            simulation
                .world
                .resource_mut::<GameSession>()
                .set_state(SessionState::Finished);
        }
        simulation
    }

    /// Turn per-actor debug traces on or off.
    pub fn set_debug(&mut self, enabled: bool) {
        if enabled {
            self.world.insert_resource(DebugMode {});
        } else {
            self.world.remove_resource::<DebugMode>();
        }
    }

    /// Replace the running level with level `index` and spawn its actors.
    ///
    /// Actors and collectibles of the previous level are despawned. The score
    /// carries over; the session returns to playing. Returns the new player,
    /// or `None` if there is no such level.
    pub fn load_level(&mut self, index: usize) -> Option<Entity> {
        let tiles = self.levels.get(index)?.clone();
        self.clear_level();

        let mut player_spawn = None;
        let mut enemies = Vec::new();
        let mut items = Vec::new();
        for (cell, special) in tiles.special_cells() {
            let corner = tiles.grid_to_world(cell);
            match special {
                SpecialFunction::SpawnActor => player_spawn = Some(corner - Vec2::Y),
                SpecialFunction::SpawnEnemy => enemies.push(corner - Vec2::Y),
                SpecialFunction::SpawnCollectible => items.push(corner),
                SpecialFunction::None | SpecialFunction::AdvanceLevel => {}
            }
        }
        let item_size = tiles.tile_size();
        self.world.insert_resource(tiles);
        {
            let mut session = self.world.resource_mut::<GameSession>();
            session.level = index;
            session.level_advance_requested = false;
            session.set_state(SessionState::Playing);
        }

        let player = self.spawn_player(player_spawn.unwrap_or(DEFAULT_PLAYER_SPAWN));
        for position in &enemies {
            self.spawn_koopa(*position);
        }
        for position in &items {
            self.world
                .spawn((MapPosition::from_vec(*position), Collectible::new(item_size)));
        }
        info!(
            "Level {index} loaded: {} enemies, {} collectibles",
            enemies.len(),
            items.len()
        );
        Some(player)
    }

    /// Restart the current level at a score penalty.
    pub fn reload_level(&mut self) -> Option<Entity> {
        let level = {
            let mut session = self.world.resource_mut::<GameSession>();
            session.add_score(-RELOAD_PENALTY);
            session.level
        };
        info!("Reloading level {level}");
        self.load_level(level)
    }

    /// Load the level after the current one, or finish the run if none is left.
    pub fn advance_level(&mut self) -> Option<Entity> {
        let next = self.world.resource::<GameSession>().level + 1;
        if next < self.levels.len() {
            return self.load_level(next);
        }
        let mut session = self.world.resource_mut::<GameSession>();
        session.level_advance_requested = false;
        session.set_state(SessionState::Finished);
        info!("All levels cleared with score {}", session.score);
        None
    }

    /// Run one tick of `dt_ms` milliseconds and return its gameplay events.
    pub fn advance(&mut self, dt_ms: u32) -> Vec<GameplayEvent> {
        if !self.world.contains_resource::<TileWorld>() {
            return Vec::new();
        }
        update_world_time(&mut self.world, dt_ms);
        self.update.run(&mut self.world);
        self.world.clear_trackers();
        self.world.resource_mut::<InputState>().end_tick();

        let events: Vec<GameplayEvent> = self
            .world
            .resource_mut::<Messages<GameplayEvent>>()
            .drain()
            .collect();

        if self.world.resource::<GameSession>().level_advance_requested {
            self.advance_level();
        }
        events
    }

    pub fn spawn_player(&mut self, position: Vec2) -> Entity {
        let bundle = Player::bundle(position, self.config());
        let entity = self.spawn_actor(bundle);
        self.player = Some(entity);
        entity
    }

    pub fn spawn_koopa(&mut self, position: Vec2) -> Entity {
        let bundle = Koopa::bundle(position, self.config());
        self.spawn_actor(bundle)
    }

    pub fn spawn_walker(&mut self, position: Vec2) -> Entity {
        let bundle = Walker::bundle(position, self.config());
        self.spawn_actor(bundle)
    }

    fn spawn_actor(&mut self, bundle: ActorBundle) -> Entity {
        self.world.spawn(bundle).id()
    }

    fn clear_level(&mut self) {
        let mut query =
            self.world
                .query_filtered::<Entity, Or<(With<ActorKind>, With<Collectible>)>>();
        let doomed: Vec<Entity> = query.iter(&self.world).collect();
        for entity in doomed {
            self.world.despawn(entity);
        }
        self.player = None;
        let mut messages = self.world.resource_mut::<Messages<GameplayEvent>>();
        messages.clear();
    }

    /// The current player entity.
    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    pub fn session(&self) -> &GameSession {
        self.world.resource::<GameSession>()
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }

    pub fn tiles(&self) -> Option<&TileWorld> {
        self.world.get_resource::<TileWorld>()
    }

    pub fn time(&self) -> &WorldTime {
        self.world.resource::<WorldTime>()
    }

    pub fn input_mut(&mut self) -> Mut<'_, InputState> {
        self.world.resource_mut::<InputState>()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
