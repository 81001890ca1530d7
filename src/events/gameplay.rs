//! Gameplay messages raised during a tick.
//!
//! Actor behaviors and collision responders cannot reach resources or other
//! actors while they are borrowed by a system, so they describe what should
//! happen as [`GameplayEvent`]s. `apply_gameplay_events` applies them once
//! the tick's actor work is done, and the driver receives the same list from
//! `Simulation::advance` to play sounds or react to level changes.
use bevy_ecs::message::Messages;
use bevy_ecs::prelude::*;
use glam::Vec2;

/// Sound cue names understood by audio front ends.
pub mod sounds {
    pub const JUMP: &str = "jump";
    pub const FLUTTER: &str = "flutter";
    pub const STOMP: &str = "stomp";
    pub const TONGUE: &str = "tongue";
    pub const ENEMY_DIE: &str = "enemy_die";
    pub const CEILING: &str = "ceiling";
    pub const PUSH: &str = "push";
    pub const COIN: &str = "coin";
    pub const ALL_COINS: &str = "all_coins";
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameplayEvent {
    /// Play a named sound cue.
    Sound(&'static str),
    /// Add points to the session score.
    Score(i64),
    /// The player died; the session leaves the playing state.
    PlayerDied { entity: Entity },
    /// The player asked to move on to the next level.
    LevelAdvance,
    /// Move an actor so its center sits at `center`.
    CarryActor { entity: Entity, center: Vec2 },
    /// Remove a captured actor from play.
    Swallow { entity: Entity },
}

/// Write a gameplay event from exclusive code. Does nothing if the message
/// queue has not been initialized.
pub fn emit(world: &mut World, event: GameplayEvent) {
    if let Some(mut messages) = world.get_resource_mut::<Messages<GameplayEvent>>() {
        messages.write(event);
    }
}
