//! Session state resources.
//!
//! [`GameSession`] is the authoritative outcome of the running level: whether
//! the player is still playing, has died, or has cleared the level, plus the
//! running score. Gameplay systems never write it directly; they raise
//! [`GameplayEvent`](crate::events::gameplay::GameplayEvent)s which
//! `apply_gameplay_events` folds in at the end of the tick.

use bevy_ecs::prelude::Resource;

/// Discrete high-level states of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Playing,
    Dead,
    LevelComplete,
    /// No further level is available.
    Finished,
}

/// Score and outcome of the current run.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameSession {
    state: SessionState,
    pub score: i64,
    /// Index of the level currently loaded.
    pub level: usize,
    /// Set when something asked to move to the next level this tick.
    pub level_advance_requested: bool,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Update the current state immediately.
    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn add_score(&mut self, points: i64) {
        self.score += points;
    }
}
