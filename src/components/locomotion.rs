//! Movement intent and jump bookkeeping for an actor.
use bevy_ecs::prelude::Component;

/// Horizontal facing / intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalDirection {
    #[default]
    None,
    Left,
    Right,
}

impl HorizontalDirection {
    /// -1, 0 or +1.
    pub fn sign(self) -> f32 {
        match self {
            HorizontalDirection::None => 0.0,
            HorizontalDirection::Left => -1.0,
            HorizontalDirection::Right => 1.0,
        }
    }

    /// Facing used for directional animation names. Facing left unless
    /// explicitly right.
    pub fn suffix(self) -> &'static str {
        match self {
            HorizontalDirection::Right => "right",
            HorizontalDirection::None | HorizontalDirection::Left => "left",
        }
    }
}

/// Intent flags consumed by the resolver each tick.
#[derive(Component, Debug, Clone, Default)]
pub struct Locomotion {
    pub move_direction: HorizontalDirection,
    /// Last non-`None` direction, kept for facing.
    pub last_move_direction: HorizontalDirection,
    /// Facing snapshot taken when the last jump started.
    pub jump_direction: HorizontalDirection,
    pub jumping: bool,
    /// `sim_time` of the last jump, in seconds.
    pub last_jump_time: f32,
    /// Seconds this actor has been simulated.
    pub sim_time: f32,
}

impl Locomotion {
    pub fn facing(direction: HorizontalDirection) -> Self {
        let mut locomotion = Self::default();
        locomotion.set_direction(direction);
        locomotion
    }

    /// Request movement in `direction`; `None` stops walking.
    pub fn set_direction(&mut self, direction: HorizontalDirection) {
        self.move_direction = direction;
        if direction != HorizontalDirection::None {
            self.last_move_direction = direction;
        }
    }

    /// Record a jump that started now.
    pub fn start_jump(&mut self) {
        self.jumping = true;
        self.last_jump_time = self.sim_time;
        self.jump_direction = self.last_move_direction;
    }
}
