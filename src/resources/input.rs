//! Per-tick movement intent resource.
//!
//! The simulation never polls devices. A driver (keyboard loop, replay,
//! scripted test) presses and releases [`Action`]s on the [`InputState`]
//! resource before each tick; the input system turns it into player intent,
//! and [`InputState::end_tick`] clears the edge flags afterwards.
use bevy_ecs::prelude::*;

/// Logical controls the player responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    Crouch,
    Attack,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Boolean control state with edge flags.
pub struct BoolState {
    /// Whether the control is currently held.
    pub active: bool,
    /// Whether the control went down this tick.
    pub just_pressed: bool,
    /// Whether the control went up this tick.
    pub just_released: bool,
}

impl BoolState {
    fn set(&mut self, down: bool) {
        if down && !self.active {
            self.just_pressed = true;
        } else if !down && self.active {
            self.just_released = true;
        }
        self.active = down;
    }

    fn clear_edges(&mut self) {
        self.just_pressed = false;
        self.just_released = false;
    }
}

/// Resource capturing the controls relevant to the player this tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    pub left: BoolState,
    pub right: BoolState,
    pub jump: BoolState,
    pub crouch: BoolState,
    pub attack: BoolState,
}

impl InputState {
    pub fn get(&self, action: Action) -> &BoolState {
        match action {
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Jump => &self.jump,
            Action::Crouch => &self.crouch,
            Action::Attack => &self.attack,
        }
    }

    fn get_mut(&mut self, action: Action) -> &mut BoolState {
        match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Jump => &mut self.jump,
            Action::Crouch => &mut self.crouch,
            Action::Attack => &mut self.attack,
        }
    }

    pub fn press(&mut self, action: Action) {
        self.get_mut(action).set(true);
    }

    pub fn release(&mut self, action: Action) {
        self.get_mut(action).set(false);
    }

    /// Set a control's level; edges are derived from the previous level.
    pub fn set(&mut self, action: Action, down: bool) {
        self.get_mut(action).set(down);
    }

    /// Drop the per-tick edge flags, keeping held controls held.
    pub fn end_tick(&mut self) {
        for state in [
            &mut self.left,
            &mut self.right,
            &mut self.jump,
            &mut self.crouch,
            &mut self.attack,
        ] {
            state.clear_edges();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_sets_edge_once() {
        let mut input = InputState::default();
        input.press(Action::Jump);
        assert!(input.jump.active);
        assert!(input.jump.just_pressed);

        input.end_tick();
        input.press(Action::Jump);
        assert!(input.jump.active);
        assert!(!input.jump.just_pressed);
    }

    #[test]
    fn test_release_sets_release_edge() {
        let mut input = InputState::default();
        input.press(Action::Attack);
        input.end_tick();
        input.release(Action::Attack);
        assert!(!input.attack.active);
        assert!(input.attack.just_released);
        input.end_tick();
        assert_eq!(*input.get(Action::Attack), BoolState::default());
    }

    #[test]
    fn test_release_without_press_is_quiet() {
        let mut input = InputState::default();
        input.set(Action::Left, false);
        assert!(!input.left.just_released);
    }
}
