use bevy_ecs::prelude::Component;
use glam::{IVec2, Vec2};

use super::boxcollider::BoxRect;

/// A pickup placed at a collectible marker. Touching it with the player's
/// rectangle collects it once.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collectible {
    pub size: IVec2,
    pub collected: bool,
}

impl Collectible {
    pub fn new(size: IVec2) -> Self {
        Self {
            size,
            collected: false,
        }
    }

    pub fn rect(&self, position: Vec2) -> BoxRect {
        BoxRect::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            self.size.x,
            self.size.y,
        )
    }
}
