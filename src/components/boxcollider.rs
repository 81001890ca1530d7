//! Composite collision boxes.
//!
//! Every actor owns an ordered list of axis-aligned sub-boxes positioned
//! relative to its [`MapPosition`](super::mapposition::MapPosition). World
//! rectangles are computed on demand from the current position and never
//! cached. List order decides responder order within a pair of actors, not
//! which pairs are found.

use bevy_ecs::prelude::Component;
use bevy_ecs::prelude::Entity;
use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use super::collision::{BoxInfo, CollisionResponder};

/// Integer rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoxRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Closed-interval overlap test: rectangles sharing only an edge or a
    /// corner intersect.
    pub fn intersects(&self, other: &BoxRect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

/// One sub-box of an actor.
#[derive(Debug, Clone, Copy)]
pub struct CollisionBox {
    pub name: &'static str,
    pub offset: IVec2,
    pub size: IVec2,
    pub responder: Option<CollisionResponder>,
}

impl CollisionBox {
    pub fn new(name: &'static str, offset: IVec2, size: IVec2) -> Self {
        Self {
            name,
            offset,
            size,
            responder: None,
        }
    }

    pub fn with_responder(mut self, responder: CollisionResponder) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Rectangle of this box for an owner at `position`. The position is
    /// floored to whole pixels first.
    pub fn world_rect(&self, position: Vec2) -> BoxRect {
        BoxRect::new(
            position.x.floor() as i32 + self.offset.x,
            position.y.floor() as i32 + self.offset.y,
            self.size.x,
            self.size.y,
        )
    }

    pub fn info(&self, owner: Entity) -> BoxInfo {
        BoxInfo {
            owner,
            name: self.name,
            offset: self.offset,
            size: self.size,
        }
    }
}

/// Ordered box list of an actor.
#[derive(Component, Debug, Clone, Default)]
pub struct CollisionBoxes {
    boxes: SmallVec<[CollisionBox; 4]>,
}

impl CollisionBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a box. A box with the same name is removed first, so re-adding
    /// moves it to the end of the list.
    pub fn add(&mut self, collision_box: CollisionBox) {
        self.remove(collision_box.name);
        self.boxes.push(collision_box);
    }

    /// Remove the box called `name`. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.boxes.len();
        self.boxes.retain(|b| b.name != name);
        self.boxes.len() != before
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn get(&self, name: &str) -> Option<&CollisionBox> {
        self.boxes.iter().find(|b| b.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CollisionBox> {
        self.boxes.iter_mut().find(|b| b.name == name)
    }

    pub fn by_index(&self, index: usize) -> Option<&CollisionBox> {
        self.boxes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionBox> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl FromIterator<CollisionBox> for CollisionBoxes {
    fn from_iter<T: IntoIterator<Item = CollisionBox>>(iter: T) -> Self {
        let mut boxes = CollisionBoxes::new();
        for collision_box in iter {
            boxes.add(collision_box);
        }
        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_rects_intersect() {
        let a = BoxRect::new(0, 0, 50, 50);
        let b = BoxRect::new(25, 25, 50, 50);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = BoxRect::new(0, 0, 50, 50);
        let right = BoxRect::new(50, 10, 20, 20);
        let below = BoxRect::new(0, 50, 50, 10);
        let corner = BoxRect::new(50, 50, 5, 5);
        assert!(a.intersects(&right));
        assert!(a.intersects(&below));
        assert!(a.intersects(&corner));
    }

    #[test]
    fn test_separated_rects_do_not_intersect() {
        let a = BoxRect::new(0, 0, 50, 50);
        assert!(!a.intersects(&BoxRect::new(51, 0, 10, 10)));
        assert!(!a.intersects(&BoxRect::new(0, -11, 10, 10)));
    }

    #[test]
    fn test_world_rect_floors_position() {
        let feet = CollisionBox::new("feet", IVec2::new(3, 40), IVec2::new(45, 10));
        let rect = feet.world_rect(Vec2::new(10.9, 20.2));
        assert_eq!(rect, BoxRect::new(13, 60, 45, 10));
    }

    #[test]
    fn test_world_rect_floors_negative_position() {
        let body = CollisionBox::new("body", IVec2::ZERO, IVec2::new(50, 50));
        let rect = body.world_rect(Vec2::new(-0.5, -49.2));
        assert_eq!(rect, BoxRect::new(-1, -50, 50, 50));
    }

    #[test]
    fn test_add_same_name_moves_to_end() {
        let mut boxes: CollisionBoxes = [
            CollisionBox::new("tongue", IVec2::ZERO, IVec2::ONE),
            CollisionBox::new("body", IVec2::ZERO, IVec2::ONE),
        ]
        .into_iter()
        .collect();
        boxes.add(CollisionBox::new("tongue", IVec2::new(5, 5), IVec2::ONE));
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes.by_index(0).map(|b| b.name), Some("body"));
        assert_eq!(boxes.by_index(1).map(|b| b.offset), Some(IVec2::new(5, 5)));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut boxes = CollisionBoxes::new();
        boxes.add(CollisionBox::new("body", IVec2::ZERO, IVec2::ONE));
        assert!(!boxes.remove("feet"));
        assert!(boxes.remove("body"));
        assert!(boxes.is_empty());
        boxes.add(CollisionBox::new("body", IVec2::ZERO, IVec2::ONE));
        boxes.clear();
        assert_eq!(boxes.len(), 0);
    }
}
