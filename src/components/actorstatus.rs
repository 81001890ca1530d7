use bevy_ecs::prelude::Component;

/// Lifecycle flags of an actor.
///
/// Disabled actors are skipped by physics and by the collision pass; hidden
/// actors are skipped by renderers. A dead actor still ticks so it can play
/// out its death behavior.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorStatus {
    pub enabled: bool,
    pub visible: bool,
    pub dead: bool,
}

impl Default for ActorStatus {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            dead: false,
        }
    }
}
