//! Simulation systems.
//!
//! This module groups the ECS systems run once per tick by
//! [`Simulation`](crate::game::Simulation), in this order:
//!
//! - [`time`] – advance [`WorldTime`](crate::resources::worldtime::WorldTime)
//! - [`input`] – turn [`InputState`](crate::resources::input::InputState) into player intent
//! - [`movement`] – per-actor tile resolver and gravity, plus debug traces
//! - [`collision`] – composite box-pair detection and responder dispatch
//! - [`gameplay`] – pickups touched by the player
//! - [`animation`] – advance animation machines and dispatch listener cues
//! - [`gameplay`] – session and actor updates from this tick's gameplay events

pub mod animation;
pub mod collision;
pub mod gameplay;
pub mod input;
pub mod movement;
pub mod time;
