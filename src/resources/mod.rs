//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during a tick. Each submodule documents the semantics
//! and intended usage of its resource(s).
//!
//! Overview
//! - `debugmode` – presence enables per-actor debug traces
//! - `gameconfig` – physics and player tuning loaded from INI
//! - `gamestate` – session outcome, score and level index
//! - `input` – per-tick movement intent supplied by the driver
//! - `tileworld` – the static tile grid actors move through
//! - `worldtime` – simulation time and delta
pub mod debugmode;
pub mod gameconfig;
pub mod gamestate;
pub mod input;
pub mod tileworld;
pub mod worldtime;
