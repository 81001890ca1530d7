//! Event and message types exchanged across systems.
//!
//! Submodules:
//! - [`collision`] – box-pair hits triggered by the composite collision pass
//! - [`gameplay`] – score, sound, death, level and actor-handling requests
pub mod collision;
pub mod gameplay;
