//! # Duel Core
//!
//! Deterministic frame-stepped combat core for a 1v1 duel between the
//! player's active character and the enemy it faces.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No audio
//! - No IO
//! - No system randomness (random values are passed in per tick)
//!
//! This separation enables:
//! - Headless batch runs
//! - Tick-exact scenario tests
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`world`] - Entity store and character factory
//! - [`components`] - Component definitions
//! - [`combat`] - Per-tick combat resolution
//! - [`actions`] - Action issuance shared by player and opponent
//! - [`input`] - Controller input mapping
//! - [`ai`] - Opponent controller
//! - [`simulation`] - Frame orchestration
//! - [`stage`] - Stage setup and progression

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod simulation;
pub mod stage;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::Action;
    pub use crate::ai::{Difficulty, OpponentController};
    pub use crate::combat::{HitEvent, HitOutcome, Sound, SwitchEvent, Terminal, TickEvents};
    pub use crate::components::*;
    pub use crate::config::{Area, AreaGate, StageConfig};
    pub use crate::error::{DuelError, Result};
    pub use crate::input::{Button, InputEvent};
    pub use crate::render::OutputEvent;
    pub use crate::simulation::Simulation;
    pub use crate::stage::{setup_stage, Progression};
    pub use crate::world::World;
}
