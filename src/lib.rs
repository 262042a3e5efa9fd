//! Arcade Sim - nine classic single-player arcade games on one engine
//!
//! Core modules:
//! - `engine`: Deterministic simulation loop, collisions, session state machine
//! - `games`: Rule sets (Breakout, Memory, Meteor Dodge, Platform Runner, Pong,
//!   Racing, Snake, Space Invaders, Tetris)
//! - `persistence`: Key-value store backends
//! - `highscores`: Best score / best time comparison
//! - `ui`, `render`: Collaborator boundaries for HUD text and drawing
//! - `platform`: Browser/native differences
//! - `web` (wasm32 only): `WebArcade`, the binding the page drives

pub mod engine;
pub mod error;
pub mod games;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod settings;
pub mod ui;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::{Controller, Game, Session, SessionPhase, Verdict};
pub use error::{Error, Result};
pub use settings::{ControlScheme, Difficulty, Settings};

/// Engine-wide timing constants
pub mod consts {
    /// Frame tick rate for fixed-interval games
    pub const TICK_HZ: f32 = 60.0;
    /// Seconds per frame tick
    pub const SIM_DT: f32 = 1.0 / TICK_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap (seconds) fed to the simulation; longer gaps are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;
}
