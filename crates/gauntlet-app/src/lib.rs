//! GAUNTLET host application.
//!
//! Wires the simulation engine to a real-time game loop thread and a
//! headless autopilot used by the command-line runner.

pub mod autoplay;
pub mod error;
pub mod game_loop;
pub mod state;

pub use gauntlet_core as core;
