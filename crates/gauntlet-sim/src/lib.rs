//! Simulation engine for GAUNTLET.
//!
//! Owns the hecs ECS world, runs frame systems and fixed-step physics,
//! and produces GameStateSnapshots for the frontend.

pub mod combat;
pub mod engine;
pub mod event_bus;
pub mod pool;
pub mod sequence;
pub mod systems;
pub mod world_setup;

pub use gauntlet_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
