//! Enemy AI for GAUNTLET.
//!
//! Implements the per-enemy Idle/Chase/Attack state machine and the
//! steering helpers shared with the turret and vehicle.

pub mod fsm;
pub mod profiles;
pub mod steering;

pub use gauntlet_core as core;
