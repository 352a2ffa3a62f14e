//! Player and round-control commands sent from the outer layer to the simulation.
//!
//! Commands are queued and processed at the next frame boundary.

use serde::{Deserialize, Serialize};

/// All possible outer-layer actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Round control ---
    /// Leave the menu and start the first round.
    StartRound,
    /// Tear the current round down and start a fresh one.
    RestartRound,
    /// End the round from outside (e.g. UI quit).
    EndRound { won: bool },

    // --- Turret ---
    /// Fire once if the turret is off cooldown.
    Fire,
    /// Rotate the turret pivot toward a point on the track plane.
    AimAt { x: f64, y: f64 },
}
