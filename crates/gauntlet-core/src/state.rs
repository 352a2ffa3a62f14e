//! Game state snapshot: the complete visible state handed to the outer layer each frame.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

/// Complete round state produced after each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub state: GameState,
    pub round: u32,
    pub vehicle: VehicleView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub turret: TurretView,
    pub spawner: SpawnerView,
    pub pools: PoolsView,
    pub stats: RoundStats,
    /// Everything published on the event bus during this frame, in order.
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleView {
    pub position: Position,
    pub health: f64,
    pub max_health: f64,
    pub speed: f64,
    /// Yaw in radians (0 = down-track).
    pub yaw: f64,
    pub moving: bool,
    pub destroyed: bool,
    /// Meters travelled along the track since the start line.
    pub distance_travelled: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u64,
    pub position: Position,
    pub health: f64,
    pub state: EnemyState,
    pub yaw: f64,
    pub dying: bool,
    /// Horizontal distance to the vehicle, if the target is still valid.
    pub target_distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u64,
    pub position: Position,
    pub lifetime_secs: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurretView {
    pub yaw: f64,
    pub light_on: bool,
    pub can_fire: bool,
    /// False when no projectile template is configured.
    pub armed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnerView {
    pub active: bool,
    /// Spawns still allowed this round.
    pub budget: u32,
    /// Enemies spawned and not yet killed or escaped.
    pub alive: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Instances currently vended.
    pub active: usize,
    /// Instances waiting in the store.
    pub free: usize,
    /// Instances ever constructed.
    pub created: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolsView {
    pub enemies: PoolStats,
    pub projectiles: PoolStats,
}

/// Per-round counters, reset on round start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub enemies_spawned: u32,
    pub enemies_killed: u32,
    pub enemies_escaped: u32,
    pub projectiles_fired: u32,
    pub projectile_hits: u32,
    pub death_sequences_started: u32,
    pub damage_taken: f64,
}
