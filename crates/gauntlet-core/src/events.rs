//! Lifecycle notifications published on the event bus.
//!
//! Entities are identified by their raw id bits so this crate stays free of
//! any ECS dependency.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Every notification the simulation can publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Vehicle health changed (damage or restart).
    VehicleHealthChanged { health: f64, max_health: f64 },
    /// Vehicle health reached zero.
    VehicleDestroyed,
    /// An enemy was taken from the pool and placed on the track.
    EnemySpawned { id: u64, position: Position },
    /// Enemy FSM moved from one state to another.
    EnemyStateChanged {
        id: u64,
        from: EnemyState,
        to: EnemyState,
    },
    /// Non-lethal or lethal damage landed on an enemy.
    EnemyDamaged { id: u64, health: f64 },
    /// Destruction sequence finished.
    EnemyKilled { count: u32 },
    /// Enemy fell behind the vehicle and was recycled.
    EnemyEscaped { count: u32 },
    /// Spawner's alive counter changed.
    AliveCountChanged { alive: u32 },
    /// Spawn budget exhausted and no enemies left alive.
    LevelCompleted,
    GameStateChanged { from: GameState, to: GameState },
    ProjectileFired { id: u64 },
    /// Presentation hook: play an animation on an entity.
    Animation { id: u64, cue: AnimationCue },
    /// Presentation hook: play a visual effect at an entity.
    Effect { id: u64, cue: EffectCue },
}

impl GameEvent {
    /// Stable name, used for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::VehicleHealthChanged { .. } => "vehicle_health_changed",
            GameEvent::VehicleDestroyed => "vehicle_destroyed",
            GameEvent::EnemySpawned { .. } => "enemy_spawned",
            GameEvent::EnemyStateChanged { .. } => "enemy_state_changed",
            GameEvent::EnemyDamaged { .. } => "enemy_damaged",
            GameEvent::EnemyKilled { .. } => "enemy_killed",
            GameEvent::EnemyEscaped { .. } => "enemy_escaped",
            GameEvent::AliveCountChanged { .. } => "alive_count_changed",
            GameEvent::LevelCompleted => "level_completed",
            GameEvent::GameStateChanged { .. } => "game_state_changed",
            GameEvent::ProjectileFired { .. } => "projectile_fired",
            GameEvent::Animation { .. } => "animation",
            GameEvent::Effect { .. } => "effect",
        }
    }
}
