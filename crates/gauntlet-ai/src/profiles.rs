//! Behavioural tuning for the enemy FSM.

use gauntlet_core::config::EnemyConfig;
use gauntlet_core::constants::IDLE_DETECTION_INTERVAL_SECS;

/// Shared, read-only tuning for every enemy of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyProfile {
    /// Chase speed (m/s).
    pub chase_speed: f64,
    /// Horizontal distance at which an idle enemy starts chasing (m).
    pub detection_range: f64,
    /// Horizontal distance at which a chasing enemy stops and attacks (m).
    pub attack_range: f64,
    pub attack_damage: f64,
    pub attack_cooldown_secs: f64,
    /// Yaw easing factor (per second).
    pub rotation_speed: f64,
    /// How often Idle re-checks the target distance.
    pub idle_check_interval_secs: f64,
}

impl EnemyProfile {
    pub fn from_config(config: &EnemyConfig) -> Self {
        Self {
            chase_speed: config.chase_speed,
            detection_range: config.detection_range,
            attack_range: config.attack_range,
            attack_damage: config.attack_damage,
            attack_cooldown_secs: config.attack_cooldown_secs,
            rotation_speed: config.rotation_speed,
            idle_check_interval_secs: IDLE_DETECTION_INTERVAL_SECS,
        }
    }
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self::from_config(&EnemyConfig::default())
    }
}
