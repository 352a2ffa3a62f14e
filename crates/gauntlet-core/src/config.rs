//! Configuration snapshot injected into the engine at construction.
//!
//! Every section has `#[serde(default)]` so a partial JSON document only
//! overrides what it names. Setting `enemy` or `projectile` to `null` removes
//! that template, which disables the matching pool.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::PoolKind;
use crate::error::{ConfigError, Result};

/// Closed numeric window `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// `max - min`. Infinite when the bounds are too far apart to sample.
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed. Same seed and same inputs give the same round.
    pub seed: u64,
    pub level: LevelConfig,
    /// Enemy template. `None` disables the enemy pool.
    pub enemy: Option<EnemyConfig>,
    /// Projectile template. `None` disables the projectile pool.
    pub projectile: Option<ProjectileConfig>,
    pub turret: TurretConfig,
    pub vehicle: VehicleConfig,
    pub pools: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub length: f64,
    pub enemy_count: u32,
    pub spawn_interval_secs: f64,
    /// Lateral spawn window.
    pub spawn_range_x: Span,
    /// Spawn distance ahead of the vehicle.
    pub spawn_range_y: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: f64,
    pub chase_speed: f64,
    pub detection_range: f64,
    pub attack_range: f64,
    pub attack_damage: f64,
    pub attack_cooldown_secs: f64,
    pub rotation_speed: f64,
    pub recycle_behind: f64,
    pub death_effect_secs: f64,
    pub collision_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f64,
    pub damage: f64,
    pub lifetime_secs: f64,
    pub collision_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    pub cooldown_secs: f64,
    pub rotation_speed: f64,
    /// Half-width of the random yaw spread applied to each shot (degrees).
    pub max_spread_degrees: f64,
    pub muzzle_forward: f64,
    pub muzzle_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub max_health: f64,
    pub move_speed: f64,
    pub acceleration: f64,
    pub steering_factor: f64,
    pub return_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub enemy_prewarm: usize,
    pub projectile_prewarm: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            level: LevelConfig::default(),
            enemy: Some(EnemyConfig::default()),
            projectile: Some(ProjectileConfig::default()),
            turret: TurretConfig::default(),
            vehicle: VehicleConfig::default(),
            pools: PoolConfig::default(),
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            length: LEVEL_LENGTH,
            enemy_count: LEVEL_ENEMY_COUNT,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            spawn_range_x: Span::new(SPAWN_RANGE_X.0, SPAWN_RANGE_X.1),
            spawn_range_y: Span::new(SPAWN_RANGE_Y.0, SPAWN_RANGE_Y.1),
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: ENEMY_MAX_HEALTH,
            chase_speed: ENEMY_CHASE_SPEED,
            detection_range: ENEMY_DETECTION_RANGE,
            attack_range: ENEMY_ATTACK_RANGE,
            attack_damage: ENEMY_ATTACK_DAMAGE,
            attack_cooldown_secs: ENEMY_ATTACK_COOLDOWN_SECS,
            rotation_speed: ENEMY_ROTATION_SPEED,
            recycle_behind: ENEMY_RECYCLE_BEHIND,
            death_effect_secs: DEATH_EFFECT_SECS,
            collision_radius: ENEMY_COLLISION_RADIUS,
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            damage: PROJECTILE_DAMAGE,
            lifetime_secs: PROJECTILE_LIFETIME_SECS,
            collision_radius: PROJECTILE_COLLISION_RADIUS,
        }
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: TURRET_COOLDOWN_SECS,
            rotation_speed: TURRET_ROTATION_SPEED,
            max_spread_degrees: 0.0,
            muzzle_forward: TURRET_MUZZLE_FORWARD,
            muzzle_height: TURRET_MUZZLE_HEIGHT,
        }
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_health: VEHICLE_MAX_HEALTH,
            move_speed: VEHICLE_MOVE_SPEED,
            acceleration: VEHICLE_ACCELERATION,
            steering_factor: VEHICLE_STEERING_FACTOR,
            return_speed: VEHICLE_RETURN_SPEED,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enemy_prewarm: ENEMY_POOL_PREWARM,
            projectile_prewarm: PROJECTILE_POOL_PREWARM,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Collect every problem with this snapshot. An empty list means valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        positive(&mut errors, "level.length", self.level.length);
        positive(
            &mut errors,
            "level.spawn_interval_secs",
            self.level.spawn_interval_secs,
        );
        span(&mut errors, "level.spawn_range_x", self.level.spawn_range_x);
        span(&mut errors, "level.spawn_range_y", self.level.spawn_range_y);

        match &self.enemy {
            Some(enemy) => {
                positive(&mut errors, "enemy.max_health", enemy.max_health);
                positive(&mut errors, "enemy.detection_range", enemy.detection_range);
                positive(&mut errors, "enemy.attack_range", enemy.attack_range);
                if enemy.attack_range > enemy.detection_range {
                    errors.push(ConfigError::AttackBeyondDetection {
                        attack: enemy.attack_range,
                        detection: enemy.detection_range,
                    });
                }
            }
            None => errors.push(ConfigError::MissingTemplate(PoolKind::Enemy)),
        }

        match &self.projectile {
            Some(projectile) => {
                positive(&mut errors, "projectile.speed", projectile.speed);
                positive(&mut errors, "projectile.lifetime_secs", projectile.lifetime_secs);
            }
            None => errors.push(ConfigError::MissingTemplate(PoolKind::Projectile)),
        }

        // Shots sample the full `[-spread, spread]` window.
        finite(
            &mut errors,
            "turret.max_spread_degrees",
            self.turret.max_spread_degrees * 2.0,
        );

        positive(&mut errors, "vehicle.max_health", self.vehicle.max_health);
        positive(&mut errors, "vehicle.move_speed", self.vehicle.move_speed);

        errors
    }
}

fn positive(errors: &mut Vec<ConfigError>, field: &'static str, value: f64) {
    if value.is_nan() || value <= 0.0 {
        errors.push(ConfigError::NotPositive { field, value });
    }
}

fn finite(errors: &mut Vec<ConfigError>, field: &'static str, value: f64) {
    if !value.is_finite() {
        errors.push(ConfigError::NotFinite { field, value });
    }
}

fn span(errors: &mut Vec<ConfigError>, field: &'static str, span: Span) {
    if !span.width().is_finite() {
        errors.push(ConfigError::NotFinite {
            field,
            value: span.width(),
        });
    } else if !span.is_valid() {
        errors.push(ConfigError::InvalidRange {
            field,
            min: span.min,
            max: span.max,
        });
    }
}
