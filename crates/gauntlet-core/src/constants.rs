//! Simulation constants and default tuning parameters.
//!
//! Tuning values here are only defaults; the live values come from
//! [`GameConfig`](crate::config::GameConfig).

/// Fixed physics tick rate (Hz).
pub const FIXED_TICK_RATE: u32 = 50;

/// Seconds per fixed tick.
pub const FIXED_DT: f64 = 1.0 / FIXED_TICK_RATE as f64;

/// Nominal render-frame delta (60 fps).
pub const DEFAULT_FRAME_DT: f64 = 1.0 / 60.0;

/// Upper bound on fixed ticks run for one frame, to avoid a catch-up spiral.
pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

// --- Level ---

/// Track length from the start line to the finish (meters).
pub const LEVEL_LENGTH: f64 = 200.0;

/// Enemies spawned per round.
pub const LEVEL_ENEMY_COUNT: u32 = 20;

/// Seconds between spawn attempts.
pub const SPAWN_INTERVAL_SECS: f64 = 2.0;

/// Lateral spawn window (meters from the centre line).
pub const SPAWN_RANGE_X: (f64, f64) = (-10.0, 10.0);

/// Longitudinal spawn window ahead of the vehicle (meters).
pub const SPAWN_RANGE_Y: (f64, f64) = (40.0, 100.0);

// --- Enemy ---

pub const ENEMY_MAX_HEALTH: f64 = 30.0;
pub const ENEMY_CHASE_SPEED: f64 = 8.0;
pub const ENEMY_DETECTION_RANGE: f64 = 15.0;
pub const ENEMY_ATTACK_RANGE: f64 = 2.0;
pub const ENEMY_ATTACK_DAMAGE: f64 = 10.0;
pub const ENEMY_ATTACK_COOLDOWN_SECS: f64 = 1.0;

/// Yaw easing factor toward the target (per second).
pub const ENEMY_ROTATION_SPEED: f64 = 5.0;

/// How far behind the vehicle an enemy may fall before it is recycled (meters).
pub const ENEMY_RECYCLE_BEHIND: f64 = 12.0;

/// Idle state re-checks target distance at this interval.
pub const IDLE_DETECTION_INTERVAL_SECS: f64 = 0.5;

/// Pause between the death burst and the particle scatter.
pub const DEATH_BURST_DELAY_SECS: f64 = 0.2;

/// Time the death effect plays before the enemy goes back to its pool.
pub const DEATH_EFFECT_SECS: f64 = 1.5;

pub const ENEMY_COLLISION_RADIUS: f64 = 0.5;

// --- Projectile ---

pub const PROJECTILE_SPEED: f64 = 20.0;
pub const PROJECTILE_DAMAGE: f64 = 25.0;
pub const PROJECTILE_LIFETIME_SECS: f64 = 0.4;
pub const PROJECTILE_COLLISION_RADIUS: f64 = 0.1;

// --- Turret ---

pub const TURRET_COOLDOWN_SECS: f64 = 0.3;
pub const TURRET_ROTATION_SPEED: f64 = 100.0;

/// Aim points closer than this to the pivot are ignored.
pub const TURRET_MIN_AIM_DISTANCE: f64 = 0.1;

/// Muzzle offset from the vehicle origin (meters, forward and up).
pub const TURRET_MUZZLE_FORWARD: f64 = 1.0;
pub const TURRET_MUZZLE_HEIGHT: f64 = 1.5;

// --- Vehicle ---

pub const VEHICLE_MAX_HEALTH: f64 = 100.0;
pub const VEHICLE_MOVE_SPEED: f64 = 10.0;
pub const VEHICLE_ACCELERATION: f64 = 5.0;

/// Degrees of corrective yaw per meter off the centre line.
pub const VEHICLE_STEERING_FACTOR: f64 = 5.0;
pub const VEHICLE_RETURN_SPEED: f64 = 2.0;

/// Takeoff ramp never runs longer than this.
pub const TAKEOFF_MAX_RAMP_SECS: f64 = 1.0;

// --- Pools ---

pub const ENEMY_POOL_PREWARM: usize = 10;
pub const PROJECTILE_POOL_PREWARM: usize = 10;
