//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::types::Position;

/// The player's vehicle. Also the target every enemy chases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub health: f64,
    pub max_health: f64,
    /// Whether the vehicle is driving down the track.
    pub moving: bool,
    /// Current forward speed (m/s).
    pub speed: f64,
    /// Yaw in radians (0 = down-track).
    pub yaw: f64,
    /// Pose the vehicle returns to on restart.
    pub start: Position,
    /// Set once health reaches zero; cleared only by a reset.
    pub destroyed: bool,
}

/// Combat state of an enemy. Behaviour state lives in the AI brain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Clamped to [0, max_health].
    pub health: f64,
    pub max_health: f64,
    /// Guard flag: set when the destruction sequence starts.
    /// While set, the enemy accepts no damage and nothing else may release it.
    pub dying: bool,
    /// Whether projectiles can currently hit this enemy.
    pub collidable: bool,
    /// Yaw in radians (0 = down-track).
    pub yaw: f64,
}

/// A fired projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Unit direction of travel.
    pub direction: DVec3,
    pub speed: f64,
    pub damage: f64,
    /// Seconds left before the projectile returns to its pool.
    pub lifetime_secs: f64,
    /// Set before collision side effects run; a spent projectile never hits again.
    pub spent: bool,
}

/// Turret mounted on the vehicle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Turret {
    /// Pivot yaw in radians (0 = down-track).
    pub yaw: f64,
    /// Frame-clock time of the last shot.
    pub last_fire_secs: Option<f64>,
    /// Muzzle light; on for the frame a shot is fired.
    pub light_on: bool,
    /// World point the pivot is turning toward.
    pub aim_point: Option<Position>,
}

/// Overlap sphere used by the default overlap detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f64,
}
