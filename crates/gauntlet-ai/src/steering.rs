//! Orientation and pursuit helpers in the horizontal plane.
//!
//! Yaw is measured in radians, 0 = down-track (+y), clockwise toward +x.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use gauntlet_core::types::{Position, Velocity};

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a + TAU
    } else {
        a
    }
}

/// Yaw that faces from `from` toward `to`, or `None` when the points coincide
/// horizontally.
pub fn yaw_toward(from: &Position, to: &Position) -> Option<f64> {
    let d = DVec2::new(to.x - from.x, to.y - from.y);
    if d.length_squared() < 1e-12 {
        return None;
    }
    Some(d.x.atan2(d.y))
}

/// Exponential ease from `current` toward `target` along the shortest arc.
/// `rate * dt` is the fraction of the gap closed this step, capped at 1.
pub fn ease_yaw(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    let t = (rate * dt).clamp(0.0, 1.0);
    wrap_angle(current + wrap_angle(target - current) * t)
}

/// Horizontal velocity of magnitude `speed` from `from` toward `to`.
/// Zero when the points coincide horizontally.
pub fn pursue(from: &Position, to: &Position, speed: f64) -> Velocity {
    let d = DVec2::new(to.x - from.x, to.y - from.y).normalize_or_zero() * speed;
    Velocity::new(d.x, d.y, 0.0)
}

/// Horizontal unit vector for a yaw.
pub fn forward(yaw: f64) -> DVec2 {
    DVec2::new(yaw.sin(), yaw.cos())
}
