//! Vehicle motion: the takeoff ramp and fixed-step steering.

use hecs::{Entity, World};
use tracing::info;

use gauntlet_ai::steering::{ease_yaw, forward};
use gauntlet_core::components::Vehicle;
use gauntlet_core::config::VehicleConfig;
use gauntlet_core::constants::{FIXED_DT, TAKEOFF_MAX_RAMP_SECS};
use gauntlet_core::types::{Position, Velocity};

use crate::sequence::{Sequence, SequenceContext, Step};

/// Horizontal velocity of `speed` along `yaw`.
fn along(yaw: f64, speed: f64) -> Velocity {
    let f = forward(yaw) * speed;
    Velocity::new(f.x, f.y, 0.0)
}

/// Fixed-step steering: ease the yaw back toward the centre line and move the
/// velocity toward full forward speed.
pub fn steer(world: &mut World, vehicle: Entity, config: &VehicleConfig) {
    let Ok((v, pos, vel)) = world.query_one_mut::<(&mut Vehicle, &Position, &mut Velocity)>(vehicle)
    else {
        return;
    };
    if !v.moving || v.destroyed {
        return;
    }

    let target_yaw = (-pos.x * config.steering_factor).to_radians();
    v.yaw = ease_yaw(v.yaw, target_yaw, config.return_speed, FIXED_DT);

    let desired = along(v.yaw, config.move_speed).to_dvec3();
    let current = vel.to_dvec3();
    let delta = desired - current;
    let max_step = FIXED_DT * config.move_speed;
    let next = if delta.length() <= max_step {
        desired
    } else {
        current + delta.normalize() * max_step
    };
    *vel = Velocity::from_dvec3(next);
    v.speed = vel.horizontal_speed();
}

/// Halt the vehicle. Returns false if it was not moving.
pub fn stop(world: &mut World, vehicle: Entity) -> bool {
    let Ok((v, vel)) = world.query_one_mut::<(&mut Vehicle, &mut Velocity)>(vehicle) else {
        return false;
    };
    if !v.moving {
        return false;
    }
    v.moving = false;
    v.speed = 0.0;
    *vel = Velocity::ZERO;
    true
}

/// Meters travelled down the track since the start line.
pub fn distance_travelled(world: &World, vehicle: Entity) -> f64 {
    let start = match world.get::<&Vehicle>(vehicle) {
        Ok(v) => v.start,
        Err(_) => return 0.0,
    };
    world
        .get::<&Position>(vehicle)
        .map(|p| p.y - start.y)
        .unwrap_or(0.0)
}

/// Accelerate from rest to cruising speed, then arm the spawner.
#[derive(Debug, Clone)]
pub struct TakeoffRamp {
    vehicle: Entity,
    move_speed: f64,
    acceleration: f64,
    elapsed: f64,
}

impl TakeoffRamp {
    /// First step: mark the vehicle as moving. Returns `None` if it already is.
    pub fn begin(world: &mut World, vehicle: Entity, config: &VehicleConfig) -> Option<Self> {
        let mut v = world.get::<&mut Vehicle>(vehicle).ok()?;
        if v.moving || v.destroyed {
            return None;
        }
        v.moving = true;
        Some(Self {
            vehicle,
            move_speed: config.move_speed,
            acceleration: config.acceleration,
            elapsed: 0.0,
        })
    }
}

impl Sequence for TakeoffRamp {
    fn name(&self) -> &'static str {
        "takeoff"
    }

    fn resume(&mut self, ctx: &mut SequenceContext<'_>) -> Step {
        let Ok((v, vel)) = ctx
            .world
            .query_one_mut::<(&mut Vehicle, &mut Velocity)>(self.vehicle)
        else {
            return Step::Done;
        };
        // Stopped or destroyed mid-ramp: abandon without arming the spawner.
        if !v.moving || v.destroyed {
            return Step::Done;
        }

        self.elapsed += ctx.dt;
        let t = (self.elapsed * self.acceleration).clamp(0.0, 1.0);
        let speed = self.move_speed * t;
        let start_y = v.start.y;

        if speed < self.move_speed && self.elapsed < TAKEOFF_MAX_RAMP_SECS {
            *vel = along(v.yaw, speed);
            v.speed = speed;
            return Step::Yield;
        }

        *vel = along(v.yaw, self.move_speed);
        v.speed = self.move_speed;
        info!(secs = self.elapsed, "takeoff complete");
        ctx.spawner.begin(self.vehicle, start_y, ctx.now, ctx.bus);
        Step::Done
    }
}
