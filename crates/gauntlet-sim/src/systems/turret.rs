//! Turret aiming and cooldown-gated firing from the projectile pool.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use gauntlet_ai::steering::{ease_yaw, forward, yaw_toward};
use gauntlet_core::components::{Projectile, Turret};
use gauntlet_core::config::TurretConfig;
use gauntlet_core::constants::TURRET_MIN_AIM_DISTANCE;
use gauntlet_core::enums::EffectCue;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::{RoundStats, TurretView};
use gauntlet_core::types::{Position, Velocity};

use crate::event_bus::EventBus;
use crate::pool::Pool;
use crate::sequence::{Scheduler, Sequence, SequenceContext, Step};
use crate::world_setup::ProjectileFactory;

/// True once `cooldown_secs` have passed since the last shot.
pub fn can_fire(turret: &Turret, config: &TurretConfig, now: f64) -> bool {
    turret
        .last_fire_secs
        .map_or(true, |last| now - last >= config.cooldown_secs)
}

/// Point the pivot at a world position. Points too close to the pivot are ignored.
pub fn aim_at(world: &mut World, vehicle: Entity, point: Position) -> bool {
    let Ok((turret, pivot)) = world.query_one_mut::<(&mut Turret, &Position)>(vehicle) else {
        return false;
    };
    if pivot.horizontal_range_to(&point) < TURRET_MIN_AIM_DISTANCE {
        return false;
    }
    turret.aim_point = Some(point);
    true
}

/// Ease the pivot toward its aim point.
pub fn rotate(world: &mut World, vehicle: Entity, config: &TurretConfig, dt: f64) {
    let Ok((turret, pivot)) = world.query_one_mut::<(&mut Turret, &Position)>(vehicle) else {
        return;
    };
    let Some(aim) = turret.aim_point else {
        return;
    };
    if pivot.horizontal_range_to(&aim) < TURRET_MIN_AIM_DISTANCE {
        return;
    }
    if let Some(target_yaw) = yaw_toward(pivot, &aim) {
        turret.yaw = ease_yaw(turret.yaw, target_yaw, config.rotation_speed, dt);
    }
}

/// Fire one projectile along the pivot's horizontal forward, with optional
/// random spread. No-op on cooldown or without a projectile template.
#[allow(clippy::too_many_arguments)]
pub fn fire(
    world: &mut World,
    vehicle: Entity,
    config: &TurretConfig,
    projectiles: &mut Pool<ProjectileFactory>,
    rng: &mut ChaCha8Rng,
    scheduler: &mut Scheduler,
    bus: &mut EventBus,
    stats: &mut RoundStats,
    now: f64,
    frame: u64,
) -> Option<Entity> {
    if !projectiles.is_enabled() {
        return None;
    }

    let (origin, yaw) = {
        let (turret, pos) = world
            .query_one_mut::<(&mut Turret, &Position)>(vehicle)
            .ok()?;
        if !can_fire(turret, config, now) {
            return None;
        }
        turret.last_fire_secs = Some(now);
        (*pos, turret.yaw)
    };

    let entity = projectiles.acquire(world)?;

    let half = config.max_spread_degrees;
    let spread = if half > 0.0 && (half * 2.0).is_finite() {
        rng.gen_range(-half..=half).to_radians()
    } else {
        0.0
    };
    let heading = forward(yaw + spread);
    let direction = DVec3::new(heading.x, heading.y, 0.0);
    let muzzle_offset = forward(yaw) * config.muzzle_forward;
    let muzzle = Position::new(
        origin.x + muzzle_offset.x,
        origin.y + muzzle_offset.y,
        origin.z + config.muzzle_height,
    );

    if let Ok((projectile, pos, vel)) =
        world.query_one_mut::<(&mut Projectile, &mut Position, &mut Velocity)>(entity)
    {
        projectile.direction = direction;
        *pos = muzzle;
        *vel = Velocity::from_dvec3(direction * projectile.speed);
    }

    if let Ok(mut turret) = world.get::<&mut Turret>(vehicle) {
        turret.light_on = true;
    }
    scheduler.start(frame, MuzzleLight { vehicle });

    stats.projectiles_fired += 1;
    bus.publish(GameEvent::Effect {
        id: vehicle.to_bits().get(),
        cue: EffectCue::MuzzleFlash,
    });
    bus.publish(GameEvent::ProjectileFired {
        id: entity.to_bits().get(),
    });
    debug!(?entity, yaw, spread, "projectile fired");
    Some(entity)
}

pub fn view(world: &World, vehicle: Entity, config: &TurretConfig, armed: bool, now: f64) -> TurretView {
    match world.get::<&Turret>(vehicle) {
        Ok(turret) => TurretView {
            yaw: turret.yaw,
            light_on: turret.light_on,
            can_fire: armed && can_fire(&turret, config, now),
            armed,
        },
        Err(_) => TurretView::default(),
    }
}

/// Muzzle light stays on for the frame of the shot and goes off on the next.
#[derive(Debug, Clone, Copy)]
pub struct MuzzleLight {
    vehicle: Entity,
}

impl Sequence for MuzzleLight {
    fn name(&self) -> &'static str {
        "muzzle_light"
    }

    fn resume(&mut self, ctx: &mut SequenceContext<'_>) -> Step {
        if let Ok(mut turret) = ctx.world.get::<&mut Turret>(self.vehicle) {
            turret.light_on = false;
        }
        Step::Done
    }
}
