//! Entity factories for setting up the simulation world.
//!
//! Creates the vehicle and the component bundles for pooled enemies and
//! projectiles.

use glam::DVec3;
use hecs::{Entity, World};

use gauntlet_ai::fsm::Brain;
use gauntlet_core::components::*;
use gauntlet_core::config::{EnemyConfig, ProjectileConfig, VehicleConfig};
use gauntlet_core::types::{Position, Velocity};

use crate::combat::{self, Strike};
use crate::pool::PoolFactory;

/// Weak reference from an enemy to the entity it chases.
/// The position is resolved each frame; a despawned or destroyed target reads
/// as absent. `strike` is fixed when the target is assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target {
    pub entity: Option<Entity>,
    pub strike: Option<Strike>,
}

impl Target {
    pub fn assign(world: &World, entity: Entity) -> Self {
        Self {
            entity: Some(entity),
            strike: combat::strike_for(world, entity),
        }
    }
}

/// Spawn the player's vehicle, with its turret, at `start`.
pub fn spawn_vehicle(world: &mut World, config: &VehicleConfig, start: Position) -> Entity {
    world.spawn((
        fresh_vehicle(config, start),
        Turret::default(),
        start,
        Velocity::ZERO,
    ))
}

/// Put the vehicle back to its starting pose with full health and an idle turret.
pub fn reset_vehicle(world: &mut World, vehicle: Entity, config: &VehicleConfig) {
    let start = match world.get::<&Vehicle>(vehicle) {
        Ok(v) => v.start,
        Err(_) => return,
    };
    let _ = world.insert(
        vehicle,
        (
            fresh_vehicle(config, start),
            Turret::default(),
            start,
            Velocity::ZERO,
        ),
    );
}

fn fresh_vehicle(config: &VehicleConfig, start: Position) -> Vehicle {
    Vehicle {
        health: config.max_health,
        max_health: config.max_health,
        moving: false,
        speed: 0.0,
        yaw: 0.0,
        start,
        destroyed: false,
    }
}

/// Builds and resets enemy entities.
pub struct EnemyFactory {
    config: EnemyConfig,
}

impl EnemyFactory {
    pub fn new(config: EnemyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    fn bundle(&self) -> (Enemy, Brain, Position, Velocity, Target, Collider) {
        (
            Enemy {
                health: self.config.max_health,
                max_health: self.config.max_health,
                dying: false,
                collidable: true,
                yaw: 0.0,
            },
            Brain::new(),
            Position::default(),
            Velocity::ZERO,
            Target::default(),
            Collider {
                radius: self.config.collision_radius,
            },
        )
    }
}

impl PoolFactory for EnemyFactory {
    fn create(&mut self, world: &mut World) -> Entity {
        world.spawn(self.bundle())
    }

    fn reset(&mut self, world: &mut World, entity: Entity) {
        let _ = world.insert(entity, self.bundle());
    }
}

/// Builds and resets projectile entities.
pub struct ProjectileFactory {
    config: ProjectileConfig,
}

impl ProjectileFactory {
    pub fn new(config: ProjectileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    fn bundle(&self) -> (Projectile, Position, Velocity, Collider) {
        (
            Projectile {
                direction: DVec3::Y,
                speed: self.config.speed,
                damage: self.config.damage,
                lifetime_secs: self.config.lifetime_secs,
                spent: false,
            },
            Position::default(),
            Velocity::ZERO,
            Collider {
                radius: self.config.collision_radius,
            },
        )
    }
}

impl PoolFactory for ProjectileFactory {
    fn create(&mut self, world: &mut World) -> Entity {
        world.spawn(self.bundle())
    }

    fn reset(&mut self, world: &mut World, entity: Entity) {
        let _ = world.insert(entity, self.bundle());
    }
}
