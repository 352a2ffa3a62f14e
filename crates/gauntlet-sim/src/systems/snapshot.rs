//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::{Entity, World};

use gauntlet_ai::fsm::Brain;
use gauntlet_core::components::*;
use gauntlet_core::enums::GameState;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::*;
use gauntlet_core::types::{Position, SimTime};

use crate::pool::Pooled;
use crate::systems::spawner::resolve_target;
use crate::world_setup::Target;

/// Inputs the snapshot needs that live outside the world.
pub struct SnapshotInputs {
    pub time: SimTime,
    pub state: GameState,
    pub round: u32,
    pub vehicle: Entity,
    pub turret: TurretView,
    pub spawner: SpawnerView,
    pub pools: PoolsView,
    pub stats: RoundStats,
    pub events: Vec<GameEvent>,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(world: &World, inputs: SnapshotInputs) -> GameStateSnapshot {
    GameStateSnapshot {
        time: inputs.time,
        state: inputs.state,
        round: inputs.round,
        vehicle: build_vehicle(world, inputs.vehicle),
        enemies: build_enemies(world),
        projectiles: build_projectiles(world),
        turret: inputs.turret,
        spawner: inputs.spawner,
        pools: inputs.pools,
        stats: inputs.stats,
        events: inputs.events,
    }
}

fn build_vehicle(world: &World, vehicle: Entity) -> VehicleView {
    let position = world
        .get::<&Position>(vehicle)
        .map(|p| *p)
        .unwrap_or_default();
    match world.get::<&Vehicle>(vehicle) {
        Ok(v) => VehicleView {
            position,
            health: v.health,
            max_health: v.max_health,
            speed: v.speed,
            yaw: v.yaw,
            moving: v.moving,
            destroyed: v.destroyed,
            distance_travelled: position.y - v.start.y,
        },
        Err(_) => VehicleView::default(),
    }
}

/// Active enemies, ordered by entity id.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<(Entity, Position, Enemy, Brain, Target)> = world
        .query::<(&Enemy, &Brain, &Position, &Target, &Pooled)>()
        .iter()
        .filter(|(_, (_, _, _, _, pooled))| pooled.active)
        .map(|(entity, (enemy, brain, pos, target, _))| {
            (entity, *pos, enemy.clone(), brain.clone(), *target)
        })
        .collect();
    enemies.sort_by_key(|(entity, ..)| entity.to_bits());

    enemies
        .into_iter()
        .map(|(entity, position, enemy, brain, target)| EnemyView {
            id: entity.to_bits().get(),
            position,
            health: enemy.health,
            state: brain.state(),
            yaw: enemy.yaw,
            dying: enemy.dying,
            target_distance: target
                .entity
                .and_then(|t| resolve_target(world, t))
                .map(|t| position.horizontal_range_to(&t)),
        })
        .collect()
}

/// Live projectiles, ordered by entity id.
fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut views: Vec<ProjectileView> = world
        .query::<(&Projectile, &Position, &Pooled)>()
        .iter()
        .filter(|(_, (_, _, pooled))| pooled.active)
        .map(|(entity, (projectile, pos, _))| ProjectileView {
            id: entity.to_bits().get(),
            position: *pos,
            lifetime_secs: projectile.lifetime_secs,
        })
        .collect();
    views.sort_by_key(|p| p.id);
    views
}
