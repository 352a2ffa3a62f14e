//! Cleanup system: recycles enemies the vehicle has left behind.

use hecs::{Entity, World};
use tracing::debug;

use gauntlet_core::components::Enemy;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::RoundStats;
use gauntlet_core::types::Position;

use crate::event_bus::EventBus;
use crate::pool::{Pool, Pooled};
use crate::world_setup::EnemyFactory;

/// Return enemies more than `recycle_behind` meters behind the vehicle to
/// their pool. Dying enemies belong to their destruction sequence and are
/// left alone.
pub fn run(
    world: &mut World,
    vehicle: Entity,
    recycle_behind: f64,
    enemies: &mut Pool<EnemyFactory>,
    bus: &mut EventBus,
    stats: &mut RoundStats,
) -> usize {
    let vehicle_y = match world.get::<&Position>(vehicle) {
        Ok(p) => p.y,
        Err(_) => return 0,
    };
    let limit = vehicle_y - recycle_behind;

    let mut behind: Vec<Entity> = Vec::new();
    for (entity, (enemy, pos, pooled)) in world.query_mut::<(&Enemy, &Position, &Pooled)>() {
        if pooled.active && !enemy.dying && pos.y < limit {
            behind.push(entity);
        }
    }

    let mut recycled = 0;
    for entity in behind {
        if enemies.release(world, entity) {
            recycled += 1;
            stats.enemies_escaped += 1;
            bus.publish(GameEvent::EnemyEscaped { count: 1 });
            debug!(?entity, "enemy left behind; recycled");
        }
    }
    recycled
}
