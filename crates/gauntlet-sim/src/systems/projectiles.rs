//! Projectile lifetime countdown.

use hecs::{Entity, World};

use gauntlet_core::components::Projectile;

use crate::pool::{Pool, Pooled};
use crate::world_setup::ProjectileFactory;

/// Count down every live projectile and return expired ones to the pool.
pub fn expire(world: &mut World, pool: &mut Pool<ProjectileFactory>, dt: f64) -> usize {
    let mut expired: Vec<Entity> = Vec::new();
    for (entity, (projectile, pooled)) in world.query_mut::<(&mut Projectile, &Pooled)>() {
        if !pooled.active || projectile.spent {
            continue;
        }
        projectile.lifetime_secs -= dt;
        if projectile.lifetime_secs <= 0.0 {
            expired.push(entity);
        }
    }
    expired
        .into_iter()
        .filter(|&e| pool.release(world, e))
        .count()
}
