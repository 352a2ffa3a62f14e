//! Projectile/enemy overlap detection and hit resolution.

use hecs::{Entity, World};

use gauntlet_core::components::{Collider, Enemy, Projectile};
use gauntlet_core::state::RoundStats;
use gauntlet_core::types::Position;

use crate::combat::{accepts_damage, damage_enemy};
use crate::event_bus::EventBus;
use crate::pool::{Pool, Pooled};
use crate::sequence::Scheduler;
use crate::world_setup::{EnemyFactory, ProjectileFactory};

/// Stand-in for a physics engine's overlap query.
pub trait OverlapDetector {
    fn overlaps(&self, a: &Position, a_radius: f64, b: &Position, b_radius: f64) -> bool;
}

/// Spheres compared in the horizontal plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereOverlap;

impl OverlapDetector for SphereOverlap {
    fn overlaps(&self, a: &Position, a_radius: f64, b: &Position, b_radius: f64) -> bool {
        a.horizontal_range_to(b) <= a_radius + b_radius
    }
}

/// Find and resolve every projectile/enemy overlap. Returns the number of hits.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    detector: &dyn OverlapDetector,
    projectiles: &mut Pool<ProjectileFactory>,
    enemies: &Pool<EnemyFactory>,
    scheduler: &mut Scheduler,
    bus: &mut EventBus,
    stats: &mut RoundStats,
    frame: u64,
) -> usize {
    let mut shots: Vec<(Entity, Position, f64)> = Vec::new();
    for (entity, (projectile, pos, collider, pooled)) in
        world.query_mut::<(&Projectile, &Position, &Collider, &Pooled)>()
    {
        if pooled.active && !projectile.spent {
            shots.push((entity, *pos, collider.radius));
        }
    }
    if shots.is_empty() {
        return 0;
    }

    let mut targets: Vec<(Entity, Position, f64)> = Vec::new();
    for (entity, (enemy, pos, collider, pooled)) in
        world.query_mut::<(&Enemy, &Position, &Collider, &Pooled)>()
    {
        if pooled.active && enemy.collidable && !enemy.dying {
            targets.push((entity, *pos, collider.radius));
        }
    }

    let mut hits = 0;
    for (shot, shot_pos, shot_radius) in shots {
        for &(enemy, enemy_pos, enemy_radius) in &targets {
            if !detector.overlaps(&shot_pos, shot_radius, &enemy_pos, enemy_radius) {
                continue;
            }
            if resolve_hit(
                world,
                projectiles,
                enemies,
                scheduler,
                bus,
                stats,
                frame,
                shot,
                enemy,
            ) {
                hits += 1;
                break;
            }
        }
    }
    hits
}

/// Resolve one projectile striking one enemy. The projectile is marked spent
/// and returned to its pool before damage lands, so it can never hit twice.
/// Returns false if either side is not a valid participant.
#[allow(clippy::too_many_arguments)]
pub fn resolve_hit(
    world: &mut World,
    projectiles: &mut Pool<ProjectileFactory>,
    enemies: &Pool<EnemyFactory>,
    scheduler: &mut Scheduler,
    bus: &mut EventBus,
    stats: &mut RoundStats,
    frame: u64,
    projectile: Entity,
    enemy: Entity,
) -> bool {
    if !projectiles.owns_active(world, projectile) || !accepts_damage(world, enemies, enemy) {
        return false;
    }
    let damage = match world.get::<&mut Projectile>(projectile) {
        Ok(mut p) if !p.spent => {
            p.spent = true;
            p.damage
        }
        _ => return false,
    };
    projectiles.release(world, projectile);
    stats.projectile_hits += 1;
    damage_enemy(world, enemies, scheduler, bus, stats, enemy, damage, frame);
    true
}
