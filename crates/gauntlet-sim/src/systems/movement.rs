//! Kinematic integration system.
//!
//! Updates Position from Velocity each fixed tick: position += velocity * dt.
//! Pooled entities sitting in their pool's store are skipped.

use hecs::World;

use gauntlet_core::constants::FIXED_DT;
use gauntlet_core::types::{Position, Velocity};

use crate::pool::Pooled;

/// Run kinematic integration for all entities with Position + Velocity.
pub fn run(world: &mut World) {
    for (_entity, (pos, vel, pooled)) in
        world.query_mut::<(&mut Position, &Velocity, Option<&Pooled>)>()
    {
        if pooled.is_some_and(|p| !p.active) {
            continue;
        }
        pos.integrate(vel, FIXED_DT);
    }
}
