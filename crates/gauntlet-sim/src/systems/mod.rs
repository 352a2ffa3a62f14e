//! ECS systems that operate on the simulation world.
//!
//! Systems are free functions that take `&mut World` (or `&World` for read-only).
//! Frame systems run once per rendered frame; fixed systems once per physics tick.

pub mod cleanup;
pub mod collision;
pub mod enemy_ai;
pub mod movement;
pub mod projectiles;
pub mod snapshot;
pub mod spawner;
pub mod turret;
pub mod vehicle;
