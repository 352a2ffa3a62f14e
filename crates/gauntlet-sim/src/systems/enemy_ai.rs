//! Enemy AI system: runs every active enemy's brain once per frame.
//!
//! Calls the FSM from gauntlet-ai to compute transitions and intents, then
//! writes them back to ECS components. Attacks go through the strike
//! resolved when the target was assigned.

use hecs::{Entity, World};
use tracing::debug;

use gauntlet_ai::fsm::{Brain, BrainOutput, EnemyContext};
use gauntlet_ai::profiles::EnemyProfile;
use gauntlet_core::components::Enemy;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::RoundStats;
use gauntlet_core::types::{Position, Velocity};

use crate::event_bus::EventBus;
use crate::pool::Pooled;
use crate::systems::spawner::resolve_target;
use crate::world_setup::Target;

/// Run the enemy AI for one frame.
pub fn run(
    world: &mut World,
    profile: &EnemyProfile,
    dt: f64,
    bus: &mut EventBus,
    stats: &mut RoundStats,
) {
    // Collect inputs first to avoid borrow conflicts with hecs.
    let mut inputs: Vec<(Entity, Position, f64, Target)> = Vec::new();
    for (entity, (enemy, pos, target, pooled)) in
        world.query_mut::<(&Enemy, &Position, &Target, &Pooled)>()
    {
        if !pooled.active || enemy.dying {
            continue;
        }
        inputs.push((entity, *pos, enemy.yaw, *target));
    }

    let mut outputs: Vec<(Entity, Target, BrainOutput)> = Vec::with_capacity(inputs.len());
    for (entity, position, yaw, target) in inputs {
        let ctx = EnemyContext {
            position,
            yaw,
            target: target.entity.and_then(|t| resolve_target(world, t)),
            dt,
        };
        let Ok(mut brain) = world.get::<&mut Brain>(entity) else {
            continue;
        };
        let out = brain.update(&ctx, profile);
        outputs.push((entity, target, out));
    }

    // Apply updates.
    for (entity, target, out) in outputs {
        if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
            enemy.yaw = out.yaw;
        }
        if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
            *vel = out.velocity;
        }

        let id = entity.to_bits().get();
        if let Some(t) = out.transition {
            debug!(?entity, from = ?t.from, to = ?t.to, "enemy state change");
            bus.publish(GameEvent::EnemyStateChanged {
                id,
                from: t.from,
                to: t.to,
            });
        }
        if let Some(cue) = out.animation {
            bus.publish(GameEvent::Animation { id, cue });
        }
        if out.attack {
            if let (Some(victim), Some(strike)) = (target.entity, target.strike) {
                strike(world, victim, profile.attack_damage, bus, stats);
            }
        }
    }
}
