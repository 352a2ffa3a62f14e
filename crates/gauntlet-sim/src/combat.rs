//! Damage application and the enemy destruction sequence.

use hecs::{Component, Entity, World};
use tracing::{debug, info};

use gauntlet_core::components::{Enemy, Vehicle};
use gauntlet_core::constants::DEATH_BURST_DELAY_SECS;
use gauntlet_core::enums::EffectCue;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::RoundStats;
use gauntlet_core::types::Velocity;

use crate::event_bus::EventBus;
use crate::pool::{is_live, Pool, PoolToken};
use crate::sequence::{Scheduler, Sequence, SequenceContext, Step};
use crate::world_setup::EnemyFactory;

/// Result of a damage call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Non-positive amount, already dead, or not damageable right now.
    Ignored,
    /// Health dropped but stayed above zero.
    Damaged { health: f64 },
    /// Health reached zero with this hit.
    Lethal,
}

/// Anything that can take damage.
pub trait Damageable {
    /// Apply `amount`, clamping health at zero.
    fn take_damage(&mut self, amount: f64) -> DamageOutcome;
    fn current_health(&self) -> f64;
    fn max_health(&self) -> f64;
}

impl Damageable for Enemy {
    fn take_damage(&mut self, amount: f64) -> DamageOutcome {
        if !(amount > 0.0) || self.dying || !self.collidable || self.health <= 0.0 {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health > 0.0 {
            return DamageOutcome::Damaged {
                health: self.health,
            };
        }
        // Guard flags go up before anything can suspend.
        self.dying = true;
        self.collidable = false;
        DamageOutcome::Lethal
    }

    fn current_health(&self) -> f64 {
        self.health
    }

    fn max_health(&self) -> f64 {
        self.max_health
    }
}

impl Damageable for Vehicle {
    fn take_damage(&mut self, amount: f64) -> DamageOutcome {
        if !(amount > 0.0) || self.destroyed {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount).max(0.0);
        if self.health > 0.0 {
            return DamageOutcome::Damaged {
                health: self.health,
            };
        }
        self.destroyed = true;
        self.moving = false;
        self.speed = 0.0;
        DamageOutcome::Lethal
    }

    fn current_health(&self) -> f64 {
        self.health
    }

    fn max_health(&self) -> f64 {
        self.max_health
    }
}

/// Apply damage to the `D` component of `entity`.
/// Returns the outcome and the health lost.
pub fn apply_damage<D: Damageable + Component>(
    world: &mut World,
    entity: Entity,
    amount: f64,
) -> (DamageOutcome, f64) {
    match world.get::<&mut D>(entity) {
        Ok(mut target) => {
            let before = target.current_health();
            let outcome = target.take_damage(amount);
            (outcome, before - target.current_health())
        }
        Err(_) => (DamageOutcome::Ignored, 0.0),
    }
}

/// How an attacker damages its target. Resolved once per target assignment so
/// attack code never names the target's concrete type.
pub type Strike = fn(&mut World, Entity, f64, &mut EventBus, &mut RoundStats) -> DamageOutcome;

/// Damage entry point for `entity`, or `None` when it cannot be attacked.
pub fn strike_for(world: &World, entity: Entity) -> Option<Strike> {
    if world.get::<&Vehicle>(entity).is_ok() {
        return Some(damage_vehicle as Strike);
    }
    None
}

/// True if a projectile hitting this enemy should count.
pub fn accepts_damage(world: &World, enemies: &Pool<EnemyFactory>, entity: Entity) -> bool {
    if !enemies.owns_active(world, entity) {
        return false;
    }
    world
        .get::<&Enemy>(entity)
        .map(|e| e.collidable && !e.dying && e.health > 0.0)
        .unwrap_or(false)
}

/// Damage the vehicle: clamp, raise health-changed, and on zero raise destroyed and halt.
pub fn damage_vehicle(
    world: &mut World,
    vehicle: Entity,
    amount: f64,
    bus: &mut EventBus,
    stats: &mut RoundStats,
) -> DamageOutcome {
    let (outcome, lost) = apply_damage::<Vehicle>(world, vehicle, amount);
    if outcome == DamageOutcome::Ignored {
        return outcome;
    }
    stats.damage_taken += lost;

    let (health, max_health) = match world.get::<&Vehicle>(vehicle) {
        Ok(v) => (v.health, v.max_health),
        Err(_) => return outcome,
    };
    bus.publish(GameEvent::VehicleHealthChanged { health, max_health });

    if outcome == DamageOutcome::Lethal {
        if let Ok(mut vel) = world.get::<&mut Velocity>(vehicle) {
            *vel = Velocity::ZERO;
        }
        info!("vehicle destroyed");
        bus.publish(GameEvent::VehicleDestroyed);
    }
    outcome
}

/// Damage an enemy. A lethal hit starts its destruction sequence.
#[allow(clippy::too_many_arguments)]
pub fn damage_enemy(
    world: &mut World,
    enemies: &Pool<EnemyFactory>,
    scheduler: &mut Scheduler,
    bus: &mut EventBus,
    stats: &mut RoundStats,
    entity: Entity,
    amount: f64,
    frame: u64,
) -> DamageOutcome {
    let Some(token) = enemies.token(world, entity) else {
        return DamageOutcome::Ignored;
    };
    let (outcome, _) = apply_damage::<Enemy>(world, entity, amount);
    let id = entity.to_bits().get();

    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Damaged { health } => {
            bus.publish(GameEvent::EnemyDamaged { id, health });
        }
        DamageOutcome::Lethal => {
            bus.publish(GameEvent::EnemyDamaged { id, health: 0.0 });
            if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
                *vel = Velocity::ZERO;
            }
            let effect_secs = enemies
                .factory()
                .map(|f| f.config().death_effect_secs)
                .unwrap_or(0.0);
            let sequence = DeathSequence::begin(token, effect_secs, bus);
            scheduler.start(frame, sequence);
            stats.death_sequences_started += 1;
            debug!(?entity, "death sequence started");
        }
    }
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DeathPhase {
    /// Burst playing; particles scatter when it runs out.
    Burst { remaining: f64 },
    /// Scattered particles settling; kill is reported when it runs out.
    Linger { remaining: f64 },
}

/// Burst, scatter, linger, report the kill, then return the enemy to its pool.
///
/// Cancels silently if the enemy was reclaimed or its guard flag cleared
/// while suspended.
#[derive(Debug, Clone)]
pub struct DeathSequence {
    token: PoolToken,
    effect_secs: f64,
    phase: DeathPhase,
}

impl DeathSequence {
    /// First step: the guard flags are already up; start the burst.
    pub fn begin(token: PoolToken, effect_secs: f64, bus: &mut EventBus) -> Self {
        bus.publish(GameEvent::Effect {
            id: token.entity.to_bits().get(),
            cue: EffectCue::DeathBurst,
        });
        Self {
            token,
            effect_secs,
            phase: DeathPhase::Burst {
                remaining: DEATH_BURST_DELAY_SECS,
            },
        }
    }

    fn still_ours(&self, world: &World) -> bool {
        is_live(world, &self.token)
            && world
                .get::<&Enemy>(self.token.entity)
                .map(|e| e.dying)
                .unwrap_or(false)
    }
}

impl Sequence for DeathSequence {
    fn name(&self) -> &'static str {
        "death"
    }

    fn resume(&mut self, ctx: &mut SequenceContext<'_>) -> Step {
        if !self.still_ours(ctx.world) {
            debug!(entity = ?self.token.entity, "death sequence dropped; enemy reclaimed");
            return Step::Done;
        }
        let entity = self.token.entity;

        match &mut self.phase {
            DeathPhase::Burst { remaining } => {
                *remaining -= ctx.dt;
                if *remaining <= 0.0 {
                    ctx.bus.publish(GameEvent::Effect {
                        id: entity.to_bits().get(),
                        cue: EffectCue::DeathScatter,
                    });
                    self.phase = DeathPhase::Linger {
                        remaining: self.effect_secs,
                    };
                }
                Step::Yield
            }
            DeathPhase::Linger { remaining } => {
                *remaining -= ctx.dt;
                if *remaining > 0.0 {
                    return Step::Yield;
                }
                ctx.bus.publish(GameEvent::EnemyKilled { count: 1 });
                ctx.stats.enemies_killed += 1;
                ctx.enemies.release(ctx.world, entity);
                debug!(?entity, "enemy killed and returned to pool");
                Step::Done
            }
        }
    }
}
