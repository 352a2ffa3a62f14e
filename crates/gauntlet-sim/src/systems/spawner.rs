//! Enemy spawner: paces enemy introduction against time, the vehicle's
//! position, and a per-round budget.
//!
//! The spawn budget ("no more will spawn") and the alive counter ("all are
//! gone") are separate. The alive counter is fed by an event-bus subscription
//! and the level completes only when both reach zero.

use std::cell::Cell;
use std::rc::Rc;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use gauntlet_core::components::Vehicle;
use gauntlet_core::config::{LevelConfig, Span};
use gauntlet_core::enums::AnimationCue;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::{RoundStats, SpawnerView};
use gauntlet_core::types::Position;

use crate::event_bus::{EventBus, Scope, SubscriptionId};
use crate::pool::Pool;
use crate::world_setup::{EnemyFactory, Target};

pub struct Spawner {
    level: LevelConfig,
    active: bool,
    /// Spawns still allowed this round.
    budget: u32,
    last_spawn_secs: f64,
    target: Option<Entity>,
    level_end_y: f64,
    alive: Rc<Cell<u32>>,
    reported_alive: u32,
    completed: bool,
    subscription: Option<SubscriptionId>,
}

impl Spawner {
    pub fn new(level: LevelConfig) -> Self {
        Self {
            level,
            active: false,
            budget: 0,
            last_spawn_secs: 0.0,
            target: None,
            level_end_y: 0.0,
            alive: Rc::new(Cell::new(0)),
            reported_alive: 0,
            completed: false,
            subscription: None,
        }
    }

    /// Arm spawning against `target`: refill the budget, zero the alive
    /// counter, and start the interval clock at `now`.
    pub fn begin(&mut self, target: Entity, level_start_y: f64, now: f64, bus: &mut EventBus) {
        self.active = true;
        self.budget = self.level.enemy_count;
        self.last_spawn_secs = now;
        self.target = Some(target);
        self.level_end_y = level_start_y + self.level.length;
        self.alive.set(0);
        self.reported_alive = 0;
        self.completed = false;

        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
        let alive = Rc::clone(&self.alive);
        self.subscription = Some(bus.subscribe(Scope::Round, move |event| match event {
            GameEvent::EnemyKilled { count } | GameEvent::EnemyEscaped { count } => {
                alive.set(alive.get().saturating_sub(*count));
            }
            _ => {}
        }));

        info!(budget = self.budget, "spawner armed");
    }

    /// Disarm. Enemies already on the track are unaffected.
    pub fn stop(&mut self) {
        if self.active {
            debug!(budget = self.budget, "spawner stopped");
        }
        self.active = false;
    }

    /// Forget the round entirely. Round-scoped subscriptions are torn down by the bus.
    pub fn reset(&mut self, bus: &mut EventBus) {
        self.stop();
        if let Some(id) = self.subscription.take() {
            bus.unsubscribe(id);
        }
        self.budget = 0;
        self.target = None;
        self.alive.set(0);
        self.reported_alive = 0;
        self.completed = false;
    }

    /// One frame of spawn pacing. Returns the enemy spawned this frame, if any.
    pub fn run(
        &mut self,
        world: &mut World,
        enemies: &mut Pool<EnemyFactory>,
        rng: &mut ChaCha8Rng,
        bus: &mut EventBus,
        stats: &mut RoundStats,
        now: f64,
    ) -> Option<Entity> {
        self.report_alive(bus);

        if self.target.is_some() && !self.completed && self.budget == 0 && self.alive.get() == 0 {
            self.completed = true;
            self.stop();
            info!("level completed");
            bus.publish(GameEvent::LevelCompleted);
        }

        if !self.active || self.budget == 0 {
            return None;
        }
        if now - self.last_spawn_secs < self.level.spawn_interval_secs {
            return None;
        }

        let target = self.target?;
        let anchor = resolve_target(world, target)?;
        let entity = enemies.acquire(world)?;
        let position = self.spawn_position(rng, &anchor);

        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            *pos = position;
        }
        let assigned = Target::assign(world, target);
        if let Ok(mut t) = world.get::<&mut Target>(entity) {
            *t = assigned;
        }

        self.budget -= 1;
        self.last_spawn_secs = now;
        self.alive.set(self.alive.get() + 1);
        stats.enemies_spawned += 1;

        let id = entity.to_bits().get();
        bus.publish(GameEvent::EnemySpawned { id, position });
        bus.publish(GameEvent::Animation {
            id,
            cue: AnimationCue::Idle,
        });
        self.report_alive(bus);
        debug!(?entity, x = position.x, y = position.y, budget = self.budget, "enemy spawned");

        Some(entity)
    }

    /// Lateral offset from the x window; longitudinal offset ahead of the
    /// anchor from the y window, never past the end of the level.
    pub fn spawn_position(&self, rng: &mut ChaCha8Rng, anchor: &Position) -> Position {
        let x = sample(rng, self.level.spawn_range_x);
        let y = (anchor.y + sample(rng, self.level.spawn_range_y)).min(self.level_end_y);
        Position::new(x, y, 0.0)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn alive(&self) -> u32 {
        self.alive.get()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn view(&self) -> SpawnerView {
        SpawnerView {
            active: self.active,
            budget: self.budget,
            alive: self.alive.get(),
        }
    }

    fn report_alive(&mut self, bus: &mut EventBus) {
        let alive = self.alive.get();
        if alive != self.reported_alive {
            self.reported_alive = alive;
            bus.publish(GameEvent::AliveCountChanged { alive });
        }
    }
}

/// Position of a still-valid target. Destroyed or despawned vehicles read as `None`.
pub fn resolve_target(world: &World, target: Entity) -> Option<Position> {
    let alive = world
        .get::<&Vehicle>(target)
        .map(|v| !v.destroyed)
        .unwrap_or(false);
    if !alive {
        return None;
    }
    world.get::<&Position>(target).ok().map(|p| *p)
}

/// Uniform sample from a span. Degenerate, inverted or unbounded spans yield
/// `min`, or 0 when `min` itself is not finite.
fn sample(rng: &mut ChaCha8Rng, span: Span) -> f64 {
    if !span.width().is_finite() {
        return if span.min.is_finite() { span.min } else { 0.0 };
    }
    if span.max > span.min {
        rng.gen_range(span.min..span.max)
    } else {
        span.min
    }
}
