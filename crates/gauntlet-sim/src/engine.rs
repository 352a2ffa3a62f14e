//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, the pools, the event bus and
//! the sequence scheduler. It processes commands at frame boundaries, runs
//! frame systems then fixed-step systems, and produces `GameStateSnapshot`s.
//! Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use gauntlet_ai::profiles::EnemyProfile;
use gauntlet_core::commands::PlayerCommand;
use gauntlet_core::components::Vehicle;
use gauntlet_core::config::GameConfig;
use gauntlet_core::constants::{ENEMY_RECYCLE_BEHIND, FIXED_DT, MAX_FIXED_STEPS_PER_FRAME};
use gauntlet_core::enums::{GameState, PoolKind};
use gauntlet_core::error::ConfigError;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::{GameStateSnapshot, PoolsView, RoundStats};
use gauntlet_core::types::{Position, SimTime};

use crate::combat::{self, DamageOutcome};
use crate::event_bus::EventBus;
use crate::pool::Pool;
use crate::sequence::{Scheduler, SequenceContext};
use crate::systems;
use crate::systems::collision::{OverlapDetector, SphereOverlap};
use crate::systems::snapshot::SnapshotInputs;
use crate::systems::spawner::Spawner;
use crate::systems::vehicle::TakeoffRamp;
use crate::world_setup::{self, EnemyFactory, ProjectileFactory};

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    config: GameConfig,
    config_errors: Vec<ConfigError>,
    time: SimTime,
    state: GameState,
    round: u32,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    /// Unconsumed frame time for the fixed-step loop.
    accumulator: f64,
    vehicle: Entity,
    enemies: Pool<EnemyFactory>,
    projectiles: Pool<ProjectileFactory>,
    profile: EnemyProfile,
    spawner: Spawner,
    scheduler: Scheduler,
    bus: EventBus,
    overlap: Box<dyn OverlapDetector>,
    stats: RoundStats,
}

impl SimulationEngine {
    /// Create a new engine from an immutable configuration snapshot.
    /// Configuration problems are logged and kept, never fatal.
    pub fn new(config: GameConfig) -> Self {
        let config_errors = config.validate();
        for err in &config_errors {
            // Pools report their own missing templates.
            if !matches!(err, ConfigError::MissingTemplate(_)) {
                error!("{err}");
            }
        }

        let mut world = World::new();
        let vehicle = world_setup::spawn_vehicle(&mut world, &config.vehicle, Position::default());

        let mut enemies = Pool::new(
            PoolKind::Enemy,
            config.enemy.clone().map(EnemyFactory::new),
        );
        enemies.prewarm(&mut world, config.pools.enemy_prewarm);

        let mut projectiles = Pool::new(
            PoolKind::Projectile,
            config.projectile.clone().map(ProjectileFactory::new),
        );
        projectiles.prewarm(&mut world, config.pools.projectile_prewarm);

        let profile = config
            .enemy
            .as_ref()
            .map(EnemyProfile::from_config)
            .unwrap_or_default();

        Self {
            world,
            config_errors,
            time: SimTime::default(),
            state: GameState::default(),
            round: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            accumulator: 0.0,
            vehicle,
            enemies,
            projectiles,
            profile,
            spawner: Spawner::new(config.level.clone()),
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            overlap: Box::new(SphereOverlap),
            stats: RoundStats::default(),
            config,
        }
    }

    /// Queue a command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one rendered frame of `frame_dt` seconds and return the resulting snapshot.
    ///
    /// Order within a frame: queued commands, frame update (sequences, turret,
    /// spawner, AI, lifetimes, cleanup), then as many fixed physics steps as
    /// the accumulated time allows, then round-end checks.
    pub fn tick(&mut self, frame_dt: f64) -> GameStateSnapshot {
        let dt = if frame_dt.is_finite() && frame_dt > 0.0 {
            frame_dt
        } else {
            0.0
        };
        self.time.advance_frame(dt);
        self.process_commands();

        if self.state == GameState::Playing {
            self.update(dt);
            self.run_fixed_steps(dt);
            self.check_round_end();
        }

        let events = self.bus.drain_journal();
        self.build_snapshot(events)
    }

    // --- Round control ---

    /// Leave the menu and start the first round. Ignored outside the menu.
    pub fn start_round(&mut self) -> bool {
        if self.state != GameState::Menu {
            debug!(state = ?self.state, "start_round ignored");
            return false;
        }
        self.begin_round();
        true
    }

    /// Tear the current round down and start a fresh one.
    pub fn restart_round(&mut self) {
        self.teardown_round();
        self.begin_round();
    }

    /// End the current round. Ignored unless a round is being played.
    pub fn end_round(&mut self, won: bool) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        systems::vehicle::stop(&mut self.world, self.vehicle);
        self.spawner.stop();
        self.set_state(if won {
            GameState::Win
        } else {
            GameState::GameOver
        });
        info!(
            round = self.round,
            won,
            killed = self.stats.enemies_killed,
            fired = self.stats.projectiles_fired,
            "round ended"
        );
        true
    }

    // --- Turret ---

    /// Fire once. No-op outside a round, on cooldown, or without a projectile template.
    pub fn fire(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        systems::turret::fire(
            &mut self.world,
            self.vehicle,
            &self.config.turret,
            &mut self.projectiles,
            &mut self.rng,
            &mut self.scheduler,
            &mut self.bus,
            &mut self.stats,
            self.time.elapsed_secs,
            self.time.frame,
        )
        .is_some()
    }

    /// Turn the turret toward a point on the track plane.
    pub fn aim_at(&mut self, x: f64, y: f64) -> bool {
        systems::turret::aim_at(&mut self.world, self.vehicle, Position::new(x, y, 0.0))
    }

    // --- Combat entry points for hosts with their own physics ---

    /// Resolve a projectile/enemy overlap detected outside the engine.
    pub fn report_hit(&mut self, projectile: Entity, enemy: Entity) -> bool {
        systems::collision::resolve_hit(
            &mut self.world,
            &mut self.projectiles,
            &self.enemies,
            &mut self.scheduler,
            &mut self.bus,
            &mut self.stats,
            self.time.frame,
            projectile,
            enemy,
        )
    }

    /// Apply damage to an enemy directly.
    pub fn damage_enemy(&mut self, enemy: Entity, amount: f64) -> DamageOutcome {
        combat::damage_enemy(
            &mut self.world,
            &self.enemies,
            &mut self.scheduler,
            &mut self.bus,
            &mut self.stats,
            enemy,
            amount,
            self.time.frame,
        )
    }

    /// Apply damage to the vehicle directly.
    pub fn damage_vehicle(&mut self, amount: f64) -> DamageOutcome {
        combat::damage_vehicle(
            &mut self.world,
            self.vehicle,
            amount,
            &mut self.bus,
            &mut self.stats,
        )
    }

    /// Replace the overlap query used by the fixed-step collision system.
    pub fn set_overlap_detector(&mut self, detector: Box<dyn OverlapDetector>) {
        self.overlap = detector;
    }

    // --- Accessors ---

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Every configuration problem found at construction.
    pub fn config_errors(&self) -> &[ConfigError] {
        &self.config_errors
    }

    pub fn stats(&self) -> &RoundStats {
        &self.stats
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn vehicle(&self) -> Entity {
        self.vehicle
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn enemy_pool(&self) -> &Pool<EnemyFactory> {
        &self.enemies
    }

    pub fn projectile_pool(&self) -> &Pool<ProjectileFactory> {
        &self.projectiles
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Subscribe outer-layer consumers (UI, audio) to lifecycle events.
    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Place an enemy directly, bypassing the spawner's pacing (for tests).
    #[cfg(test)]
    pub fn spawn_enemy_at(&mut self, position: Position) -> Option<Entity> {
        let entity = self.enemies.acquire(&mut self.world)?;
        if let Ok(mut pos) = self.world.get::<&mut Position>(entity) {
            *pos = position;
        }
        let assigned = world_setup::Target::assign(&self.world, self.vehicle);
        if let Ok(mut target) = self.world.get::<&mut world_setup::Target>(entity) {
            *target = assigned;
        }
        Some(entity)
    }

    /// Return an enemy to its pool out of band (for tests).
    #[cfg(test)]
    pub fn force_recycle(&mut self, enemy: Entity) -> bool {
        self.enemies.release(&mut self.world, enemy)
    }

    // --- Internals ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartRound => {
                self.start_round();
            }
            PlayerCommand::RestartRound => self.restart_round(),
            PlayerCommand::EndRound { won } => {
                self.end_round(won);
            }
            PlayerCommand::Fire => {
                self.fire();
            }
            PlayerCommand::AimAt { x, y } => {
                self.aim_at(x, y);
            }
        }
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        self.bus.publish(GameEvent::GameStateChanged { from, to });
    }

    fn begin_round(&mut self) {
        self.round += 1;
        self.stats = RoundStats::default();
        self.accumulator = 0.0;
        self.set_state(GameState::Playing);

        match TakeoffRamp::begin(&mut self.world, self.vehicle, &self.config.vehicle) {
            Some(ramp) => self.scheduler.start(self.time.frame, ramp),
            None => warn!("vehicle could not take off"),
        }
        info!(round = self.round, "round started");
    }

    /// Cancel sequences, return everything to the pools, drop round-scoped
    /// subscriptions, and put the vehicle back on the start line.
    fn teardown_round(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        let enemies = self.enemies.release_all(&mut self.world);
        let projectiles = self.projectiles.release_all(&mut self.world);
        self.spawner.reset(&mut self.bus);
        let subscriptions = self.bus.teardown_round();

        world_setup::reset_vehicle(&mut self.world, self.vehicle, &self.config.vehicle);
        let max_health = self.config.vehicle.max_health;
        self.bus.publish(GameEvent::VehicleHealthChanged {
            health: max_health,
            max_health,
        });

        info!(
            cancelled,
            enemies, projectiles, subscriptions, "round torn down"
        );
    }

    fn update(&mut self, dt: f64) {
        let now = self.time.elapsed_secs;
        let frame = self.time.frame;

        {
            let mut ctx = SequenceContext {
                world: &mut self.world,
                bus: &mut self.bus,
                enemies: &mut self.enemies,
                spawner: &mut self.spawner,
                stats: &mut self.stats,
                dt,
                now,
                frame,
            };
            self.scheduler.run(&mut ctx);
        }

        systems::turret::rotate(&mut self.world, self.vehicle, &self.config.turret, dt);
        self.spawner.run(
            &mut self.world,
            &mut self.enemies,
            &mut self.rng,
            &mut self.bus,
            &mut self.stats,
            now,
        );
        systems::enemy_ai::run(
            &mut self.world,
            &self.profile,
            dt,
            &mut self.bus,
            &mut self.stats,
        );
        systems::projectiles::expire(&mut self.world, &mut self.projectiles, dt);

        let recycle_behind = self
            .config
            .enemy
            .as_ref()
            .map_or(ENEMY_RECYCLE_BEHIND, |e| e.recycle_behind);
        systems::cleanup::run(
            &mut self.world,
            self.vehicle,
            recycle_behind,
            &mut self.enemies,
            &mut self.bus,
            &mut self.stats,
        );
    }

    fn run_fixed_steps(&mut self, dt: f64) {
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= FIXED_DT && steps < MAX_FIXED_STEPS_PER_FRAME {
            self.fixed_update();
            self.accumulator -= FIXED_DT;
            self.time.advance_tick();
            steps += 1;
        }
        if self.accumulator >= FIXED_DT {
            debug!(backlog = self.accumulator, "fixed-step backlog dropped");
            self.accumulator = 0.0;
        }
    }

    fn fixed_update(&mut self) {
        systems::vehicle::steer(&mut self.world, self.vehicle, &self.config.vehicle);
        systems::movement::run(&mut self.world);
        systems::collision::run(
            &mut self.world,
            self.overlap.as_ref(),
            &mut self.projectiles,
            &self.enemies,
            &mut self.scheduler,
            &mut self.bus,
            &mut self.stats,
            self.time.frame,
        );
    }

    /// Loss reads the vehicle's own flag, so damage taken outside a played
    /// frame still ends the round.
    fn check_round_end(&mut self) {
        let destroyed = self
            .world
            .get::<&Vehicle>(self.vehicle)
            .map_or(true, |v| v.destroyed);
        let completed = self
            .bus
            .journal()
            .iter()
            .any(|e| matches!(e, GameEvent::LevelCompleted));

        if destroyed {
            self.end_round(false);
        } else if completed
            || systems::vehicle::distance_travelled(&self.world, self.vehicle)
                >= self.config.level.length
        {
            self.end_round(true);
        }
    }

    fn build_snapshot(&self, events: Vec<GameEvent>) -> GameStateSnapshot {
        let now = self.time.elapsed_secs;
        systems::snapshot::build_snapshot(
            &self.world,
            SnapshotInputs {
                time: self.time,
                state: self.state,
                round: self.round,
                vehicle: self.vehicle,
                turret: systems::turret::view(
                    &self.world,
                    self.vehicle,
                    &self.config.turret,
                    self.projectiles.is_enabled(),
                    now,
                ),
                spawner: self.spawner.view(),
                pools: PoolsView {
                    enemies: self.enemies.stats(),
                    projectiles: self.projectiles.stats(),
                },
                stats: self.stats.clone(),
                events,
            },
        )
    }
}
