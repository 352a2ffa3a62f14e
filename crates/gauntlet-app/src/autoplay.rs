//! Headless autopilot: plays rounds from snapshots alone.
//!
//! The [`Pilot`] only sees what a player would see (the snapshot) and answers
//! with player commands, so the same logic drives both the in-thread runner
//! and the real-time game loop.

use serde::Serialize;
use tracing::{debug, info};

use gauntlet_core::commands::PlayerCommand;
use gauntlet_core::config::GameConfig;
use gauntlet_core::constants::DEFAULT_FRAME_DT;
use gauntlet_core::enums::GameState;
use gauntlet_core::state::{EnemyView, GameStateSnapshot, RoundStats};
use gauntlet_sim::engine::SimulationEngine;

/// Aim-and-shoot policy.
#[derive(Debug, Clone)]
pub struct Pilot {
    /// Only enemies this close (horizontal meters) are engaged.
    pub engage_range: f64,
    /// Minimum frames between fire commands.
    pub fire_every_frames: u32,
    frames_since_fire: u32,
}

impl Pilot {
    pub fn new(engage_range: f64, fire_every_frames: u32) -> Self {
        Self {
            engage_range,
            fire_every_frames,
            frames_since_fire: fire_every_frames,
        }
    }

    /// Commands for the next frame.
    pub fn decide(&mut self, snapshot: &GameStateSnapshot) -> Vec<PlayerCommand> {
        match snapshot.state {
            GameState::Menu => return vec![PlayerCommand::StartRound],
            GameState::Playing => {}
            GameState::GameOver | GameState::Win => return Vec::new(),
        }

        self.frames_since_fire = self.frames_since_fire.saturating_add(1);
        let Some(target) = self.pick_target(snapshot) else {
            return Vec::new();
        };

        let mut commands = vec![PlayerCommand::AimAt {
            x: target.position.x,
            y: target.position.y,
        }];
        if snapshot.turret.can_fire && self.frames_since_fire >= self.fire_every_frames {
            self.frames_since_fire = 0;
            commands.push(PlayerCommand::Fire);
        }
        commands
    }

    /// Nearest living enemy ahead of the vehicle, within engage range.
    fn pick_target<'a>(&self, snapshot: &'a GameStateSnapshot) -> Option<&'a EnemyView> {
        let vehicle = &snapshot.vehicle.position;
        snapshot
            .enemies
            .iter()
            .filter(|e| !e.dying && e.position.y >= vehicle.y)
            .map(|e| (e, e.position.horizontal_range_to(vehicle)))
            .filter(|(_, d)| *d <= self.engage_range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new(12.0, 6)
    }
}

/// Outcome of one autoplayed round.
#[derive(Debug, Clone, Serialize)]
pub struct AutoplayReport {
    pub seed: u64,
    pub state: GameState,
    pub round: u32,
    pub frames: u64,
    pub elapsed_secs: f64,
    pub distance_travelled: f64,
    pub vehicle_health: f64,
    pub stats: RoundStats,
}

/// Play one round in the calling thread, as fast as possible, until it ends
/// or `max_secs` of simulated time pass.
pub fn run_autoplay(config: GameConfig, pilot: &mut Pilot, max_secs: f64) -> AutoplayReport {
    let seed = config.seed;
    let mut engine = SimulationEngine::new(config);
    let mut snapshot = engine.tick(DEFAULT_FRAME_DT);

    while !snapshot.state.is_finished() && snapshot.time.elapsed_secs < max_secs {
        engine.queue_commands(pilot.decide(&snapshot));
        snapshot = engine.tick(DEFAULT_FRAME_DT);
        for event in &snapshot.events {
            debug!(frame = snapshot.time.frame, event = event.name(), "event");
        }
    }

    info!(
        state = ?snapshot.state,
        secs = snapshot.time.elapsed_secs,
        killed = snapshot.stats.enemies_killed,
        "autoplay finished"
    );
    report(seed, &snapshot)
}

/// Summarize a snapshot.
pub fn report(seed: u64, snapshot: &GameStateSnapshot) -> AutoplayReport {
    AutoplayReport {
        seed,
        state: snapshot.state,
        round: snapshot.round,
        frames: snapshot.time.frame,
        elapsed_secs: snapshot.time.elapsed_secs,
        distance_travelled: snapshot.vehicle.distance_travelled,
        vehicle_health: snapshot.vehicle.health,
        stats: snapshot.stats.clone(),
    }
}
