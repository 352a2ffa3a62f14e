//! Game loop thread: runs the simulation engine at the render-frame rate and
//! publishes snapshots.
//!
//! The engine is created inside this thread; its event bus holds
//! non-`Send` handlers, so it never crosses threads. Commands arrive via an
//! `mpsc` channel. Snapshots are handed to a sink and stored in shared state
//! for synchronous polling.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use gauntlet_core::config::GameConfig;
use gauntlet_core::constants::DEFAULT_FRAME_DT;
use gauntlet_core::state::GameStateSnapshot;
use gauntlet_sim::engine::SimulationEngine;

use crate::error::{AppError, Result};
use crate::state::{GameLoopCommand, LoopHandle, SharedSnapshot};

/// Nominal wall-clock duration of one frame.
const FRAME_DURATION: Duration = Duration::from_nanos((DEFAULT_FRAME_DT * 1e9) as u64);

/// Spawns the game loop in a new thread.
///
/// `on_snapshot` is called on the loop thread after every frame.
pub fn spawn_game_loop<S>(config: GameConfig, on_snapshot: S) -> Result<LoopHandle>
where
    S: FnMut(&GameStateSnapshot) + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_snapshot: SharedSnapshot = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name("gauntlet-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &shared, on_snapshot);
        })
        .map_err(AppError::Spawn)?;

    Ok(LoopHandle::new(cmd_tx, latest_snapshot, thread))
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop<S>(
    config: GameConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
    mut on_snapshot: S,
) where
    S: FnMut(&GameStateSnapshot),
{
    let mut engine = SimulationEngine::new(config);
    let mut next_frame_time = Instant::now();
    info!("game loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => {
                    engine.queue_command(cmd);
                }
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!(frame = engine.time().frame, "game loop stopped");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one frame
        let snapshot = engine.tick(DEFAULT_FRAME_DT);

        // 3. Hand the snapshot to the presentation layer
        on_snapshot(&snapshot);

        // 4. Store latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 5. Sleep until next frame
        next_frame_time += FRAME_DURATION;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else if now - next_frame_time > FRAME_DURATION * 2 {
            // Too far behind; reset to avoid catch-up spiral
            debug!("game loop fell behind; resetting schedule");
            next_frame_time = now;
        }
    }
}
