//! State shared between the host and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use gauntlet_core::commands::PlayerCommand;
use gauntlet_core::state::GameStateSnapshot;

use crate::error::{AppError, Result};

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot, written by the loop thread after every frame.
pub type SharedSnapshot = Arc<Mutex<Option<GameStateSnapshot>>>;

/// Host-side handle to a running game loop.
///
/// The engine itself lives on the loop thread; the host only talks to it
/// through the command channel and reads the shared snapshot.
pub struct LoopHandle {
    command_tx: mpsc::Sender<GameLoopCommand>,
    latest_snapshot: SharedSnapshot,
    thread: Option<JoinHandle<()>>,
}

impl LoopHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<GameLoopCommand>,
        latest_snapshot: SharedSnapshot,
        thread: JoinHandle<()>,
    ) -> Self {
        Self {
            command_tx,
            latest_snapshot,
            thread: Some(thread),
        }
    }

    /// Forward a player command to the engine.
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.command_tx
            .send(GameLoopCommand::PlayerCommand(command))
            .map_err(|_| AppError::LoopStopped)
    }

    /// Latest snapshot, if the loop has produced one.
    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| AppError::LoopPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
