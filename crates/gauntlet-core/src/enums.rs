//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy behaviour state. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Not engaging; periodically checks whether the target is in detection range.
    #[default]
    Idle,
    /// Closing on the target.
    Chase,
    /// Holding position and striking the target on a cooldown.
    Attack,
}

/// Round state (top-level).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Menu,
    Playing,
    GameOver,
    Win,
}

impl GameState {
    /// Terminal states only leave through an explicit restart.
    pub fn is_finished(self) -> bool {
        matches!(self, GameState::GameOver | GameState::Win)
    }
}

/// Animation trigger for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationCue {
    Idle,
    Run,
    Attack,
}

/// Visual effect cue raised by multi-step sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCue {
    /// Death effect starts playing.
    DeathBurst,
    /// Death particles get gravity and random outward velocity.
    DeathScatter,
    MuzzleFlash,
}

/// Which pool an entity was vended by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Enemy,
    Projectile,
}
