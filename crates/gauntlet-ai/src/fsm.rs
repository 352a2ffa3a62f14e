//! Enemy behaviour finite state machine.
//!
//! A `Brain` holds the current state and its timers. Each frame the caller
//! fills an [`EnemyContext`] and calls [`Brain::update`], which returns the
//! movement and attack intents for that frame. No ECS dependency.

use gauntlet_core::enums::{AnimationCue, EnemyState};
use gauntlet_core::types::{Position, Velocity};

use crate::profiles::EnemyProfile;
use crate::steering::{ease_yaw, pursue, yaw_toward};

/// Input to the FSM for a single enemy.
#[derive(Debug, Clone)]
pub struct EnemyContext {
    pub position: Position,
    pub yaw: f64,
    /// Target position, or `None` if the target reference is no longer valid.
    pub target: Option<Position>,
    /// Frame delta (seconds).
    pub dt: f64,
}

impl EnemyContext {
    /// Horizontal distance to the target. Vertical separation is ignored.
    pub fn distance_to_target(&self) -> Option<f64> {
        self.target
            .as_ref()
            .map(|t| self.position.horizontal_range_to(t))
    }
}

/// A completed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EnemyState,
    pub to: EnemyState,
}

/// Output from one FSM update.
#[derive(Debug, Clone, PartialEq)]
pub struct BrainOutput {
    /// Desired horizontal velocity.
    pub velocity: Velocity,
    pub yaw: f64,
    /// Strike the target with `attack_damage` this frame.
    pub attack: bool,
    pub transition: Option<Transition>,
    pub animation: Option<AnimationCue>,
}

/// Per-enemy behaviour state. Exactly one state is current at any time.
#[derive(Debug, Clone, Default)]
pub struct Brain {
    state: EnemyState,
    /// Seconds since the current state was entered.
    time_in_state: f64,
    /// Idle: seconds since the last distance check.
    since_check: f64,
    /// Attack: seconds since the last strike.
    since_attack: f64,
}

impl Brain {
    /// A fresh brain in Idle.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    /// Return to Idle with every timer cleared. Used when an enemy goes back to its pool.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the FSM by one frame. At most one transition happens per call.
    pub fn update(&mut self, ctx: &EnemyContext, profile: &EnemyProfile) -> BrainOutput {
        self.time_in_state += ctx.dt;

        let mut out = BrainOutput {
            velocity: Velocity::ZERO,
            yaw: ctx.yaw,
            attack: false,
            transition: None,
            animation: None,
        };

        let distance = match (ctx.target.as_ref(), ctx.distance_to_target()) {
            (Some(target), Some(d)) => {
                if self.state != EnemyState::Idle {
                    if let Some(facing) = yaw_toward(&ctx.position, target) {
                        out.yaw = ease_yaw(ctx.yaw, facing, profile.rotation_speed, ctx.dt);
                    }
                }
                d
            }
            _ => {
                // Lost target: fall back to Idle instead of faulting.
                if self.state != EnemyState::Idle {
                    self.change_state(EnemyState::Idle, &mut out);
                }
                return out;
            }
        };

        match self.state {
            EnemyState::Idle => {
                self.since_check += ctx.dt;
                if self.since_check >= profile.idle_check_interval_secs {
                    self.since_check = 0.0;
                    if distance <= profile.detection_range {
                        self.change_state(EnemyState::Chase, &mut out);
                    }
                }
            }
            EnemyState::Chase => {
                if distance <= profile.attack_range {
                    self.change_state(EnemyState::Attack, &mut out);
                } else if distance > profile.detection_range {
                    self.change_state(EnemyState::Idle, &mut out);
                } else if let Some(target) = ctx.target.as_ref() {
                    out.velocity = pursue(&ctx.position, target, profile.chase_speed);
                }
            }
            EnemyState::Attack => {
                if distance > profile.attack_range {
                    self.change_state(EnemyState::Chase, &mut out);
                } else {
                    self.since_attack += ctx.dt;
                    if self.since_attack >= profile.attack_cooldown_secs {
                        self.strike(&mut out);
                    }
                }
            }
        }

        out
    }

    /// Exit the current state fully, then enter `next`.
    fn change_state(&mut self, next: EnemyState, out: &mut BrainOutput) {
        let from = self.state;
        self.exit(out);
        self.state = next;
        self.time_in_state = 0.0;
        self.enter(out);
        out.transition = Some(Transition { from, to: next });
    }

    fn exit(&mut self, out: &mut BrainOutput) {
        // No state carries motion into the next one.
        out.velocity = Velocity::ZERO;
    }

    fn enter(&mut self, out: &mut BrainOutput) {
        match self.state {
            EnemyState::Idle => {
                self.since_check = 0.0;
                out.animation = Some(AnimationCue::Idle);
            }
            EnemyState::Chase => {
                out.animation = Some(AnimationCue::Run);
            }
            EnemyState::Attack => {
                self.strike(out);
            }
        }
    }

    fn strike(&mut self, out: &mut BrainOutput) {
        self.since_attack = 0.0;
        out.attack = true;
        out.animation = Some(AnimationCue::Attack);
    }
}
