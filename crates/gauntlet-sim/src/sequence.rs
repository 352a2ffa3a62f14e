//! Cooperative multi-step sequences.
//!
//! A sequence does its first step synchronously when it is started, then is
//! resumed once per frame from the frame after, until it reports
//! [`Step::Done`]. Sequences that act on pooled entities hold a
//! [`PoolToken`](crate::pool::PoolToken) and must check it on every resume.

use hecs::World;

use gauntlet_core::state::RoundStats;

use crate::event_bus::EventBus;
use crate::pool::Pool;
use crate::systems::spawner::Spawner;
use crate::world_setup::EnemyFactory;

/// Result of one resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Suspend until the next frame.
    Yield,
    /// Finished (or cancelled); drop the sequence.
    Done,
}

/// Everything a sequence may touch while resumed.
pub struct SequenceContext<'a> {
    pub world: &'a mut World,
    pub bus: &'a mut EventBus,
    pub enemies: &'a mut Pool<EnemyFactory>,
    pub spawner: &'a mut Spawner,
    pub stats: &'a mut RoundStats,
    /// Frame delta (seconds).
    pub dt: f64,
    /// Frame clock (seconds).
    pub now: f64,
    pub frame: u64,
}

pub trait Sequence {
    fn name(&self) -> &'static str;

    fn resume(&mut self, ctx: &mut SequenceContext<'_>) -> Step;
}

struct Task {
    started_frame: u64,
    sequence: Box<dyn Sequence>,
}

/// Runs suspended sequences once per frame.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sequence whose first step already ran during `frame`.
    pub fn start(&mut self, frame: u64, sequence: impl Sequence + 'static) {
        self.tasks.push(Task {
            started_frame: frame,
            sequence: Box::new(sequence),
        });
    }

    /// Resume every sequence started before this frame.
    pub fn run(&mut self, ctx: &mut SequenceContext<'_>) {
        let frame = ctx.frame;
        self.tasks
            .retain_mut(|task| task.started_frame == frame || task.sequence.resume(ctx) == Step::Yield);
    }

    /// Drop everything. Used on round teardown.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of pending sequences with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.sequence.name() == name)
            .count()
    }
}
