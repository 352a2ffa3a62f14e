//! Reusable entity pools.
//!
//! A pool hands out inactive entities from a FIFO store and builds new ones
//! through its [`PoolFactory`] when the store is empty. Every vended entity
//! carries a [`Pooled`] marker naming its owner, its activity flag, and a
//! generation counter that bumps on every release so suspended work can tell
//! a reclaimed entity from the one it started with.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use hecs::{Entity, World};
use serde::Serialize;
use tracing::{debug, error, warn};

use gauntlet_core::enums::PoolKind;
use gauntlet_core::error::ConfigError;
use gauntlet_core::state::PoolStats;

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one pool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolId(u32);

impl PoolId {
    fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ownership marker attached to every pooled entity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pooled {
    pub pool: PoolId,
    /// Inactive entities are never ticked, collided with, or shown.
    pub active: bool,
    pub generation: u32,
}

/// Liveness handle captured when suspended work starts on a pooled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolToken {
    pub entity: Entity,
    pub generation: u32,
}

/// True while the entity is still the same active instance the token was taken from.
pub fn is_live(world: &World, token: &PoolToken) -> bool {
    world
        .get::<&Pooled>(token.entity)
        .map(|p| p.active && p.generation == token.generation)
        .unwrap_or(false)
}

/// True if the entity is pooled and currently vended.
pub fn is_active(world: &World, entity: Entity) -> bool {
    world
        .get::<&Pooled>(entity)
        .map(|p| p.active)
        .unwrap_or(false)
}

/// Construction and reset strategy for one kind of pooled entity.
pub trait PoolFactory {
    /// Spawn the components of a brand-new instance. The pool adds the [`Pooled`] marker.
    fn create(&mut self, world: &mut World) -> Entity;

    /// Clear every transient field back to its initialization default.
    fn reset(&mut self, world: &mut World, entity: Entity);
}

/// A pool of reusable entities of one kind.
pub struct Pool<F: PoolFactory> {
    id: PoolId,
    kind: PoolKind,
    factory: Option<F>,
    store: VecDeque<Entity>,
    members: Vec<Entity>,
    active: usize,
    config_error: Option<ConfigError>,
}

impl<F: PoolFactory> Pool<F> {
    /// Create a pool. Without a factory the pool is permanently disabled and
    /// every `acquire` returns `None`.
    pub fn new(kind: PoolKind, factory: Option<F>) -> Self {
        let config_error = if factory.is_none() {
            let err = ConfigError::MissingTemplate(kind);
            error!(?kind, "{err}");
            Some(err)
        } else {
            None
        };
        Self {
            id: PoolId::next(),
            kind,
            factory,
            store: VecDeque::new(),
            members: Vec::new(),
            active: 0,
            config_error,
        }
    }

    /// Build `count` inactive instances up front.
    pub fn prewarm(&mut self, world: &mut World, count: usize) {
        for _ in 0..count {
            if let Some(entity) = self.create(world, false) {
                self.store.push_back(entity);
            }
        }
    }

    /// Take the oldest released instance, or build a new one if the store is empty.
    pub fn acquire(&mut self, world: &mut World) -> Option<Entity> {
        self.factory.as_ref()?;

        while let Some(entity) = self.store.pop_front() {
            let reused = match world.get::<&mut Pooled>(entity) {
                Ok(mut pooled) if pooled.pool == self.id && !pooled.active => {
                    pooled.active = true;
                    true
                }
                _ => false,
            };
            if reused {
                self.active += 1;
                return Some(entity);
            }
            // Despawned behind our back; forget it.
            self.members.retain(|&m| m != entity);
        }

        let entity = self.create(world, true)?;
        self.active += 1;
        Some(entity)
    }

    /// Reset and return an entity to the store. Ignored (and logged) if the
    /// entity belongs to another pool or is already inactive.
    pub fn release(&mut self, world: &mut World, entity: Entity) -> bool {
        let owner = world
            .get::<&Pooled>(entity)
            .map(|p| (p.pool, p.active))
            .ok();
        match owner {
            Some((pool, _)) if pool != self.id => {
                warn!(kind = ?self.kind, ?entity, "release of an entity owned by another pool ignored");
                return false;
            }
            None => {
                warn!(kind = ?self.kind, ?entity, "release of a non-pooled entity ignored");
                return false;
            }
            Some((_, false)) => {
                warn!(kind = ?self.kind, ?entity, "release of an inactive entity ignored");
                return false;
            }
            Some((_, true)) => {}
        }

        if let Some(factory) = self.factory.as_mut() {
            factory.reset(world, entity);
        }
        if let Ok(mut pooled) = world.get::<&mut Pooled>(entity) {
            pooled.active = false;
            pooled.generation = pooled.generation.wrapping_add(1);
        }
        self.active = self.active.saturating_sub(1);
        self.store.push_back(entity);
        true
    }

    /// Release every vended instance. Returns how many were released.
    pub fn release_all(&mut self, world: &mut World) -> usize {
        let vended: Vec<Entity> = self
            .members
            .iter()
            .copied()
            .filter(|&e| is_active(world, e))
            .collect();
        vended
            .into_iter()
            .filter(|&e| self.release(world, e))
            .count()
    }

    /// Liveness token for a vended entity of this pool.
    pub fn token(&self, world: &World, entity: Entity) -> Option<PoolToken> {
        let pooled = world.get::<&Pooled>(entity).ok()?;
        (pooled.pool == self.id && pooled.active).then_some(PoolToken {
            entity,
            generation: pooled.generation,
        })
    }

    /// True if this pool vended the entity and it has not been released since.
    pub fn owns_active(&self, world: &World, entity: Entity) -> bool {
        world
            .get::<&Pooled>(entity)
            .map(|p| p.pool == self.id && p.active)
            .unwrap_or(false)
    }

    /// True if the entity is waiting in this pool's store.
    pub fn is_free(&self, entity: Entity) -> bool {
        self.store.contains(&entity)
    }

    pub fn id(&self) -> PoolId {
        self.id
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// False when no template was configured.
    pub fn is_enabled(&self) -> bool {
        self.factory.is_some()
    }

    pub fn config_error(&self) -> Option<&ConfigError> {
        self.config_error.as_ref()
    }

    pub fn factory(&self) -> Option<&F> {
        self.factory.as_ref()
    }

    /// Instances currently vended.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Instances waiting in the store.
    pub fn free_count(&self) -> usize {
        self.store.len()
    }

    /// Instances ever constructed and still alive in the world.
    pub fn created_count(&self) -> usize {
        self.members.len()
    }

    /// Vended instances, in construction order.
    pub fn active_members<'a>(&'a self, world: &'a World) -> impl Iterator<Item = Entity> + 'a {
        self.members
            .iter()
            .copied()
            .filter(move |&e| self.owns_active(world, e))
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active,
            free: self.store.len(),
            created: self.members.len(),
        }
    }

    fn create(&mut self, world: &mut World, active: bool) -> Option<Entity> {
        let factory = self.factory.as_mut()?;
        let entity = factory.create(world);
        let marker = Pooled {
            pool: self.id,
            active,
            generation: 0,
        };
        world.insert_one(entity, marker).ok()?;
        self.members.push(entity);
        debug!(kind = ?self.kind, ?entity, total = self.members.len(), "pool grew");
        Some(entity)
    }
}
