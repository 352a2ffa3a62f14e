//! Tests for the simulation engine, pools, combat, sequences, and round control.

use hecs::World;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use gauntlet_ai::fsm::Brain;
use gauntlet_core::commands::PlayerCommand;
use gauntlet_core::components::{Enemy, Turret, Vehicle};
use gauntlet_core::config::{EnemyConfig, GameConfig, LevelConfig, Span, VehicleConfig};
use gauntlet_core::enums::*;
use gauntlet_core::error::ConfigError;
use gauntlet_core::events::GameEvent;
use gauntlet_core::state::RoundStats;
use gauntlet_core::types::{Position, Velocity};

use crate::combat::{DamageOutcome, Damageable};
use crate::engine::SimulationEngine;
use crate::event_bus::{EventBus, Scope};
use crate::pool::{is_live, Pool, Pooled};
use crate::systems::collision::OverlapDetector;
use crate::systems::spawner::Spawner;
use crate::world_setup::{self, EnemyFactory, Target};

const DT: f64 = 1.0 / 60.0;

/// Default config with spawning slowed to a crawl, so tests control every enemy.
fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.level.spawn_interval_secs = 1000.0;
    config
}

fn started(config: GameConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config);
    engine.queue_command(PlayerCommand::StartRound);
    engine.tick(DT);
    engine
}

/// Tick `frames` times and collect every event published along the way.
fn run_frames(engine: &mut SimulationEngine, frames: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend(engine.tick(DT).events);
    }
    events
}

fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn enemy_health(engine: &SimulationEngine, entity: hecs::Entity) -> f64 {
    engine.world().get::<&Enemy>(entity).unwrap().health
}

// ---- Pool ----

fn enemy_pool() -> Pool<EnemyFactory> {
    Pool::new(PoolKind::Enemy, Some(EnemyFactory::new(EnemyConfig::default())))
}

#[test]
fn test_pool_reuses_released_instance_with_fresh_state() {
    let mut world = World::new();
    let mut pool = enemy_pool();

    let first = pool.acquire(&mut world).unwrap();
    {
        let mut enemy = world.get::<&mut Enemy>(first).unwrap();
        enemy.health = 3.0;
        enemy.dying = true;
        enemy.collidable = false;
    }
    *world.get::<&mut Velocity>(first).unwrap() = Velocity::new(4.0, 4.0, 0.0);
    *world.get::<&mut Position>(first).unwrap() = Position::new(9.0, 9.0, 0.0);
    assert!(pool.release(&mut world, first));

    let again = pool.acquire(&mut world).unwrap();
    assert_eq!(again, first, "Empty store should hand back the released instance");

    let enemy = world.get::<&Enemy>(again).unwrap();
    assert_eq!(enemy.health, enemy.max_health);
    assert!(!enemy.dying);
    assert!(enemy.collidable);
    assert_eq!(*world.get::<&Velocity>(again).unwrap(), Velocity::ZERO);
    assert_eq!(*world.get::<&Position>(again).unwrap(), Position::default());
    assert_eq!(world.get::<&Brain>(again).unwrap().state(), EnemyState::Idle);
    assert_eq!(world.get::<&Pooled>(again).unwrap().generation, 1);
}

#[test]
fn test_pool_is_fifo() {
    let mut world = World::new();
    let mut pool = enemy_pool();
    pool.prewarm(&mut world, 3);
    assert_eq!(pool.free_count(), 3);

    let a = pool.acquire(&mut world).unwrap();
    let b = pool.acquire(&mut world).unwrap();
    pool.release(&mut world, b);
    pool.release(&mut world, a);

    let c = pool.acquire(&mut world).unwrap();
    assert_ne!(c, a);
    assert_ne!(c, b, "Oldest prewarmed instance comes out before released ones");
    assert_eq!(pool.acquire(&mut world), Some(b));
    assert_eq!(pool.acquire(&mut world), Some(a));
    assert_eq!(pool.created_count(), 3);
}

#[test]
fn test_pool_rejects_double_and_foreign_release() {
    let mut world = World::new();
    let mut pool = enemy_pool();
    let mut other = enemy_pool();

    let e = pool.acquire(&mut world).unwrap();
    assert!(!other.release(&mut world, e), "Foreign pool must not take it");
    assert!(pool.release(&mut world, e));
    assert!(!pool.release(&mut world, e), "Second release is ignored");
    assert_eq!(pool.free_count(), 1);

    let stranger = world.spawn((Position::default(),));
    assert!(!pool.release(&mut world, stranger));
    assert_eq!(pool.free_count(), 1);
}

#[test]
fn test_pool_token_goes_stale_on_release() {
    let mut world = World::new();
    let mut pool = enemy_pool();
    let e = pool.acquire(&mut world).unwrap();
    let token = pool.token(&world, e).unwrap();
    assert!(is_live(&world, &token));

    pool.release(&mut world, e);
    assert!(!is_live(&world, &token));
    assert!(pool.token(&world, e).is_none());

    // Reacquiring the same entity does not revive the old token.
    let again = pool.acquire(&mut world).unwrap();
    assert_eq!(again, e);
    assert!(!is_live(&world, &token));
}

#[test]
fn test_pool_without_template_is_disabled() {
    let mut world = World::new();
    let mut pool: Pool<EnemyFactory> = Pool::new(PoolKind::Enemy, None);
    pool.prewarm(&mut world, 5);
    assert!(!pool.is_enabled());
    assert_eq!(pool.acquire(&mut world), None);
    assert_eq!(pool.created_count(), 0);
    assert_eq!(
        pool.config_error(),
        Some(&ConfigError::MissingTemplate(PoolKind::Enemy))
    );
}

#[test]
fn test_pool_release_all() {
    let mut world = World::new();
    let mut pool = enemy_pool();
    for _ in 0..4 {
        pool.acquire(&mut world);
    }
    assert_eq!(pool.active_count(), 4);
    assert_eq!(pool.release_all(&mut world), 4);
    assert_eq!(pool.active_count(), 0);
    assert_eq!(pool.free_count(), 4);
    assert_eq!(pool.active_members(&world).count(), 0);
}

proptest! {
    /// Outside the store means active; inside the store means inactive.
    #[test]
    fn prop_pool_activity_matches_store(ops in proptest::collection::vec((any::<bool>(), 0usize..8), 0..64)) {
        let mut world = World::new();
        let mut pool = enemy_pool();
        pool.prewarm(&mut world, 2);
        let mut vended = Vec::new();

        for (acquire, index) in ops {
            if acquire {
                if let Some(e) = pool.acquire(&mut world) {
                    vended.push(e);
                }
            } else if !vended.is_empty() {
                let e = vended.remove(index % vended.len());
                prop_assert!(pool.release(&mut world, e));
            }

            for (entity, pooled) in world.query::<&Pooled>().iter() {
                prop_assert_eq!(pooled.active, !pool.is_free(entity));
            }
            prop_assert_eq!(pool.active_count(), vended.len());
            prop_assert_eq!(pool.active_count() + pool.free_count(), pool.created_count());
        }
    }

    /// Health never rises and never drops below zero; non-positive hits change nothing.
    #[test]
    fn prop_enemy_health_monotonic(amounts in proptest::collection::vec(-50.0f64..50.0, 1..40)) {
        let mut enemy = Enemy {
            health: 30.0,
            max_health: 30.0,
            dying: false,
            collidable: true,
            yaw: 0.0,
        };
        for amount in amounts {
            let before = enemy.health;
            let outcome = enemy.take_damage(amount);
            prop_assert!(enemy.health <= before);
            prop_assert!(enemy.health >= 0.0);
            if amount <= 0.0 {
                prop_assert_eq!(outcome, DamageOutcome::Ignored);
                prop_assert_eq!(enemy.health, before);
            }
        }
    }
}

// ---- Event bus ----

#[test]
fn test_event_bus_delivers_and_journals() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = bus.subscribe(Scope::Session, move |e| sink.borrow_mut().push(e.clone()));

    bus.publish(GameEvent::LevelCompleted);
    assert_eq!(seen.borrow().len(), 1, "Delivery is synchronous");
    assert_eq!(bus.journal(), &[GameEvent::LevelCompleted]);

    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    bus.publish(GameEvent::VehicleDestroyed);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(bus.drain_journal().len(), 2);
    assert!(bus.journal().is_empty());
}

#[test]
fn test_event_bus_round_teardown_keeps_session_subscribers() {
    let mut bus = EventBus::new();
    bus.subscribe(Scope::Round, |_| {});
    bus.subscribe(Scope::Round, |_| {});
    bus.subscribe(Scope::Session, |_| {});
    assert_eq!(bus.teardown_round(), 2);
    assert_eq!(bus.subscriber_count(), 1);
}

// ---- Spawner ----

#[test]
fn test_spawner_budget_three_over_seven_seconds() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let mut enemies = enemy_pool();
    let mut bus = EventBus::new();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut stats = RoundStats::default();

    let mut spawner = Spawner::new(LevelConfig {
        enemy_count: 3,
        spawn_interval_secs: 2.0,
        ..Default::default()
    });
    spawner.begin(vehicle, 0.0, 0.0, &mut bus);

    let mut spawned = Vec::new();
    let mut now = 0.0;
    for _ in 0..(7 * 60) {
        now += DT;
        if let Some(e) = spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, now) {
            spawned.push((now, e));
        }
    }

    assert_eq!(spawned.len(), 3);
    assert!(spawned[2].0 < 6.5, "Third spawn happens near 6s, none after");
    assert_eq!(enemies.active_count(), 3);
    assert_eq!(spawner.budget(), 0);
    assert_eq!(spawner.alive(), 3);
    assert_eq!(stats.enemies_spawned, 3);
    assert_eq!(
        count(bus.journal(), |e| matches!(e, GameEvent::EnemySpawned { .. })),
        3
    );
}

#[test]
fn test_spawner_positions_stay_in_window() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let mut bus = EventBus::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut spawner = Spawner::new(LevelConfig {
        length: 50.0,
        spawn_range_x: Span::new(-4.0, 4.0),
        spawn_range_y: Span::new(40.0, 100.0),
        ..Default::default()
    });
    spawner.begin(vehicle, 0.0, 0.0, &mut bus);

    for _ in 0..100 {
        let p = spawner.spawn_position(&mut rng, &Position::new(0.0, 20.0, 0.0));
        assert!((-4.0..4.0).contains(&p.x));
        assert!(p.y >= 50.0 - 1e-9 && p.y <= 50.0, "Clamped to the level end");
    }
}

#[test]
fn test_spawner_stop_keeps_existing_enemies() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let mut enemies = enemy_pool();
    let mut bus = EventBus::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut stats = RoundStats::default();

    let mut spawner = Spawner::new(LevelConfig {
        spawn_interval_secs: 1.0,
        ..Default::default()
    });
    spawner.begin(vehicle, 0.0, 0.0, &mut bus);
    assert!(spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 1.0).is_some());

    spawner.stop();
    assert!(spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 5.0).is_none());
    assert_eq!(enemies.active_count(), 1);
}

#[test]
fn test_spawner_alive_counter_follows_kills_and_escapes() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let mut enemies = enemy_pool();
    let mut bus = EventBus::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut stats = RoundStats::default();

    let mut spawner = Spawner::new(LevelConfig {
        enemy_count: 2,
        spawn_interval_secs: 1.0,
        ..Default::default()
    });
    spawner.begin(vehicle, 0.0, 0.0, &mut bus);
    spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 1.0);
    spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 2.0);
    assert_eq!(spawner.alive(), 2);
    assert_eq!(spawner.budget(), 0);

    bus.publish(GameEvent::EnemyKilled { count: 1 });
    assert_eq!(spawner.alive(), 1, "Budget exhausted but one still fighting");
    spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 3.0);
    assert!(!spawner.is_completed());

    bus.publish(GameEvent::EnemyEscaped { count: 1 });
    spawner.run(&mut world, &mut enemies, &mut rng, &mut bus, &mut stats, 4.0);
    assert!(spawner.is_completed());
    assert_eq!(
        count(bus.journal(), |e| matches!(e, GameEvent::LevelCompleted)),
        1
    );
}

#[test]
fn test_spawner_unbounded_window_falls_back() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let mut bus = EventBus::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut spawner = Spawner::new(LevelConfig {
        spawn_range_x: Span::new(-1e308, 1e308),
        spawn_range_y: Span::new(f64::NEG_INFINITY, 5.0),
        ..Default::default()
    });
    spawner.begin(vehicle, 0.0, 0.0, &mut bus);

    let pos = spawner.spawn_position(&mut rng, &Position::new(0.0, 10.0, 0.0));
    assert_eq!(pos.x, -1e308, "Unsampleable window yields its finite min");
    assert_eq!(pos.y, 10.0, "Non-finite min yields a zero offset");
}

#[test]
fn test_unbounded_spawn_window_still_spawns() {
    let mut config = GameConfig::default();
    config.level.enemy_count = 1;
    config.level.spawn_interval_secs = 0.1;
    config.level.spawn_range_x = Span::new(-1e308, 1e308);
    let mut engine = started(config);
    assert!(engine
        .config_errors()
        .iter()
        .any(|e| matches!(e, ConfigError::NotFinite { field: "level.spawn_range_x", .. })));

    run_frames(&mut engine, 120);
    assert_eq!(engine.stats().enemies_spawned, 1);
}

// ---- Combat ----

#[test]
fn test_two_projectile_hits_on_thirty_health() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(50.0, 50.0, 0.0)).unwrap();

    assert!(engine.fire());
    let shot = engine
        .projectile_pool()
        .active_members(engine.world())
        .next()
        .unwrap();
    assert!(engine.report_hit(shot, enemy));
    assert_eq!(enemy_health(&engine, enemy), 5.0);
    assert!(!engine.report_hit(shot, enemy), "A projectile hits once");

    run_frames(&mut engine, 20);
    assert!(engine.fire());
    let shot = engine
        .projectile_pool()
        .active_members(engine.world())
        .next()
        .unwrap();
    assert!(engine.report_hit(shot, enemy));
    assert_eq!(enemy_health(&engine, enemy), 0.0);
    assert_eq!(engine.stats().death_sequences_started, 1);
    assert_eq!(engine.scheduler().count("death"), 1);
    assert!(engine.world().get::<&Enemy>(enemy).unwrap().dying);
}

#[test]
fn test_projectile_collides_in_flight() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(0.0, 5.0, 0.0)).unwrap();

    assert!(engine.fire());
    run_frames(&mut engine, 20);

    assert_eq!(engine.stats().projectile_hits, 1);
    assert_eq!(enemy_health(&engine, enemy), 5.0);
    assert_eq!(engine.projectile_pool().active_count(), 0);
}

#[test]
fn test_projectile_expires_after_lifetime() {
    let mut engine = started(quiet_config());
    assert!(engine.fire());
    assert_eq!(engine.projectile_pool().active_count(), 1);
    run_frames(&mut engine, 30);
    assert_eq!(engine.projectile_pool().active_count(), 0);
    assert_eq!(engine.stats().projectile_hits, 0);
}

#[test]
fn test_vehicle_damage_clamps_and_destroys_once() {
    let mut engine = SimulationEngine::new(quiet_config());
    assert_eq!(engine.damage_vehicle(40.0), DamageOutcome::Damaged { health: 60.0 });
    assert_eq!(engine.damage_vehicle(70.0), DamageOutcome::Lethal);
    assert_eq!(engine.damage_vehicle(10.0), DamageOutcome::Ignored);

    let snap = engine.tick(DT);
    let healths: Vec<f64> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::VehicleHealthChanged { health, .. } => Some(*health),
            _ => None,
        })
        .collect();
    assert_eq!(healths, vec![60.0, 0.0]);
    assert_eq!(
        count(&snap.events, |e| matches!(e, GameEvent::VehicleDestroyed)),
        1
    );
    assert!(snap.vehicle.destroyed);
    assert!(!snap.vehicle.moving);
    assert_eq!(snap.stats.damage_taken, 100.0);
}

#[test]
fn test_non_positive_damage_is_ignored() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(50.0, 50.0, 0.0)).unwrap();

    for amount in [0.0, -5.0, f64::NAN] {
        assert_eq!(engine.damage_enemy(enemy, amount), DamageOutcome::Ignored);
        assert_eq!(engine.damage_vehicle(amount), DamageOutcome::Ignored);
    }
    assert_eq!(enemy_health(&engine, enemy), 30.0);
    assert_eq!(
        engine.world().get::<&Brain>(enemy).unwrap().state(),
        EnemyState::Idle
    );
    assert_eq!(engine.world().get::<&Vehicle>(engine.vehicle()).unwrap().health, 100.0);
    assert_eq!(engine.stats().death_sequences_started, 0);
}

#[test]
fn test_single_kill_under_reentrant_damage() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(50.0, 50.0, 0.0)).unwrap();

    assert_eq!(engine.damage_enemy(enemy, 100.0), DamageOutcome::Lethal);
    let mut events = Vec::new();
    for _ in 0..150 {
        assert_eq!(engine.damage_enemy(enemy, 100.0), DamageOutcome::Ignored);
        events.extend(engine.tick(DT).events);
    }

    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::EnemyKilled { .. })),
        1
    );
    assert_eq!(engine.stats().enemies_killed, 1);
    assert_eq!(engine.stats().death_sequences_started, 1);
    assert!(engine.enemy_pool().is_free(enemy));
    assert_eq!(engine.enemy_pool().active_count(), 0);
}

#[test]
fn test_death_sequence_emits_effects_in_order() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(50.0, 50.0, 0.0)).unwrap();
    let id = enemy.to_bits().get();

    engine.damage_enemy(enemy, 100.0);
    let events = run_frames(&mut engine, 150);
    let cues: Vec<EffectCue> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Effect { id: eid, cue } if *eid == id => Some(*cue),
            _ => None,
        })
        .collect();
    assert_eq!(cues, vec![EffectCue::DeathBurst, EffectCue::DeathScatter]);

    let scatter = events
        .iter()
        .position(|e| matches!(e, GameEvent::Effect { cue: EffectCue::DeathScatter, .. }))
        .unwrap();
    let killed = events
        .iter()
        .position(|e| matches!(e, GameEvent::EnemyKilled { .. }))
        .unwrap();
    assert!(scatter < killed);
}

#[test]
fn test_recycle_cancels_death_sequence() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(50.0, 50.0, 0.0)).unwrap();
    let free_before = engine.enemy_pool().free_count();

    engine.damage_enemy(enemy, 100.0);
    run_frames(&mut engine, 3);
    assert!(engine.force_recycle(enemy));

    let events = run_frames(&mut engine, 150);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::EnemyKilled { .. })),
        0
    );
    assert_eq!(engine.scheduler().count("death"), 0);
    assert_eq!(engine.stats().enemies_killed, 0);
    assert_eq!(
        engine.enemy_pool().free_count(),
        free_before + 1,
        "Released exactly once"
    );
}

#[test]
fn test_cleanup_skips_dying_enemies() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(5.0, -100.0, 0.0)).unwrap();

    engine.damage_enemy(enemy, 100.0);
    run_frames(&mut engine, 2);
    assert!(engine.enemy_pool().owns_active(engine.world(), enemy));

    run_frames(&mut engine, 150);
    assert_eq!(engine.stats().enemies_killed, 1);
    assert_eq!(engine.stats().enemies_escaped, 0);
}

#[test]
fn test_cleanup_recycles_enemies_left_behind() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(30.0, -50.0, 0.0)).unwrap();

    let events = run_frames(&mut engine, 1);
    assert!(engine.enemy_pool().is_free(enemy));
    assert_eq!(engine.stats().enemies_escaped, 1);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::EnemyEscaped { .. })),
        1
    );
}

/// Reports no overlaps at all, like a host physics layer with collisions off.
struct NeverOverlap;

impl OverlapDetector for NeverOverlap {
    fn overlaps(&self, _: &Position, _: f64, _: &Position, _: f64) -> bool {
        false
    }
}

#[test]
fn test_custom_overlap_detector_replaces_sphere_check() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(0.0, 1.0, 0.0)).unwrap();
    engine.set_overlap_detector(Box::new(NeverOverlap));

    assert!(engine.fire());
    run_frames(&mut engine, 20);

    assert_eq!(engine.stats().projectile_hits, 0);
    assert_eq!(enemy_health(&engine, enemy), 30.0);
}

#[test]
fn test_target_strike_resolved_at_assignment() {
    let mut world = World::new();
    let vehicle = world_setup::spawn_vehicle(&mut world, &VehicleConfig::default(), Position::default());
    let scenery = world.spawn((Position::default(),));
    let mut bus = EventBus::new();
    let mut stats = RoundStats::default();

    assert!(Target::assign(&world, scenery).strike.is_none());

    let target = Target::assign(&world, vehicle);
    assert_eq!(target.entity, Some(vehicle));
    let strike = target.strike.unwrap();
    assert_eq!(
        strike(&mut world, vehicle, 10.0, &mut bus, &mut stats),
        DamageOutcome::Damaged { health: 90.0 }
    );
    assert_eq!(stats.damage_taken, 10.0);
    assert!(bus.journal().contains(&GameEvent::VehicleHealthChanged {
        health: 90.0,
        max_health: 100.0,
    }));
}

// ---- Enemy AI in the engine ----

#[test]
fn test_enemy_detects_chases_and_attacks() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(0.0, 10.0, 0.0)).unwrap();
    let id = enemy.to_bits().get();

    let events = run_frames(&mut engine, 120);
    assert!(events.contains(&GameEvent::EnemyStateChanged {
        id,
        from: EnemyState::Idle,
        to: EnemyState::Chase,
    }));
    assert!(events.contains(&GameEvent::EnemyStateChanged {
        id,
        from: EnemyState::Chase,
        to: EnemyState::Attack,
    }));
    assert!(engine.stats().damage_taken >= 10.0);
    assert!(events.contains(&GameEvent::Animation {
        id,
        cue: AnimationCue::Attack,
    }));
}

#[test]
fn test_enemy_reverts_to_idle_when_vehicle_destroyed() {
    let mut engine = started(quiet_config());
    let enemy = engine.spawn_enemy_at(Position::new(0.0, 10.0, 0.0)).unwrap();
    run_frames(&mut engine, 40);
    assert_ne!(
        engine.world().get::<&Brain>(enemy).unwrap().state(),
        EnemyState::Idle
    );

    engine.damage_vehicle(1000.0);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::GameOver);
    assert_eq!(
        engine.world().get::<&Brain>(enemy).unwrap().state(),
        EnemyState::Idle
    );
    assert!(snap.events.contains(&GameEvent::EnemyStateChanged {
        id: enemy.to_bits().get(),
        from: EnemyState::Chase,
        to: EnemyState::Idle,
    }) || snap.events.contains(&GameEvent::EnemyStateChanged {
        id: enemy.to_bits().get(),
        from: EnemyState::Attack,
        to: EnemyState::Idle,
    }));
}

// ---- Turret ----

#[test]
fn test_fire_respects_cooldown() {
    let mut engine = started(quiet_config());
    assert!(engine.fire());
    assert!(!engine.fire(), "Cooldown active");
    run_frames(&mut engine, 10);
    assert!(!engine.fire());
    run_frames(&mut engine, 10);
    assert!(engine.fire());
    assert_eq!(engine.stats().projectiles_fired, 2);
}

#[test]
fn test_muzzle_light_brackets_one_frame() {
    let mut engine = SimulationEngine::new(quiet_config());
    engine.queue_commands([PlayerCommand::StartRound, PlayerCommand::Fire]);
    let snap = engine.tick(DT);
    assert!(snap.turret.light_on);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::Effect { cue: EffectCue::MuzzleFlash, .. })));

    let snap = engine.tick(DT);
    assert!(!snap.turret.light_on);
}

#[test]
fn test_turret_turns_toward_aim_point() {
    let mut engine = started(quiet_config());
    assert!(!engine.aim_at(0.0, 0.05), "Too close to the pivot");
    assert!(engine.aim_at(20.0, 0.0));
    run_frames(&mut engine, 30);
    let yaw = engine.world().get::<&Turret>(engine.vehicle()).unwrap().yaw;
    assert!(yaw > 0.5, "Positive yaw turns toward +x, got {yaw}");
}

#[test]
fn test_fire_without_projectile_template() {
    let mut config = quiet_config();
    config.projectile = None;
    let mut engine = started(config);

    assert!(engine
        .config_errors()
        .contains(&ConfigError::MissingTemplate(PoolKind::Projectile)));
    assert!(!engine.fire());
    let snap = engine.tick(DT);
    assert!(!snap.turret.armed);
    assert!(!snap.turret.can_fire);
    assert_eq!(snap.stats.projectiles_fired, 0);
}

#[test]
fn test_unbounded_spread_fires_straight() {
    let mut config = quiet_config();
    config.turret.max_spread_degrees = 1e308;
    let mut engine = started(config);
    assert!(engine
        .config_errors()
        .iter()
        .any(|e| matches!(e, ConfigError::NotFinite { field: "turret.max_spread_degrees", .. })));

    assert!(engine.fire());
    let shot = engine
        .projectile_pool()
        .active_members(engine.world())
        .next()
        .unwrap();
    let vel = *engine.world().get::<&Velocity>(shot).unwrap();
    assert!(vel.x.abs() < 1e-9, "No spread applied, got {vel:?}");
    assert!(vel.y > 0.0);
}

// ---- Round control ----

#[test]
fn test_round_start_takeoff_arms_spawner() {
    let mut engine = SimulationEngine::new(GameConfig::default());
    assert_eq!(engine.state(), GameState::Menu);
    engine.queue_command(PlayerCommand::StartRound);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::Playing);
    assert_eq!(snap.round, 1);
    assert!(snap.events.contains(&GameEvent::GameStateChanged {
        from: GameState::Menu,
        to: GameState::Playing,
    }));
    assert!(!snap.spawner.active);

    run_frames(&mut engine, 60);
    assert!(engine.spawner().is_active());
    let snap = engine.tick(DT);
    assert!((snap.vehicle.speed - 10.0).abs() < 1e-6);
    assert!(snap.vehicle.distance_travelled > 0.0);
}

#[test]
fn test_start_ignored_outside_menu() {
    let mut engine = started(quiet_config());
    assert!(!engine.start_round());
    assert_eq!(engine.round(), 1);
}

#[test]
fn test_vehicle_destroyed_ends_round() {
    let mut engine = started(quiet_config());
    engine.damage_vehicle(500.0);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::GameOver);
    assert!(snap.events.contains(&GameEvent::GameStateChanged {
        from: GameState::Playing,
        to: GameState::GameOver,
    }));
    assert!(!engine.fire());
}

#[test]
fn test_vehicle_destroyed_before_start_ends_round() {
    let mut engine = SimulationEngine::new(quiet_config());
    assert_eq!(engine.damage_vehicle(1000.0), DamageOutcome::Lethal);
    engine.tick(DT);
    assert_eq!(engine.state(), GameState::Menu);

    engine.queue_command(PlayerCommand::StartRound);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::GameOver);
    assert!(snap.events.contains(&GameEvent::GameStateChanged {
        from: GameState::Playing,
        to: GameState::GameOver,
    }));
}

#[test]
fn test_reaching_level_end_wins() {
    let mut config = quiet_config();
    config.level.length = 20.0;
    let mut engine = started(config);
    run_frames(&mut engine, 300);
    assert_eq!(engine.state(), GameState::Win);
    let snap = engine.tick(DT);
    assert!(!snap.vehicle.moving);
    assert!(!snap.spawner.active);
}

#[test]
fn test_clearing_every_enemy_completes_level() {
    let mut config = GameConfig::default();
    config.level.enemy_count = 1;
    config.level.spawn_interval_secs = 0.1;
    let mut engine = started(config);

    let mut enemy = None;
    for _ in 0..120 {
        engine.tick(DT);
        enemy = engine.enemy_pool().active_members(engine.world()).next();
        if enemy.is_some() {
            break;
        }
    }
    let enemy = enemy.unwrap();
    assert_eq!(engine.damage_enemy(enemy, 100.0), DamageOutcome::Lethal);

    let events = run_frames(&mut engine, 200);
    assert_eq!(count(&events, |e| matches!(e, GameEvent::LevelCompleted)), 1);
    assert!(events.contains(&GameEvent::AliveCountChanged { alive: 0 }));
    assert_eq!(engine.state(), GameState::Win);
}

#[test]
fn test_end_round_command() {
    let mut engine = started(quiet_config());
    engine.queue_command(PlayerCommand::EndRound { won: false });
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::GameOver);
    assert!(!snap.vehicle.moving);

    // Second end is ignored.
    assert!(!engine.end_round(true));
    assert_eq!(engine.state(), GameState::GameOver);
}

#[test]
fn test_restart_tears_down_round() {
    let mut config = GameConfig::default();
    config.level.spawn_interval_secs = 0.5;
    let mut engine = started(config);
    run_frames(&mut engine, 120);
    assert!(engine.enemy_pool().active_count() > 0);

    let dying = engine.enemy_pool().active_members(engine.world()).next().unwrap();
    engine.damage_enemy(dying, 100.0);
    engine.damage_vehicle(30.0);
    assert_eq!(engine.scheduler().count("death"), 1);

    engine.queue_command(PlayerCommand::RestartRound);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::Playing);
    assert_eq!(snap.round, 2);
    assert_eq!(snap.stats, RoundStats::default());
    assert_eq!(snap.pools.enemies.active, 0);
    assert!(snap.enemies.is_empty());
    assert_eq!(snap.vehicle.health, 100.0);
    assert_eq!(engine.scheduler().count("death"), 0);
    assert_eq!(engine.scheduler().count("takeoff"), 1);
    assert_eq!(engine.event_bus_mut().subscriber_count(), 0);

    let events = run_frames(&mut engine, 150);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::EnemyKilled { .. })),
        0
    );
}

#[test]
fn test_restart_from_game_over() {
    let mut engine = started(quiet_config());
    engine.damage_vehicle(500.0);
    engine.tick(DT);
    assert_eq!(engine.state(), GameState::GameOver);

    engine.queue_command(PlayerCommand::RestartRound);
    let snap = engine.tick(DT);
    assert_eq!(snap.state, GameState::Playing);
    assert!(!snap.vehicle.destroyed);
    assert!(snap.events.contains(&GameEvent::GameStateChanged {
        from: GameState::GameOver,
        to: GameState::Playing,
    }));
}

// ---- Fixed step ----

#[test]
fn test_fixed_steps_follow_frame_time() {
    let mut engine = started(quiet_config());
    let before = engine.time().tick;
    run_frames(&mut engine, 60);
    let ticks = engine.time().tick - before;
    assert!((49..=51).contains(&ticks), "~50 fixed steps per second, got {ticks}");

    // A long stall is capped, not replayed.
    let before = engine.time().tick;
    engine.tick(2.0);
    assert_eq!(engine.time().tick - before, 8);
}

#[test]
fn test_invalid_frame_dt_is_ignored() {
    let mut engine = started(quiet_config());
    let before = engine.time();
    engine.tick(f64::NAN);
    engine.tick(-1.0);
    assert_eq!(engine.time().elapsed_secs, before.elapsed_secs);
    assert_eq!(engine.time().tick, before.tick);
}

// ---- Determinism ----

fn scripted_run(seed: u64) -> Vec<String> {
    let mut config = GameConfig::default();
    config.seed = seed;
    config.turret.max_spread_degrees = 5.0;
    let mut engine = SimulationEngine::new(config);
    engine.queue_command(PlayerCommand::StartRound);

    (0..600)
        .map(|frame| {
            if frame % 12 == 0 {
                engine.queue_command(PlayerCommand::Fire);
            }
            serde_json::to_string(&engine.tick(DT)).unwrap()
        })
        .collect()
}

#[test]
fn test_determinism_same_seed() {
    assert_eq!(scripted_run(12345), scripted_run(12345));
}

#[test]
fn test_determinism_different_seeds() {
    assert_ne!(scripted_run(111), scripted_run(222));
}
