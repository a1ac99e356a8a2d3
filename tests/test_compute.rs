use knight::compute::*;
use knight::config::Tuning;
use knight::entities::*;
use knight::error::KnightError;
use knight::hud::{HudSink, NullHud, SharedHud};
use knight::input::Controls;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn playing(level: u32) -> GameState {
    let mut state = init_state(level, &Tuning::default(), 0, &mut seeded_rng()).unwrap();
    state.status = GameStatus::Playing;
    state
}

/// Level 1 emptied out except for one slime far to the right, so the
/// level is not won on the first tick.
fn quiet_level() -> GameState {
    let mut state = playing(1);
    state.enemies.clear();
    state.collectibles.clear();
    let arch = state.tuning.enemies.slime;
    state.enemies.push(Enemy::new(EnemyKind::Slime, 1500.0, 450.0, &arch));
    state
}

fn run(state: &mut GameState, controls: &Controls, from_tick: u64, ticks: u64, rng: &mut StdRng) {
    for i in from_tick..from_tick + ticks {
        tick(state, controls, Clock::new(i * 16, 16.0), &mut NullHud, rng);
    }
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_builds_default_layout() {
    let s = init_state(1, &Tuning::default(), 250, &mut seeded_rng()).unwrap();
    assert_eq!(s.platforms.len(), 6);
    assert_eq!(s.enemies.len(), 5);
    assert_eq!(s.collectibles.len(), 5);
    assert!(s.boss.is_none());
    assert_eq!(s.lives, 3);
    assert_eq!(s.score, 0);
    assert_eq!(s.high_score, 250);
    assert_eq!(s.status, GameStatus::Menu);
    assert_eq!((s.player.body.x, s.player.body.y), (100.0, 400.0));
}

#[test]
fn boss_appears_from_level_three() {
    let s2 = init_state(2, &Tuning::default(), 0, &mut seeded_rng()).unwrap();
    assert!(s2.boss.is_none());

    let s3 = init_state(3, &Tuning::default(), 0, &mut seeded_rng()).unwrap();
    let boss = s3.boss.expect("boss on level 3");
    assert_eq!((boss.body.x, boss.body.y), (1600.0, 400.0));
    assert_eq!(boss.health, 300.0);
}

#[test]
fn init_state_rejects_empty_level() {
    let mut tuning = Tuning::default();
    tuning.level.platforms.clear();
    let err = init_state(1, &tuning, 0, &mut seeded_rng()).unwrap_err();
    assert!(matches!(err, KnightError::InvalidLevel(_)));
}

#[test]
fn init_state_rejects_degenerate_player() {
    let mut tuning = Tuning::default();
    tuning.player.width = 0.0;
    assert!(init_state(1, &tuning, 0, &mut seeded_rng()).is_err());
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_does_nothing_unless_playing() {
    let mut state = playing(1);
    state.status = GameStatus::Paused;
    let before = state.player.clone();
    tick(&mut state, &Controls::default(), Clock::new(16, 16.0), &mut NullHud, &mut seeded_rng());
    assert_eq!(state.frame, 0);
    assert_eq!(state.player, before);
}

#[test]
fn clearing_every_enemy_without_a_boss_wins() {
    let mut state = playing(1);
    state.enemies.clear();
    tick(&mut state, &Controls::default(), Clock::new(16, 16.0), &mut NullHud, &mut seeded_rng());
    assert_eq!(state.status, GameStatus::Victory);
}

#[test]
fn live_boss_blocks_victory() {
    let mut state = playing(3);
    state.enemies.clear();
    tick(&mut state, &Controls::default(), Clock::new(16, 16.0), &mut NullHud, &mut seeded_rng());
    assert_eq!(state.status, GameStatus::Playing);
}

#[test]
fn hud_receives_a_snapshot_each_tick() {
    let mut state = quiet_level();
    let mut hud = SharedHud::new();
    let sink: &mut dyn HudSink = &mut hud;
    tick(&mut state, &Controls::default(), Clock::new(16, 16.0), sink, &mut seeded_rng());

    let snapshot = hud.latest().expect("synced");
    assert_eq!(snapshot.lives, 3);
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.max_health, 100.0);
}

#[test]
fn holding_right_moves_the_player_right() {
    let mut state = quiet_level();
    let mut rng = seeded_rng();
    let right = Controls { right: true, ..Controls::default() };
    run(&mut state, &right, 1, 30, &mut rng);
    assert!(state.player.body.x > 150.0);
    assert!(state.player.body.facing_right);
    assert!(state.player.body.vx <= state.player.speed);
}

#[test]
fn player_falls_onto_the_ground_and_can_jump() {
    let mut state = quiet_level();
    let mut rng = seeded_rng();
    run(&mut state, &Controls::default(), 1, 40, &mut rng);
    assert!((state.player.body.y - 502.0).abs() < 1.0);
    assert!(state.player.last_jump.is_none());

    let jump = Controls { jump: true, ..Controls::default() };
    run(&mut state, &jump, 41, 3, &mut rng);
    assert!(state.player.last_jump.is_some());
    assert!(state.player.body.y < 502.0);
}

#[test]
fn energy_regenerates_up_to_the_cap() {
    let mut state = quiet_level();
    state.player.energy = 50.0;
    run(&mut state, &Controls::default(), 1, 10, &mut seeded_rng());
    assert!((state.player.energy - 51.0).abs() < 1e-3);

    state.player.energy = 99.95;
    run(&mut state, &Controls::default(), 11, 5, &mut seeded_rng());
    assert_eq!(state.player.energy, 100.0);
}

#[test]
fn falling_out_of_the_world_costs_a_life() {
    let mut state = quiet_level();
    // keep only the far ledge the slime stands on
    state.platforms.retain(|p| p.rect.x >= 1400.0);
    run(&mut state, &Controls::default(), 1, 60, &mut seeded_rng());
    assert!(!state.player.is_alive);
    assert_eq!(state.lives, 2);
}

#[test]
fn seeded_runs_are_reproducible() {
    let controls = Controls { right: true, attack: true, ..Controls::default() };
    let mut a = playing(3);
    let mut b = playing(3);
    run(&mut a, &controls, 1, 120, &mut seeded_rng());
    run(&mut b, &controls, 1, 120, &mut seeded_rng());
    assert_eq!(a.player, b.player);
    assert_eq!(a.enemies, b.enemies);
    assert_eq!(a.score, b.score);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

fn blast(x: f32, y: f32, vx: f32) -> Projectile {
    let mut body = Body::new(x, y, 20.0, 8.0);
    body.vx = vx;
    Projectile::new(ProjectileKind::EnergyBlast, Owner::Player, body, 40.0)
}

#[test]
fn projectile_is_dropped_past_the_right_edge() {
    let mut state = quiet_level();
    state.enemies.clear();
    state.platforms.clear();
    state.projectiles.push(blast(100.0, 300.0, 12.0));
    let mut rng = seeded_rng();

    for _ in 0..79 {
        update_projectiles(&mut state, 0, &mut rng);
    }
    compact(&mut state);
    assert_eq!(state.projectiles.len(), 1);
    assert_eq!(state.projectiles[0].body.x, 1048.0);
    assert_eq!(state.projectiles[0].trail.len(), 8);

    update_projectiles(&mut state, 0, &mut rng);
    compact(&mut state);
    assert!(state.projectiles.is_empty());
}

#[test]
fn projectile_hits_the_first_enemy_once() {
    let mut state = quiet_level();
    state.enemies.clear();
    state.platforms.clear();
    let arch = state.tuning.enemies.skeleton;
    state.enemies.push(Enemy::new(EnemyKind::Skeleton, 200.0, 290.0, &arch));
    state.projectiles.push(blast(150.0, 300.0, 12.0));
    let mut rng = seeded_rng();

    for _ in 0..5 {
        update_projectiles(&mut state, 0, &mut rng);
    }
    assert_eq!(state.enemies[0].health, 10.0);
    compact(&mut state);
    assert!(state.projectiles.is_empty());
}

#[test]
fn boss_fireball_is_soaked_by_the_shield() {
    let mut state = quiet_level();
    state.platforms.clear();
    let mut rng = seeded_rng();
    knight::combat::use_skill(&mut state, SkillKind::Shield, 0, &mut rng);

    let p = &state.player.body;
    let mut body = Body::new(p.x + p.width + 4.0, p.y + 10.0, 25.0, 25.0);
    body.vx = -8.0;
    state
        .projectiles
        .push(Projectile::new(ProjectileKind::Fireball, Owner::Boss, body, 52.5));

    update_projectiles(&mut state, 100, &mut rng);
    assert_eq!(state.player.health, 100.0);
    assert!(!state.projectiles[0].active);
}

#[test]
fn projectiles_stop_at_platforms() {
    let mut state = quiet_level();
    state.enemies.clear();
    state.projectiles.push(blast(10.0, 545.0, 0.0));
    update_projectiles(&mut state, 0, &mut seeded_rng());
    assert!(!state.projectiles[0].active);
}

// ── Bookkeeping ───────────────────────────────────────────────────────────────

#[test]
fn compact_removes_only_marked_entities() {
    let mut state = playing(1);
    state.enemies[1].is_alive = false;
    state.collectibles[0].collected = true;
    state.projectiles.push(blast(0.0, 0.0, 0.0));
    state.projectiles.push(blast(0.0, 0.0, 0.0));
    state.projectiles[0].active = false;

    compact(&mut state);
    assert_eq!(state.enemies.len(), 4);
    assert!(state.enemies.iter().all(|e| e.is_alive));
    assert_eq!(state.collectibles.len(), 4);
    assert_eq!(state.projectiles.len(), 1);
}

#[test]
fn collectibles_bob_in_place() {
    let mut state = playing(1);
    let before: Vec<f32> = state.collectibles.iter().map(|c| c.bob_phase).collect();
    update_collectibles(&mut state, 100.0);
    for (c, phase) in state.collectibles.iter().zip(before) {
        assert!((c.bob_phase - (phase + 0.5)).abs() < 1e-4);
    }
}
