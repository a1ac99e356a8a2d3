//! Per-tick game logic.
//!
//! `tick` advances a `GameState` by one accepted frame.  All randomness
//! comes through the injected RNG and all time through `Clock`, so a
//! seeded run is fully reproducible.

use rand::Rng;
use tracing::{debug, info};

use crate::ai::{self, BossAction};
use crate::animation::AnimTag;
use crate::camera::{Camera, CameraTarget};
use crate::combat;
use crate::config::Tuning;
use crate::entities::{
    Enemy, EnemyKind, GameState, GameStatus, Owner, Player, ProjectileKind, SkillKind,
};
use crate::error::KnightError;
use crate::events::{EventQueue, ScheduledEvent};
use crate::geometry::{intersects, Rect};
use crate::hud::{HudSink, HudSnapshot};
use crate::input::Controls;
use crate::level;
use crate::particles;
use crate::physics::{self, Fate};

/// Wall-clock time of the tick and the milliseconds since the previous one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clock {
    pub now: u64,
    pub dt: f32,
}

impl Clock {
    pub fn new(now: u64, dt: f32) -> Self {
        Self { now, dt }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the state for `level`.  The result sits in `Menu` until the
/// session starts it.
pub fn init_state(
    level: u32,
    tuning: &Tuning,
    high_score: u32,
    rng: &mut impl Rng,
) -> Result<GameState, KnightError> {
    let player = Player::new(&tuning.player, &tuning.skills);
    if !player.body.rect().is_valid() {
        return Err(KnightError::InvalidLevel(format!(
            "player spawn {:?} is degenerate",
            player.body.rect()
        )));
    }

    let built = level::build(level, tuning, rng)?;
    let mut camera = Camera::new(tuning.canvas.width, tuning.canvas.height);
    camera.target = Some(CameraTarget::Player);

    info!(level, enemies = built.enemies.len(), "Level initialised");
    Ok(GameState {
        player,
        enemies: built.enemies,
        boss: built.boss,
        projectiles: Vec::new(),
        particles: Vec::new(),
        collectibles: built.collectibles,
        platforms: built.platforms,
        camera,
        events: EventQueue::new(),
        tuning: tuning.clone(),
        score: 0,
        high_score,
        lives: tuning.player.lives,
        level,
        status: GameStatus::Menu,
        frame: 0,
    })
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  Does nothing unless `Playing`.
pub fn tick(
    state: &mut GameState,
    controls: &Controls,
    clock: Clock,
    hud: &mut dyn HudSink,
    rng: &mut impl Rng,
) {
    if state.status != GameStatus::Playing {
        return;
    }
    state.frame += 1;

    // ── 1. Delayed effects that came due ────────────────────────────────────
    run_scheduled(state, clock.now);

    // ── 2. Player, enemies, boss ────────────────────────────────────────────
    update_player(state, controls, clock, rng);
    update_enemies(state, clock, rng);
    update_boss(state, clock, rng);

    // ── 3. Projectiles, particles, pickups ──────────────────────────────────
    update_projectiles(state, clock.now, rng);
    let particle_cfg = state.tuning.particles;
    particles::update(&mut state.particles, clock.dt, &particle_cfg);
    update_collectibles(state, clock.dt);

    // ── 4. Camera and HUD ───────────────────────────────────────────────────
    let focus = state.player.is_alive.then_some((state.player.body.x, state.player.body.y));
    let camera_cfg = state.tuning.camera;
    state.camera.update(focus, &camera_cfg, rng);
    hud.sync(&HudSnapshot::from_state(state));

    // ── 5. Drop the dead, then see whether the level is over ────────────────
    compact(state);
    check_game_end(state);
}

pub fn run_scheduled(state: &mut GameState, now: u64) {
    for event in state.events.drain_due(now) {
        match event {
            ScheduledEvent::RespawnPlayer => combat::respawn_player(state),
            ScheduledEvent::EndBossCharge => {
                let release = state.tuning.boss.charge_release_factor;
                if let Some(boss) = state.boss.as_mut() {
                    boss.body.vx *= release;
                    boss.is_charging = false;
                }
            }
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

pub fn update_player(state: &mut GameState, controls: &Controls, clock: Clock, rng: &mut impl Rng) {
    if !state.player.is_alive {
        return;
    }
    combat::tick_timers(&mut state.player, clock.dt);
    combat::expire_skills(&mut state.player, clock.now);

    handle_input(state, controls, clock.now, rng);

    let physics_cfg = state.tuning.physics;
    if physics::step(&mut state.player.body, &state.platforms, &physics_cfg) == Fate::FellOut {
        debug!("Player fell out of the world");
        combat::kill_player(state, clock.now);
        return;
    }

    player_contacts(state, clock.now, rng);

    let player = &mut state.player;
    player.animation.advance(clock.dt);
    let regen = state.tuning.player.energy_regen;
    player.energy = (player.energy + regen).min(player.max_energy);
}

fn handle_input(state: &mut GameState, controls: &Controls, now: u64, rng: &mut impl Rng) {
    let cfg = state.tuning.player;
    let player = &mut state.player;
    let body = &mut player.body;
    let free = !player.animation.is_locked();

    if controls.left {
        body.vx = (body.vx - cfg.acceleration).max(-player.speed);
        body.facing_right = false;
        if body.is_grounded && free {
            player.animation.play(AnimTag::Run);
        }
    } else if controls.right {
        body.vx = (body.vx + cfg.acceleration).min(player.speed);
        body.facing_right = true;
        if body.is_grounded && free {
            player.animation.play(AnimTag::Run);
        }
    } else if body.is_grounded && free {
        player.animation.play(AnimTag::Idle);
    }

    let jump_ready = player
        .last_jump
        .map_or(true, |t| now.saturating_sub(t) > cfg.jump_cooldown_ms);
    if controls.jump && body.is_grounded && jump_ready {
        body.vy = -cfg.jump_strength;
        body.is_grounded = false;
        player.last_jump = Some(now);
        player.animation.play(AnimTag::Jump);
        let (feet_x, feet_y) = (body.x + body.width / 2.0, body.y + body.height);
        particles::jump(&mut state.particles, feet_x, feet_y, rng);
    }

    if controls.attack {
        combat::player_attack(state, rng);
    }
    if controls.energy_blast {
        combat::use_skill(state, SkillKind::EnergyBlast, now, rng);
    }
    if controls.shield {
        combat::use_skill(state, SkillKind::Shield, now, rng);
    }
}

/// Contact damage from touching enemies or the boss, then pickups.
fn player_contacts(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    let cfg = state.tuning.player;

    for i in 0..state.enemies.len() {
        if !state.player.is_alive {
            return;
        }
        let enemy = &state.enemies[i];
        if !enemy.is_alive || !intersects(&state.player.body.rect(), &enemy.body.rect()) {
            continue;
        }
        let (power, source) = (enemy.attack_power, enemy.body.clone());
        if combat::damage_player(state, power, now).landed() {
            combat::knockback(&mut state.player.body, &source, &cfg);
        }
    }

    let boss_contact = state
        .boss
        .as_ref()
        .filter(|b| b.is_alive && intersects(&state.player.body.rect(), &b.body.rect()))
        .map(|b| (b.attack_power, b.body.clone()));
    if let Some((power, source)) = boss_contact {
        if combat::damage_player(state, power, now).landed() {
            combat::knockback(&mut state.player.body, &source, &cfg);
        }
    }

    for i in 0..state.collectibles.len() {
        let item = &state.collectibles[i];
        let rect = Rect::new(item.x, item.y, item.width, item.height);
        if !item.collected && intersects(&state.player.body.rect(), &rect) {
            combat::collect(state, i, rng);
        }
    }
}

// ── Enemies & boss ───────────────────────────────────────────────────────────

pub fn update_enemies(state: &mut GameState, clock: Clock, rng: &mut impl Rng) {
    let target = state.player.is_alive.then(|| state.player.body.clone());
    let enemy_cfg = state.tuning.enemies;
    let physics_cfg = state.tuning.physics;

    for i in 0..state.enemies.len() {
        if !state.enemies[i].is_alive {
            continue;
        }
        let strike = ai::think_enemy(&mut state.enemies[i], target.as_ref(), clock.now, &enemy_cfg, rng);
        if let Some(strike) = strike {
            let source = state.enemies[i].body.clone();
            combat::hostile_strike(state, &strike.hitbox, strike.power, &source, clock.now, rng);
        }

        let enemy = &mut state.enemies[i];
        if physics::step(&mut enemy.body, &state.platforms, &physics_cfg) == Fate::FellOut {
            enemy.is_alive = false;
            debug!(kind = ?enemy.kind, "Enemy fell out of the world");
        }
        enemy.animation.advance(clock.dt);
    }
}

pub fn update_boss(state: &mut GameState, clock: Clock, rng: &mut impl Rng) {
    let target = state.player.is_alive.then(|| state.player.body.clone());
    let minions = state.enemies.iter().filter(|e| e.is_alive && e.is_minion).count();
    let boss_cfg = state.tuning.boss;
    let physics_cfg = state.tuning.physics;

    let Some(boss) = state.boss.as_mut().filter(|b| b.is_alive) else {
        return;
    };
    let action = ai::think_boss(boss, target.as_ref(), clock.now, clock.dt, minions, &boss_cfg);
    if physics::step(&mut boss.body, &state.platforms, &physics_cfg) == Fate::FellOut {
        boss.is_alive = false;
        info!("Boss fell out of the world");
    }
    boss.animation.advance(clock.dt);
    let source = boss.body.clone();

    match action {
        Some(BossAction::Melee(strike)) => {
            combat::hostile_strike(state, &strike.hitbox, strike.power, &source, clock.now, rng);
        }
        Some(BossAction::Charge) => {
            state
                .events
                .schedule(clock.now + boss_cfg.charge_duration_ms, ScheduledEvent::EndBossCharge);
        }
        Some(BossAction::Fireball(projectile)) => state.projectiles.push(projectile),
        Some(BossAction::Summon { x, y }) => {
            let mut minion = Enemy::new(EnemyKind::Slime, x, y, &state.tuning.enemies.slime);
            minion.is_minion = true;
            state.enemies.push(minion);
            debug!(minions = minions + 1, "Boss summoned a minion");
        }
        None => {}
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Move every live projectile, resolve its first hit, and retire the ones
/// that hit, left the view or grew too old.
pub fn update_projectiles(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    let cfg = state.tuning.projectiles;
    let margin = cfg.offscreen_margin;
    let view = Rect::new(
        state.camera.x - margin,
        state.camera.y - margin,
        state.tuning.canvas.width + 2.0 * margin,
        state.tuning.canvas.height + 2.0 * margin,
    );

    for i in 0..state.projectiles.len() {
        let projectile = &mut state.projectiles[i];
        if !projectile.active {
            continue;
        }
        let body = &mut projectile.body;
        body.x += body.vx;
        body.y += body.vy;
        if projectile.kind == ProjectileKind::Fireball {
            body.vy += cfg.fireball_gravity;
        }
        projectile.trail.push_back((body.x, body.y));
        while projectile.trail.len() > cfg.trail_length {
            projectile.trail.pop_front();
        }
        projectile.age += 1;
        let (rect, owner, damage) = (body.rect(), projectile.owner, projectile.damage);

        let mut spent = false;
        match owner {
            Owner::Player => {
                let victim = state
                    .enemies
                    .iter()
                    .position(|e| e.is_alive && intersects(&rect, &e.body.rect()));
                let boss_center = state
                    .boss
                    .as_ref()
                    .filter(|b| b.is_alive && intersects(&rect, &b.body.rect()))
                    .map(|b| b.body.center());
                if let Some(idx) = victim {
                    let (cx, cy) = state.enemies[idx].body.center();
                    combat::damage_enemy(state, idx, damage, rng);
                    particles::hit(&mut state.particles, cx, cy, rng);
                    spent = true;
                } else if let Some((cx, cy)) = boss_center {
                    combat::damage_boss(state, damage);
                    particles::hit(&mut state.particles, cx, cy, rng);
                    spent = true;
                }
            }
            Owner::Boss => {
                if state.player.is_alive && intersects(&rect, &state.player.body.rect()) {
                    let (cx, cy) = state.player.body.center();
                    if combat::damage_player(state, damage, now).landed() {
                        particles::hit(&mut state.particles, cx, cy, rng);
                    }
                    spent = true;
                }
            }
        }

        if !spent && state.platforms.iter().any(|p| intersects(&rect, &p.rect)) {
            particles::hit(&mut state.particles, rect.x, rect.y, rng);
            spent = true;
        }

        let outside = rect.x < view.x
            || rect.x > view.right()
            || rect.y < view.y
            || rect.y > view.bottom();
        if spent || outside || state.projectiles[i].age >= cfg.max_age_ticks {
            state.projectiles[i].active = false;
        }
    }
}

// ── Pickups ──────────────────────────────────────────────────────────────────

pub fn update_collectibles(state: &mut GameState, dt_ms: f32) {
    for item in state.collectibles.iter_mut().filter(|c| !c.collected) {
        item.bob_phase += dt_ms * 0.005;
        item.y += item.bob_phase.sin() * 0.5;
    }
}

// ── Bookkeeping ──────────────────────────────────────────────────────────────

/// Remove everything marked dead, spent or collected during this tick.
pub fn compact(state: &mut GameState) {
    state.enemies.retain(|e| e.is_alive);
    state.projectiles.retain(|p| p.active);
    state.collectibles.retain(|c| !c.collected);
    let cfg = state.tuning.particles;
    particles::prune(&mut state.particles, &cfg);
}

/// Victory once every enemy is gone and the boss is absent or dead.
pub fn check_game_end(state: &mut GameState) {
    if state.status == GameStatus::Playing && state.enemies.is_empty() && !state.boss_alive() {
        state.status = GameStatus::Victory;
        info!(score = state.score, level = state.level, "Level cleared");
    }
}
