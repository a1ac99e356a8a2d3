//! Combat and skill resolution: melee, skills, damage, death, pickups.
//!
//! Calls that are refused (attacking on cooldown, casting without
//! energy, hitting something already dead) change nothing and report it
//! through their return value.

use std::f32::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::ai;
use crate::animation::AnimTag;
use crate::config::PlayerConfig;
use crate::entities::{
    Body, Collectible, CollectibleKind, GameState, GameStatus, Owner, Player, Projectile,
    ProjectileKind, SkillEffect, SkillKind,
};
use crate::events::ScheduledEvent;
use crate::geometry::{intersects, Rect};
use crate::particles;

/// What a damage call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// Target absent or already dead.
    Ignored,
    /// Negated by an active shield.
    Absorbed,
    Wounded,
    Killed,
}

impl Hit {
    pub fn landed(self) -> bool {
        matches!(self, Hit::Wounded | Hit::Killed)
    }
}

/// Fixed-width strike zone flush against the facing side of `body`.
pub fn melee_hitbox(body: &Body, width: f32) -> Rect {
    let x = if body.facing_right {
        body.x + body.width
    } else {
        body.x - width
    };
    Rect::new(x, body.y, width, body.height)
}

// ── Timers ────────────────────────────────────────────────────────────────────

/// Count down the combo window; reset the combo when it runs out.
pub fn tick_combo(player: &mut Player, dt_ms: f32) {
    if player.combo_timer > 0.0 {
        player.combo_timer -= dt_ms;
        if player.combo_timer <= 0.0 {
            player.combo_timer = 0.0;
            player.combo_count = 0;
        }
    }
}

pub fn tick_timers(player: &mut Player, dt_ms: f32) {
    if player.attack_cooldown > 0.0 {
        player.attack_cooldown -= dt_ms;
        if player.attack_cooldown <= 0.0 {
            player.attack_cooldown = 0.0;
            player.is_attacking = false;
        }
    }
    tick_combo(player, dt_ms);
}

/// Switch off duration skills whose absolute expiry has passed.
pub fn expire_skills(player: &mut Player, now: u64) {
    for skill in &mut player.skills {
        if let SkillEffect::Timed { active, ends_at, .. } = &mut skill.effect {
            if *active && now > *ends_at {
                *active = false;
                debug!(skill = ?skill.kind, "Skill expired");
            }
        }
    }
}

// ── Player offence ────────────────────────────────────────────────────────────

/// Swing at everything in front of the player.  Returns `false` while the
/// swing is on cooldown.
pub fn player_attack(state: &mut GameState, rng: &mut impl Rng) -> bool {
    let cfg = state.tuning.player;
    let player = &mut state.player;
    if !player.is_alive || player.attack_cooldown > 0.0 {
        return false;
    }

    player.is_attacking = true;
    player.animation.play(AnimTag::Attack);
    player.attack_cooldown = cfg.attack_cooldown_ms;
    player.combo_count += 1;
    player.combo_timer = cfg.combo_window_ms;

    let hitbox = melee_hitbox(&player.body, cfg.hitbox_width);
    let damage = player.attack_power + player.combo_count as f32 * cfg.combo_bonus;

    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if enemy.is_alive && intersects(&hitbox, &enemy.body.rect()) {
            let (cx, cy) = enemy.body.center();
            damage_enemy(state, i, damage, rng);
            particles::hit(&mut state.particles, cx, cy, rng);
        }
    }

    let boss_center = state
        .boss
        .as_ref()
        .filter(|b| b.is_alive && intersects(&hitbox, &b.body.rect()))
        .map(|b| b.body.center());
    if let Some((cx, cy)) = boss_center {
        damage_boss(state, damage);
        particles::hit(&mut state.particles, cx, cy, rng);
    }

    particles::slash(&mut state.particles, &hitbox, rng);
    true
}

/// Enough energy and the cooldown since the last cast has elapsed.
pub fn can_use_skill(player: &Player, kind: SkillKind, now: u64) -> bool {
    if !player.is_alive {
        return false;
    }
    let Some(skill) = player.skill(kind) else {
        return false;
    };
    let off_cooldown = skill
        .last_used
        .map_or(true, |t| now.saturating_sub(t) >= skill.cooldown_ms);
    player.energy >= skill.energy_cost && off_cooldown
}

/// Cast `kind` if allowed.  Instant skills spawn a projectile; duration
/// skills switch on until an absolute expiry time.
pub fn use_skill(state: &mut GameState, kind: SkillKind, now: u64, rng: &mut impl Rng) -> bool {
    if !can_use_skill(&state.player, kind, now) {
        return false;
    }
    let player = &mut state.player;
    let Some(skill) = player.skill_mut(kind) else {
        return false;
    };

    skill.last_used = Some(now);
    let cost = skill.energy_cost;
    if let SkillEffect::Timed { duration_ms, active, ends_at } = &mut skill.effect {
        *active = true;
        *ends_at = now + *duration_ms;
    }
    let effect = skill.effect.clone();
    player.energy -= cost;

    let (cx, cy) = player.body.center();
    match effect {
        SkillEffect::Projectile { damage, speed, width, height } => {
            player.animation.play(AnimTag::Skill);
            let body = &player.body;
            let x = if body.facing_right { body.x + body.width } else { body.x };
            let mut shot = Body::new(x, body.y + body.height / 2.0, width, height);
            shot.vx = body.facing_sign() * speed;
            shot.facing_right = body.facing_right;
            state.projectiles.push(Projectile::new(
                ProjectileKind::EnergyBlast,
                Owner::Player,
                shot,
                damage,
            ));
            particles::skill(&mut state.particles, cx, cy, rng);
        }
        SkillEffect::Timed { .. } => {
            particles::shield(&mut state.particles, cx, cy, rng);
        }
    }

    debug!(skill = ?kind, energy = state.player.energy, "Skill used");
    true
}

// ── Damage ────────────────────────────────────────────────────────────────────

pub fn damage_player(state: &mut GameState, amount: f32, now: u64) -> Hit {
    let cfg = state.tuning.player;
    let player = &mut state.player;
    if !player.is_alive {
        return Hit::Ignored;
    }
    if player.shield_active() {
        return Hit::Absorbed;
    }

    player.health = (player.health - amount).max(0.0);
    player.animation.play(AnimTag::Hurt);
    state.camera.add_shake(cfg.hit_shake);

    if player.health <= 0.0 {
        kill_player(state, now);
        Hit::Killed
    } else {
        Hit::Wounded
    }
}

pub fn damage_enemy(state: &mut GameState, index: usize, amount: f32, rng: &mut impl Rng) -> Hit {
    let cfg = state.tuning.enemies;
    let Some(enemy) = state.enemies.get_mut(index) else {
        return Hit::Ignored;
    };
    if !enemy.is_alive {
        return Hit::Ignored;
    }

    enemy.health = (enemy.health - amount).max(0.0);
    enemy.animation.play(AnimTag::Hurt);
    if enemy.health > 0.0 {
        return Hit::Wounded;
    }

    enemy.is_alive = false;
    enemy.animation.play(AnimTag::Death);
    let (cx, cy) = enemy.body.center();
    let kind = enemy.kind;
    state.score += cfg.kill_score;
    debug!(?kind, score = state.score, "Enemy defeated");

    if rng.gen_bool(cfg.drop_chance.clamp(0.0, 1.0)) {
        drop_item(state, cx, cy, rng);
    }
    Hit::Killed
}

/// Each landed hit scores and may tip the boss into phase two; the
/// killing blow wins the level.
pub fn damage_boss(state: &mut GameState, amount: f32) -> Hit {
    let cfg = state.tuning.boss;
    let boss = match state.boss.as_mut() {
        Some(boss) if boss.is_alive => boss,
        _ => return Hit::Ignored,
    };

    boss.health = (boss.health - amount).max(0.0);
    state.score += cfg.hit_score;
    if boss.health > 0.0 {
        ai::enter_phase_two_if_due(boss, &cfg);
        return Hit::Wounded;
    }

    boss.is_alive = false;
    boss.animation.play(AnimTag::Death);
    state.score += cfg.kill_score;
    if state.status == GameStatus::Playing {
        state.status = GameStatus::Victory;
    }
    info!(score = state.score, "Boss defeated");
    Hit::Killed
}

/// Push `target` away from `source` and pop it upward.
pub fn knockback(target: &mut Body, source: &Body, cfg: &PlayerConfig) {
    let direction = if target.x < source.x { -1.0 } else { 1.0 };
    target.vx += direction * cfg.knockback_x;
    target.vy -= cfg.knockback_y;
}

/// An enemy or boss strike zone landing on the player.
pub fn hostile_strike(
    state: &mut GameState,
    hitbox: &Rect,
    power: f32,
    source: &Body,
    now: u64,
    rng: &mut impl Rng,
) -> Hit {
    if !state.player.is_alive || !intersects(hitbox, &state.player.body.rect()) {
        return Hit::Ignored;
    }
    let hit = damage_player(state, power, now);
    if hit.landed() {
        let cfg = state.tuning.player;
        knockback(&mut state.player.body, source, &cfg);
        let (cx, cy) = state.player.body.center();
        particles::hit(&mut state.particles, cx, cy, rng);
    }
    hit
}

// ── Death & respawn ───────────────────────────────────────────────────────────

/// Runs once per death: lose a life, then either queue a respawn or end
/// the game.
pub fn kill_player(state: &mut GameState, now: u64) {
    if !state.player.is_alive {
        return;
    }
    let cfg = state.tuning.player;
    let player = &mut state.player;
    player.is_alive = false;
    player.is_attacking = false;
    player.body.vx = 0.0;
    player.body.vy = 0.0;

    state.lives = state.lives.saturating_sub(1);
    if state.lives > 0 {
        state
            .events
            .schedule(now + cfg.respawn_delay_ms, ScheduledEvent::RespawnPlayer);
        info!(lives = state.lives, "Player died, respawn queued");
    } else {
        state.status = GameStatus::GameOver;
        info!(score = state.score, "Player out of lives");
    }
}

pub fn respawn_player(state: &mut GameState) {
    let cfg = state.tuning.player;
    let player = &mut state.player;
    player.body = Body::new(cfg.spawn_x, cfg.spawn_y, cfg.width, cfg.height);
    player.health = player.max_health;
    player.energy = player.max_energy;
    player.is_alive = true;
    player.is_attacking = false;
    player.attack_cooldown = 0.0;
    player.combo_count = 0;
    player.combo_timer = 0.0;
    player.animation.play(AnimTag::Idle);
    info!("Player respawned");
}

// ── Pickups ───────────────────────────────────────────────────────────────────

/// Apply a collectible's effect exactly once.
pub fn collect(state: &mut GameState, index: usize, rng: &mut impl Rng) -> bool {
    let cfg = state.tuning.player;
    if !state.player.is_alive {
        return false;
    }
    let Some(item) = state.collectibles.get_mut(index) else {
        return false;
    };
    if item.collected {
        return false;
    }
    item.collected = true;
    let (kind, value, x, y) = (item.kind, item.value, item.x, item.y);

    let player = &mut state.player;
    match kind {
        CollectibleKind::Health => {
            player.health = (player.health + value).min(player.max_health);
        }
        CollectibleKind::Energy => {
            player.energy = (player.energy + value).min(player.max_energy);
        }
        CollectibleKind::Coin => state.score += value as u32,
        CollectibleKind::PowerUp => player.attack_power += cfg.powerup_attack_bonus,
    }

    particles::collect(&mut state.particles, x, y, rng);
    debug!(?kind, "Collected item");
    true
}

/// Drop a random consumable centred on `(x, y)`.
pub fn drop_item(state: &mut GameState, x: f32, y: f32, rng: &mut impl Rng) {
    const DROPS: [CollectibleKind; 3] = [
        CollectibleKind::Health,
        CollectibleKind::Energy,
        CollectibleKind::Coin,
    ];
    let kind = *DROPS.choose(rng).unwrap_or(&CollectibleKind::Coin);
    let half = crate::entities::COLLECTIBLE_SIZE / 2.0;
    state
        .collectibles
        .push(Collectible::new(kind, x - half, y - half, rng.gen::<f32>() * TAU));
}
