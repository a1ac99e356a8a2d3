//! Enemy and boss decision making.
//!
//! Each function steers one body for one tick and hands back what it
//! wants to do to the world; `compute` applies it.

use rand::Rng;
use tracing::info;

use crate::animation::{AnimTag, Animator};
use crate::combat::melee_hitbox;
use crate::config::{BossConfig, EnemyConfig};
use crate::entities::{
    Body, Boss, BossPhase, Enemy, EnemyKind, Owner, Projectile, ProjectileKind,
};
use crate::geometry::Rect;

/// A strike zone and the damage it deals on contact with the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub hitbox: Rect,
    pub power: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BossAction {
    Melee(Strike),
    /// Velocity already set; the caller schedules the slow-down.
    Charge,
    Fireball(Projectile),
    /// Minion spawn point, top-left.
    Summon { x: f32, y: f32 },
}

fn off_cooldown(last: Option<u64>, now: u64, cooldown_ms: u64) -> bool {
    last.map_or(true, |t| now.saturating_sub(t) > cooldown_ms)
}

/// Only replace the clip when no one-shot is still running.
fn play_loop(animation: &mut Animator, tag: AnimTag) {
    if !animation.is_locked() {
        animation.play(tag);
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Chase and strike a target inside the detection box, idle otherwise.
pub fn think_enemy(
    enemy: &mut Enemy,
    target: Option<&Body>,
    now: u64,
    cfg: &EnemyConfig,
    rng: &mut impl Rng,
) -> Option<Strike> {
    let target = target?;
    let dx = enemy.body.x - target.x;
    let distance = dx.abs();
    let vertical = (enemy.body.y - target.y).abs();

    if distance < enemy.detection_range && vertical < cfg.vertical_band {
        enemy.body.facing_right = enemy.body.x < target.x;

        if distance < enemy.attack_range
            && off_cooldown(enemy.last_attack, now, enemy.attack_cooldown_ms)
        {
            enemy.last_attack = Some(now);
            enemy.animation.play(AnimTag::Attack);
            return Some(Strike {
                hitbox: melee_hitbox(&enemy.body, enemy.hitbox_width),
                power: enemy.attack_power,
            });
        }

        if distance > cfg.standoff {
            let direction = enemy.body.facing_sign();
            enemy.body.vx = (enemy.body.vx + direction * cfg.chase_acceleration)
                .clamp(-enemy.speed, enemy.speed);
            play_loop(&mut enemy.animation, AnimTag::Move);
        }
        return None;
    }

    idle(enemy, cfg, rng);
    None
}

fn idle(enemy: &mut Enemy, cfg: &EnemyConfig, rng: &mut impl Rng) {
    let body = &mut enemy.body;
    if enemy.kind == EnemyKind::Slime {
        if body.is_grounded && rng.gen_bool(cfg.hop_chance.clamp(0.0, 1.0)) {
            body.vy = -enemy.bounce_height;
            body.vx = (rng.gen::<f32>() - 0.5) * enemy.speed;
        }
    } else {
        if rng.gen_bool(cfg.turn_chance.clamp(0.0, 1.0)) {
            body.facing_right = !body.facing_right;
        }
        let cap = enemy.speed * 0.5;
        body.vx = (body.vx + body.facing_sign() * cfg.drift_acceleration).clamp(-cap, cap);
    }

    let tag = if body.vx.abs() > 0.1 {
        AnimTag::Move
    } else {
        AnimTag::Idle
    };
    play_loop(&mut enemy.animation, tag);
}

// ── Boss ──────────────────────────────────────────────────────────────────────

/// Flip into phase two the first time health drops to the threshold.
pub fn enter_phase_two_if_due(boss: &mut Boss, cfg: &BossConfig) -> bool {
    if boss.phase != BossPhase::One || boss.health > boss.max_health * cfg.phase_threshold {
        return false;
    }
    boss.phase = BossPhase::Two;
    boss.speed *= cfg.phase_speed_multiplier;
    boss.attack_power *= cfg.phase_power_multiplier;
    info!(
        health = boss.health,
        speed = boss.speed,
        power = boss.attack_power,
        "Boss entered phase two"
    );
    true
}

fn tick_cooldown(value: &mut f32, dt_ms: f32) {
    if *value > 0.0 {
        *value = (*value - dt_ms).max(0.0);
    }
}

/// One boss decision.  `minions` is the number of summoned enemies still
/// alive, checked against the summon cap.
pub fn think_boss(
    boss: &mut Boss,
    target: Option<&Body>,
    now: u64,
    dt_ms: f32,
    minions: usize,
    cfg: &BossConfig,
) -> Option<BossAction> {
    tick_cooldown(&mut boss.cooldowns.charge, dt_ms);
    tick_cooldown(&mut boss.cooldowns.fireball, dt_ms);
    tick_cooldown(&mut boss.cooldowns.summon, dt_ms);

    let target = target?;
    enter_phase_two_if_due(boss, cfg);

    boss.body.facing_right = boss.body.x < target.x;
    let direction = boss.body.facing_sign();
    let distance = (boss.body.x - target.x).abs();
    let ready = off_cooldown(boss.last_attack, now, cfg.attack_gap_ms);

    if ready && distance < cfg.melee_range {
        boss.last_attack = Some(now);
        boss.animation.play(AnimTag::Attack);
        return Some(BossAction::Melee(Strike {
            hitbox: melee_hitbox(&boss.body, cfg.melee_hitbox_width),
            power: boss.attack_power,
        }));
    }

    if ready && distance > cfg.charge_range && boss.cooldowns.charge <= 0.0 {
        boss.cooldowns.charge = cfg.charge_cooldown_ms;
        boss.is_charging = true;
        boss.body.vx = direction * boss.speed * cfg.charge_speed_factor;
        boss.animation.play(AnimTag::Skill);
        return Some(BossAction::Charge);
    }

    if ready && boss.cooldowns.fireball <= 0.0 {
        boss.cooldowns.fireball = cfg.fireball_cooldown_ms;
        boss.animation.play(AnimTag::Skill);
        let (cx, cy) = boss.body.center();
        let mut shot = Body::new(cx, cy, cfg.fireball_size, cfg.fireball_size);
        shot.vx = direction * cfg.fireball_speed;
        shot.vy = -cfg.fireball_lift;
        shot.facing_right = boss.body.facing_right;
        return Some(BossAction::Fireball(Projectile::new(
            ProjectileKind::Fireball,
            Owner::Boss,
            shot,
            boss.attack_power * cfg.fireball_damage_factor,
        )));
    }

    if ready
        && boss.phase == BossPhase::Two
        && boss.cooldowns.summon <= 0.0
        && minions < cfg.summon_cap
    {
        boss.cooldowns.summon = cfg.summon_cooldown_ms;
        boss.animation.play(AnimTag::Skill);
        let body = &boss.body;
        let x = if body.facing_right {
            body.x - 40.0
        } else {
            body.x + body.width + 10.0
        };
        return Some(BossAction::Summon {
            x,
            y: body.y + body.height - 40.0,
        });
    }

    // Charging bodies keep their velocity until the charge ends.
    if !boss.is_charging {
        boss.body.vx = (boss.body.vx + direction * cfg.approach_acceleration)
            .clamp(-boss.speed, boss.speed);
        play_loop(&mut boss.animation, AnimTag::Move);
    }
    None
}
