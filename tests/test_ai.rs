use knight::ai::*;
use knight::config::Tuning;
use knight::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(3)
}

fn skeleton_at(x: f32, y: f32) -> Enemy {
    let cfg = Tuning::default().enemies;
    Enemy::new(EnemyKind::Skeleton, x, y, cfg.archetype(EnemyKind::Skeleton))
}

fn target_at(x: f32, y: f32) -> Body {
    Body::new(x, y, 32.0, 48.0)
}

fn boss_at(x: f32, y: f32) -> Boss {
    Boss::new(x, y, &Tuning::default().boss)
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[test]
fn enemy_chases_detected_target() {
    let cfg = Tuning::default().enemies;
    let mut enemy = skeleton_at(300.0, 400.0);
    let target = target_at(200.0, 400.0);

    let strike = think_enemy(&mut enemy, Some(&target), 0, &cfg, &mut seeded_rng());

    assert!(strike.is_none());
    assert!(!enemy.body.facing_right);
    assert_eq!(enemy.body.vx, -0.5);
}

#[test]
fn enemy_strikes_in_range_then_waits_for_cooldown() {
    let cfg = Tuning::default().enemies;
    let mut rng = seeded_rng();
    let mut enemy = skeleton_at(300.0, 400.0);
    let target = target_at(240.0, 400.0);

    let strike = think_enemy(&mut enemy, Some(&target), 1000, &cfg, &mut rng)
        .expect("in range with no previous attack");
    assert_eq!(strike.power, 15.0);
    assert_eq!(strike.hitbox.x, 270.0);
    assert_eq!(strike.hitbox.width, 30.0);
    assert_eq!(enemy.last_attack, Some(1000));

    assert!(think_enemy(&mut enemy, Some(&target), 1100, &cfg, &mut rng).is_none());
    assert!(think_enemy(&mut enemy, Some(&target), 2201, &cfg, &mut rng).is_some());
}

#[test]
fn enemy_ignores_target_outside_vertical_band() {
    let cfg = Tuning::default().enemies;
    let mut enemy = skeleton_at(300.0, 400.0);
    let target = target_at(250.0, 200.0);

    assert!(think_enemy(&mut enemy, Some(&target), 0, &cfg, &mut seeded_rng()).is_none());
    assert!(enemy.last_attack.is_none());
    assert!(enemy.body.vx.abs() <= enemy.speed * 0.5);
}

#[test]
fn enemy_without_target_stays_put() {
    let cfg = Tuning::default().enemies;
    let mut enemy = skeleton_at(300.0, 400.0);
    let before = enemy.body.clone();
    assert!(think_enemy(&mut enemy, None, 0, &cfg, &mut seeded_rng()).is_none());
    assert_eq!(enemy.body, before);
}

#[test]
fn idle_drift_is_capped_at_half_speed() {
    let cfg = Tuning::default().enemies;
    let mut rng = seeded_rng();
    let mut enemy = skeleton_at(300.0, 400.0);
    let far = target_at(2000.0, 400.0);
    for _ in 0..200 {
        think_enemy(&mut enemy, Some(&far), 0, &cfg, &mut rng);
        assert!(enemy.body.vx.abs() <= enemy.speed * 0.5 + 1e-6);
    }
}

// ── Boss ──────────────────────────────────────────────────────────────────────

#[test]
fn boss_melees_when_close() {
    let cfg = Tuning::default().boss;
    let mut boss = boss_at(500.0, 400.0);
    let action = think_boss(&mut boss, Some(&target_at(450.0, 400.0)), 0, 16.0, 0, &cfg);

    match action {
        Some(BossAction::Melee(strike)) => {
            assert_eq!(strike.power, 35.0);
            assert_eq!(strike.hitbox.x, 440.0);
            assert_eq!(strike.hitbox.width, 60.0);
        }
        other => panic!("expected melee, got {other:?}"),
    }
    assert_eq!(boss.last_attack, Some(0));
}

#[test]
fn boss_charges_from_afar() {
    let cfg = Tuning::default().boss;
    let mut boss = boss_at(500.0, 400.0);
    let action = think_boss(&mut boss, Some(&target_at(100.0, 400.0)), 0, 16.0, 0, &cfg);

    assert_eq!(action, Some(BossAction::Charge));
    assert_eq!(boss.body.vx, -6.0);
    assert!(boss.is_charging);
    assert_eq!(boss.cooldowns.charge, 5000.0);
}

#[test]
fn boss_throws_fireball_at_mid_range() {
    let cfg = Tuning::default().boss;
    let mut boss = boss_at(500.0, 400.0);
    let action = think_boss(&mut boss, Some(&target_at(350.0, 400.0)), 0, 16.0, 0, &cfg);

    let Some(BossAction::Fireball(fireball)) = action else {
        panic!("expected a fireball, got {action:?}");
    };
    assert_eq!(fireball.owner, Owner::Boss);
    assert_eq!(fireball.kind, ProjectileKind::Fireball);
    assert_eq!(fireball.body.vx, -8.0);
    assert_eq!(fireball.body.vy, -2.0);
    assert!((fireball.damage - 52.5).abs() < 1e-4);
    assert_eq!(boss.cooldowns.fireball, 3000.0);
}

#[test]
fn boss_approaches_between_attacks() {
    let cfg = Tuning::default().boss;
    let mut boss = boss_at(500.0, 400.0);
    let target = target_at(450.0, 400.0);
    think_boss(&mut boss, Some(&target), 0, 16.0, 0, &cfg);
    boss.body.vx = 0.0;

    let action = think_boss(&mut boss, Some(&target), 100, 16.0, 0, &cfg);
    assert!(action.is_none());
    assert!((boss.body.vx + 0.8).abs() < 1e-6);
}

#[test]
fn boss_summons_only_in_phase_two_and_under_the_cap() {
    let cfg = Tuning::default().boss;
    let target = target_at(350.0, 400.0);

    let mut boss = boss_at(500.0, 400.0);
    boss.cooldowns.fireball = 1000.0;
    let action = think_boss(&mut boss, Some(&target), 0, 16.0, 0, &cfg);
    assert!(action.is_none());
    assert_eq!(boss.phase, BossPhase::One);

    let mut boss = boss_at(500.0, 400.0);
    boss.health = 140.0;
    boss.cooldowns.fireball = 1000.0;
    let action = think_boss(&mut boss, Some(&target), 0, 16.0, 0, &cfg);
    assert_eq!(boss.phase, BossPhase::Two);
    assert_eq!(action, Some(BossAction::Summon { x: 590.0, y: 460.0 }));

    let mut boss = boss_at(500.0, 400.0);
    boss.health = 140.0;
    boss.cooldowns.fireball = 1000.0;
    let action = think_boss(&mut boss, Some(&target), 0, 16.0, cfg.summon_cap, &cfg);
    assert!(action.is_none());
}

#[test]
fn boss_cooldowns_tick_down_and_floor_at_zero() {
    let cfg = Tuning::default().boss;
    let mut boss = boss_at(500.0, 400.0);
    boss.cooldowns.charge = 10.0;
    boss.cooldowns.fireball = 100.0;
    think_boss(&mut boss, None, 0, 16.0, 0, &cfg);
    assert_eq!(boss.cooldowns.charge, 0.0);
    assert_eq!(boss.cooldowns.fireball, 84.0);
}
