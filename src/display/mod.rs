//! Rendering layer.
//!
//! `render` walks an immutable `GameState` and issues drawing commands to
//! a `Surface`.  No game logic runs here.  World entities are drawn in
//! camera space; the UI overlay and debug text in screen space.

pub mod terminal;

use crossterm::style::Color;

use crate::animation::AnimTag;
use crate::entities::{
    Boss, BossPhase, Collectible, CollectibleKind, Enemy, EnemyKind, EntityRef, GameState,
    GameStatus, Particle, ParticleShape, Platform, PlatformKind, Player, Projectile,
    ProjectileKind,
};
use crate::geometry::Rect;

pub use terminal::TerminalSurface;

// ── Colour palette ────────────────────────────────────────────────────────────

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

const C_SKY_TOP: Color = rgb(0x00, 0x1F, 0x3F);
const C_SKY_MID: Color = rgb(0x00, 0x2F, 0x5F);
const C_SKY_LOW: Color = rgb(0x00, 0x3F, 0x7F);
const C_STAR: Color = rgb(0xFF, 0xFF, 0xFF);
const C_PLATFORM: Color = rgb(0x00, 0x40, 0xD1);
const C_PLATFORM_EDGE: Color = rgb(0x00, 0xB4, 0xFF);
const C_GROUND: Color = rgb(0x00, 0x2F, 0xA7);
const C_PLAYER: Color = rgb(0xFF, 0xD7, 0x00);
const C_PLAYER_HURT: Color = rgb(0xFF, 0x6B, 0x6B);
const C_SHIELD: Color = rgb(0x00, 0xB4, 0xFF);
const C_EYE: Color = rgb(0x00, 0x00, 0x00);
const C_BLADE: Color = rgb(0xC0, 0xC0, 0xC0);
const C_SLIME: Color = rgb(0x00, 0xFF, 0x88);
const C_SKELETON: Color = rgb(0xCC, 0xCC, 0xCC);
const C_ORC: Color = rgb(0x8B, 0x45, 0x13);
const C_ENEMY_EYE: Color = rgb(0xFF, 0x00, 0x00);
const C_BOSS: Color = rgb(0x8B, 0x00, 0x00);
const C_BOSS_AURA: Color = rgb(0xFF, 0x00, 0x00);
const C_BOSS_RAGE: Color = rgb(0xFF, 0x45, 0x00);
const C_CROWN: Color = rgb(0xFF, 0xD7, 0x00);
const C_BAR_BACK: Color = rgb(0x33, 0x33, 0x33);
const C_BAR_HURT: Color = rgb(0x8B, 0x00, 0x00);
const C_HEALTH: Color = rgb(0x00, 0xFF, 0x00);
const C_ENERGY: Color = rgb(0x00, 0xB4, 0xFF);
const C_BLAST: Color = rgb(0x00, 0xB4, 0xFF);
const C_FIREBALL: Color = rgb(0xFF, 0x45, 0x00);
const C_FIREBALL_CORE: Color = rgb(0xFF, 0xD7, 0x00);
const C_HEALTH_ITEM: Color = rgb(0xFF, 0x00, 0x00);
const C_ENERGY_ITEM: Color = rgb(0x00, 0xB4, 0xFF);
const C_COIN: Color = rgb(0xFF, 0xD7, 0x00);
const C_POWERUP: Color = rgb(0xFF, 0x00, 0xFF);
const C_TEXT: Color = rgb(0xFF, 0xFF, 0xFF);
const C_GOLD: Color = rgb(0xFF, 0xD7, 0x00);
const C_SHADE: Color = rgb(0x00, 0x00, 0x00);
const C_GAME_OVER: Color = rgb(0x8B, 0x00, 0x00);
const C_VICTORY: Color = rgb(0x00, 0x2F, 0xA7);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A 2D canvas in logical pixels.  `translate` offsets every later draw
/// call until `reset_transform`.
pub trait Surface {
    /// Logical width and height.
    fn size(&self) -> (f32, f32);
    fn clear(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn reset_transform(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f32);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color, alpha: f32);
    /// Vertical gradient; stops are `(offset 0..=1, colour)` in order.
    fn fill_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]);
    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, align: Align);
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render(surface: &mut dyn Surface, state: &GameState, debug: bool) {
    surface.clear();

    surface.translate(-state.camera.x, -state.camera.y);
    draw_background(surface, state);
    for entity in state.entities() {
        match entity {
            EntityRef::Platform(p) => draw_platform(surface, p),
            EntityRef::Collectible(c) => draw_collectible(surface, c),
            EntityRef::Player(p) => draw_player(surface, p),
            EntityRef::Enemy(e) => draw_enemy(surface, e),
            EntityRef::Boss(b) => draw_boss(surface, b),
            EntityRef::Projectile(p) => draw_projectile(surface, p),
            EntityRef::Particle(p) => draw_particle(surface, p),
        }
    }
    surface.reset_transform();

    draw_ui(surface, state);
    if debug {
        draw_debug(surface, state);
    }
}

// ── Background ────────────────────────────────────────────────────────────────

fn draw_background(surface: &mut dyn Surface, state: &GameState) {
    let (w, h) = surface.size();
    let cam = &state.camera;
    surface.fill_gradient(
        Rect::new(cam.x, cam.y, w, h),
        &[(0.0, C_SKY_TOP), (0.5, C_SKY_MID), (1.0, C_SKY_LOW)],
    );

    // Parallax star field, deterministic per index.
    let span = w * 2.0;
    for i in 0..100u32 {
        let fi = i as f32;
        let x = (fi * 123.0) % span + cam.x * 0.1;
        let y = (fi * 456.0) % (h * 0.6);
        let twinkle = (fi + state.frame as f32 * 0.01).sin() * 0.5 + 1.0;
        surface.fill_rect(Rect::new(x, y, twinkle, twinkle), C_STAR, 0.8);
    }
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_platform(surface: &mut dyn Surface, platform: &Platform) {
    let color = match platform.kind {
        PlatformKind::Ground => C_GROUND,
        PlatformKind::Ledge => C_PLATFORM,
    };
    let r = platform.rect;
    surface.fill_rect(r, color, 1.0);
    surface.fill_rect(Rect::new(r.x, r.y, r.width, 2.0), C_PLATFORM_EDGE, 1.0);
}

fn draw_collectible(surface: &mut dyn Surface, item: &Collectible) {
    let color = match item.kind {
        CollectibleKind::Health => C_HEALTH_ITEM,
        CollectibleKind::Energy => C_ENERGY_ITEM,
        CollectibleKind::Coin => C_COIN,
        CollectibleKind::PowerUp => C_POWERUP,
    };
    let (cx, cy) = (item.x + item.width / 2.0, item.y + item.height / 2.0);
    surface.fill_circle(cx, cy, 15.0, color, 0.3);
    surface.fill_rect(Rect::new(item.x, item.y, item.width, item.height), color, 1.0);
    surface.fill_rect(
        Rect::new(item.x + 5.0, item.y + 5.0, item.width - 10.0, item.height - 10.0),
        C_STAR,
        0.6,
    );
}

fn draw_player(surface: &mut dyn Surface, player: &Player) {
    let body = &player.body;
    let (cx, cy) = body.center();

    if player.shield_active() {
        surface.fill_circle(cx, cy, 35.0, C_SHIELD, 0.3);
    }

    let color = if player.animation.current() == AnimTag::Hurt {
        C_PLAYER_HURT
    } else {
        C_PLAYER
    };
    surface.fill_rect(body.rect(), color, 1.0);

    let eye_x = if body.facing_right { body.x + 20.0 } else { body.x + 8.0 };
    surface.fill_rect(Rect::new(eye_x, body.y + 10.0, 4.0, 4.0), C_EYE, 1.0);

    let blade_x = if body.facing_right { body.x + body.width } else { body.x - 20.0 };
    surface.fill_rect(Rect::new(blade_x, body.y + 15.0, 20.0, 4.0), C_BLADE, 1.0);

    if player.is_attacking {
        let reach_x = if body.facing_right { body.x + body.width } else { body.x - 40.0 };
        surface.fill_rect(Rect::new(reach_x, body.y, 40.0, body.height), C_PLAYER, 0.5);
    }

    if player.health < player.max_health {
        draw_health_bar(surface, body.rect(), player.health, player.max_health, 4.0);
    }
}

fn draw_enemy(surface: &mut dyn Surface, enemy: &Enemy) {
    let body = &enemy.body;
    let color = match enemy.kind {
        EnemyKind::Slime => C_SLIME,
        EnemyKind::Skeleton => C_SKELETON,
        EnemyKind::Orc => C_ORC,
    };
    surface.fill_rect(body.rect(), color, 1.0);

    let eye_x = if body.facing_right { body.x + 20.0 } else { body.x + 8.0 };
    surface.fill_rect(Rect::new(eye_x, body.y + 8.0, 4.0, 4.0), C_ENEMY_EYE, 1.0);

    if enemy.health < enemy.max_health {
        draw_health_bar(surface, body.rect(), enemy.health, enemy.max_health, 4.0);
    }

    if enemy.kind == EnemyKind::Slime {
        let glow = Rect::new(body.x - 2.0, body.y - 2.0, body.width + 4.0, body.height + 4.0);
        surface.fill_rect(glow, C_SLIME, 0.3);
    }
}

fn draw_boss(surface: &mut dyn Surface, boss: &Boss) {
    let body = &boss.body;
    let (cx, cy) = body.center();
    let aura = match boss.phase {
        BossPhase::One => C_BOSS_AURA,
        BossPhase::Two => C_BOSS_RAGE,
    };
    surface.fill_circle(cx, cy, 60.0, aura, 0.2);

    surface.fill_rect(body.rect(), C_BOSS, 1.0);
    surface.fill_rect(Rect::new(body.x + 10.0, body.y - 10.0, 60.0, 15.0), C_CROWN, 1.0);
    surface.fill_rect(Rect::new(body.x + 15.0, body.y + 20.0, 8.0, 8.0), C_ENEMY_EYE, 1.0);
    surface.fill_rect(Rect::new(body.x + 55.0, body.y + 20.0, 8.0, 8.0), C_ENEMY_EYE, 1.0);

    let bar = Rect::new(body.x, body.y - 20.0, body.width, 8.0);
    surface.fill_rect(bar, C_BAR_HURT, 1.0);
    let ratio = (boss.health / boss.max_health).clamp(0.0, 1.0);
    surface.fill_rect(Rect::new(bar.x, bar.y, bar.width * ratio, bar.height), C_HEALTH, 1.0);
}

fn draw_projectile(surface: &mut dyn Surface, projectile: &Projectile) {
    let body = &projectile.body;
    let (color, core) = match projectile.kind {
        ProjectileKind::EnergyBlast => (C_BLAST, C_STAR),
        ProjectileKind::Fireball => (C_FIREBALL, C_FIREBALL_CORE),
    };

    let len = projectile.trail.len().max(1) as f32;
    for (i, &(tx, ty)) in projectile.trail.iter().enumerate() {
        let alpha = (i as f32 + 1.0) / len * 0.5;
        let size = body.height * ((i as f32 + 1.0) / len);
        surface.fill_rect(Rect::new(tx, ty, size, size), color, alpha);
    }

    match projectile.kind {
        ProjectileKind::EnergyBlast => {
            surface.fill_rect(body.rect(), color, 1.0);
            let inner = Rect::new(body.x + 2.0, body.y + 2.0, body.width - 4.0, body.height - 4.0);
            surface.fill_rect(inner, core, 0.8);
        }
        ProjectileKind::Fireball => {
            let (cx, cy) = body.center();
            surface.fill_circle(cx, cy, body.width / 2.0, color, 1.0);
            surface.fill_circle(cx, cy, body.width / 4.0, core, 1.0);
        }
    }
}

fn draw_particle(surface: &mut dyn Surface, particle: &Particle) {
    let alpha = particle.alpha();
    match particle.shape {
        ParticleShape::Circle => {
            surface.fill_circle(particle.x, particle.y, particle.size, particle.color, alpha)
        }
        ParticleShape::Square => {
            let half = particle.size / 2.0;
            let r = Rect::new(particle.x - half, particle.y - half, particle.size, particle.size);
            surface.fill_rect(r, particle.color, alpha);
        }
    }
}

/// Small bar floating above `owner`.
fn draw_health_bar(surface: &mut dyn Surface, owner: Rect, health: f32, max: f32, height: f32) {
    let bar = Rect::new(owner.x, owner.y - 10.0, owner.width, height);
    surface.fill_rect(bar, C_BAR_HURT, 1.0);
    let ratio = if max > 0.0 { (health / max).clamp(0.0, 1.0) } else { 0.0 };
    surface.fill_rect(Rect::new(bar.x, bar.y, bar.width * ratio, bar.height), C_HEALTH, 1.0);
}

// ── UI overlay ────────────────────────────────────────────────────────────────

fn draw_ui(surface: &mut dyn Surface, state: &GameState) {
    let (w, h) = surface.size();
    let player = &state.player;

    draw_meter(surface, Rect::new(20.0, 20.0, 200.0, 16.0), player.health, player.max_health, C_HEALTH);
    draw_meter(surface, Rect::new(20.0, 44.0, 200.0, 12.0), player.energy, player.max_energy, C_ENERGY);
    surface.text(w - 20.0, 30.0, &format!("Score: {}", state.score), C_GOLD, Align::Right);
    surface.text(
        w - 20.0,
        54.0,
        &format!("Lives: {}  Level: {}", state.lives, state.level),
        C_TEXT,
        Align::Right,
    );

    let (cx, cy) = (w / 2.0, h / 2.0);
    match state.status {
        GameStatus::Menu => {
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), C_SHADE, 0.6);
            surface.text(cx, cy - 40.0, "KNIGHT", C_GOLD, Align::Center);
            surface.text(cx, cy + 10.0, "Press ENTER to start", C_TEXT, Align::Center);
        }
        GameStatus::Paused => {
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), C_SHADE, 0.7);
            surface.text(cx, cy - 20.0, "PAUSED", C_TEXT, Align::Center);
            surface.text(cx, cy + 20.0, "Press P to resume", C_TEXT, Align::Center);
        }
        GameStatus::GameOver => {
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), C_GAME_OVER, 0.8);
            surface.text(cx, cy - 60.0, "GAME OVER", C_TEXT, Align::Center);
            draw_final_score(surface, state, cx, cy);
        }
        GameStatus::Victory => {
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), C_VICTORY, 0.8);
            surface.text(cx, cy - 60.0, "VICTORY!", C_GOLD, Align::Center);
            draw_final_score(surface, state, cx, cy);
        }
        GameStatus::Playing | GameStatus::Stopped => {}
    }
}

fn draw_meter(surface: &mut dyn Surface, rect: Rect, value: f32, max: f32, color: Color) {
    surface.fill_rect(rect, C_BAR_BACK, 1.0);
    let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    surface.fill_rect(Rect::new(rect.x, rect.y, rect.width * ratio, rect.height), color, 1.0);
}

fn draw_final_score(surface: &mut dyn Surface, state: &GameState, cx: f32, cy: f32) {
    let best = state.high_score.max(state.score);
    surface.text(cx, cy - 10.0, &format!("Final Score: {}", state.score), C_GOLD, Align::Center);
    surface.text(cx, cy + 20.0, &format!("Best: {best}"), C_TEXT, Align::Center);
    surface.text(cx, cy + 60.0, "R - Play Again   Q - Quit", C_TEXT, Align::Center);
}

// ── Debug overlay ─────────────────────────────────────────────────────────────

fn draw_debug(surface: &mut dyn Surface, state: &GameState) {
    let player = &state.player.body;
    let lines = [
        format!("status: {:?}  frame: {}", state.status, state.frame),
        format!("player: ({:.0}, {:.0}) v=({:.1}, {:.1})", player.x, player.y, player.vx, player.vy),
        format!("camera: ({:.0}, {:.0}) shake {:.1}", state.camera.x, state.camera.y, state.camera.shake),
        format!("enemies: {}  boss: {}", state.enemies.len(), state.boss_alive()),
        format!("projectiles: {}  particles: {}", state.projectiles.len(), state.particles.len()),
        format!("events: {}", state.events.len()),
    ];
    for (i, line) in lines.iter().enumerate() {
        surface.text(20.0, 90.0 + 20.0 * i as f32, line, C_TEXT, Align::Left);
    }
}
