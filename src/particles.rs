//! Particle bursts and their per-tick update.

use std::f32::consts::TAU;

use crossterm::style::Color;
use rand::Rng;

use crate::config::ParticleConfig;
use crate::entities::{Particle, ParticleShape};
use crate::geometry::Rect;

const C_SKY_BLUE: Color = Color::Rgb { r: 0x00, g: 0xB4, b: 0xFF };
const C_HIT: Color = Color::Rgb { r: 0xFF, g: 0x6B, b: 0x6B };
const C_GOLD: Color = Color::Rgb { r: 0xFF, g: 0xD7, b: 0x00 };

/// `(rand - 0.5) * span`, i.e. uniform in `[-span/2, span/2)`.
fn jitter(rng: &mut impl Rng, span: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * span
}

fn particle(
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    size: f32,
    color: Color,
    shape: ParticleShape,
    life: f32,
    has_gravity: bool,
) -> Particle {
    Particle {
        x,
        y,
        vx,
        vy,
        size,
        color,
        shape,
        life,
        max_life: life,
        has_gravity,
    }
}

/// Dust kicked up under the feet on take-off.
pub fn jump(out: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for _ in 0..8 {
        let p = particle(
            x + jitter(rng, 20.0),
            y,
            jitter(rng, 4.0),
            rng.gen::<f32>() * -2.0,
            rng.gen::<f32>() * 3.0 + 1.0,
            C_SKY_BLUE,
            ParticleShape::Circle,
            500.0,
            true,
        );
        out.push(p);
    }
}

pub fn hit(out: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for _ in 0..12 {
        let p = particle(
            x,
            y,
            jitter(rng, 8.0),
            jitter(rng, 8.0),
            rng.gen::<f32>() * 4.0 + 2.0,
            C_HIT,
            ParticleShape::Square,
            800.0,
            false,
        );
        out.push(p);
    }
}

/// Sparks scattered over a melee hitbox.
pub fn slash(out: &mut Vec<Particle>, area: &Rect, rng: &mut impl Rng) {
    for _ in 0..6 {
        let p = particle(
            area.x + rng.gen::<f32>() * area.width,
            area.y + rng.gen::<f32>() * area.height,
            jitter(rng, 2.0),
            jitter(rng, 2.0),
            rng.gen::<f32>() * 3.0 + 1.0,
            C_GOLD,
            ParticleShape::Circle,
            300.0,
            false,
        );
        out.push(p);
    }
}

/// Radial ring when a projectile skill is cast.
pub fn skill(out: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for i in 0..20 {
        let angle = i as f32 * 0.314;
        let speed = rng.gen::<f32>() * 6.0 + 2.0;
        let p = particle(
            x,
            y,
            angle.cos() * speed,
            angle.sin() * speed,
            rng.gen::<f32>() * 3.0 + 2.0,
            C_SKY_BLUE,
            ParticleShape::Circle,
            1000.0,
            false,
        );
        out.push(p);
    }
}

pub fn shield(out: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for i in 0..15 {
        let angle = (i as f32 / 15.0) * TAU;
        let p = particle(
            x + angle.cos() * 30.0,
            y + angle.sin() * 30.0,
            angle.cos() * 2.0,
            angle.sin() * 2.0,
            rng.gen::<f32>() * 2.0 + 1.0,
            C_SKY_BLUE,
            ParticleShape::Circle,
            1500.0,
            false,
        );
        out.push(p);
    }
}

pub fn collect(out: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for _ in 0..10 {
        let p = particle(
            x,
            y,
            jitter(rng, 4.0),
            rng.gen::<f32>() * -4.0 - 2.0,
            rng.gen::<f32>() * 2.0 + 1.0,
            C_GOLD,
            ParticleShape::Circle,
            800.0,
            true,
        );
        out.push(p);
    }
}

/// Move, age and fade.  Expired particles stay until `prune`.
pub fn update(particles: &mut [Particle], dt_ms: f32, cfg: &ParticleConfig) {
    for p in particles.iter_mut() {
        p.x += p.vx;
        p.y += p.vy;
        p.life -= dt_ms;
        if p.has_gravity {
            p.vy += cfg.gravity;
        }
        p.vx *= cfg.drag;
        p.vy *= cfg.drag;
    }
}

/// Drop expired particles, then the oldest ones beyond the live cap.
pub fn prune(particles: &mut Vec<Particle>, cfg: &ParticleConfig) {
    particles.retain(|p| p.life > 0.0);
    if particles.len() > cfg.max_live {
        let excess = particles.len() - cfg.max_live;
        particles.drain(..excess);
    }
}
