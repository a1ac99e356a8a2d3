//! Arcade physics: gravity, damping, terminal velocity, platforms.
//!
//! Constants are per tick, not per second; the loop caps the tick rate
//! and the numbers were tuned against that.

use crate::config::PhysicsConfig;
use crate::entities::{Body, Platform};
use crate::geometry::{intersects, resolve};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    InWorld,
    /// Dropped below the world floor; the caller decides what dying means.
    FellOut,
}

/// Gravity, position, friction and velocity clamp for one tick.
pub fn integrate(body: &mut Body, cfg: &PhysicsConfig) -> Fate {
    if !body.is_grounded {
        body.vy += cfg.gravity;
    }

    body.x += body.vx;
    body.y += body.vy;

    body.vx *= cfg.friction;
    body.vy = body.vy.clamp(-cfg.terminal_velocity, cfg.terminal_velocity);

    if body.x < 0.0 {
        body.x = 0.0;
    }

    if body.y > cfg.world_bottom {
        Fate::FellOut
    } else {
        Fate::InWorld
    }
}

/// Recompute `is_grounded` and push the body out of every platform it
/// overlaps.
pub fn collide_platforms(body: &mut Body, platforms: &[Platform]) {
    body.is_grounded = false;
    for platform in platforms {
        if intersects(&body.rect(), &platform.rect) {
            resolve(body, &platform.rect);
        }
    }
}

/// `integrate` followed by the platform pass.
pub fn step(body: &mut Body, platforms: &[Platform], cfg: &PhysicsConfig) -> Fate {
    let fate = integrate(body, cfg);
    collide_platforms(body, platforms);
    fate
}
