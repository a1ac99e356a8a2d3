//! Smoothed follow camera with screen shake.

use rand::Rng;

use crate::config::CameraConfig;

/// What the camera tracks.  A handle, not a reference: the camera never
/// keeps the followed entity alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraTarget {
    Player,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub target: Option<CameraTarget>,
    pub shake: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            target: None,
            shake: 0.0,
        }
    }

    /// Start (or restart) a shake of the given magnitude.
    pub fn add_shake(&mut self, magnitude: f32) {
        self.shake = self.shake.max(magnitude);
    }

    /// One tick.  `focus` is the followed entity's top-left corner, or
    /// `None` while it is dead or absent.
    pub fn update(&mut self, focus: Option<(f32, f32)>, cfg: &CameraConfig, rng: &mut impl Rng) {
        if let (Some(_), Some((fx, fy))) = (self.target, focus) {
            let target_x = fx - self.width / 2.0;
            let target_y = fy - self.height / 2.0;
            self.x += (target_x - self.x) * cfg.follow_lerp;
            self.y += (target_y - self.y) * cfg.follow_lerp;
        }

        if self.shake > 0.0 {
            self.x += (rng.gen::<f32>() - 0.5) * self.shake;
            self.y += (rng.gen::<f32>() - 0.5) * self.shake;
            self.shake *= cfg.shake_decay;
            if self.shake < cfg.shake_epsilon {
                self.shake = 0.0;
            }
        }

        self.x = self.x.max(0.0);
        self.y = self.y.clamp(cfg.min_y, cfg.max_y);
    }
}
