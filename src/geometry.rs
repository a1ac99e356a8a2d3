//! Axis-aligned rectangles and the platform collision kernel.
//!
//! Every collidable thing in the game is an AABB whose `(x, y)` is the
//! top-left corner.  Touching edges never count as overlap.

use serde::{Deserialize, Serialize};

use crate::entities::Body;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Finite coordinates and a strictly positive size.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// True iff the rectangles overlap on both axes.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Side of the platform the body ended up on after `resolve`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Landed on top; the body is now grounded.
    Top,
    /// Bumped the underside.
    Bottom,
    Left,
    Right,
}

/// Push `body` out of `platform` along the axis of smaller overlap.
///
/// Exact diagonal contacts can pick either axis depending on which depth
/// is a hair smaller; ties go vertical.  Gameplay was tuned around this,
/// so it is kept as is.
pub fn resolve(body: &mut Body, platform: &Rect) -> Contact {
    let overlap_x = (body.x + body.width - platform.x).min(platform.right() - body.x);
    let overlap_y = (body.y + body.height - platform.y).min(platform.bottom() - body.y);

    if overlap_x < overlap_y {
        body.vx = 0.0;
        if body.x < platform.x {
            body.x = platform.x - body.width;
            Contact::Left
        } else {
            body.x = platform.right();
            Contact::Right
        }
    } else if body.y < platform.y {
        body.y = platform.y - body.height;
        body.vy = 0.0;
        body.is_grounded = true;
        Contact::Top
    } else {
        body.y = platform.bottom();
        body.vy = 0.0;
        Contact::Bottom
    }
}
