//! The numbers shown around the play field, pushed to the host once per
//! tick.

use std::cell::RefCell;
use std::rc::Rc;

use crate::entities::GameState;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
}

fn ratio(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        0.0
    } else {
        (value / max).clamp(0.0, 1.0)
    }
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let player = &state.player;
        Self {
            health: player.health,
            max_health: player.max_health,
            energy: player.energy,
            max_energy: player.max_energy,
            score: state.score,
            lives: state.lives,
            level: state.level,
        }
    }

    pub fn health_ratio(&self) -> f32 {
        ratio(self.health, self.max_health)
    }

    pub fn energy_ratio(&self) -> f32 {
        ratio(self.energy, self.max_energy)
    }

    /// `"80/100"`, rounded down.
    pub fn health_text(&self) -> String {
        format!("{}/{}", self.health.floor() as i32, self.max_health.floor() as i32)
    }

    pub fn energy_text(&self) -> String {
        format!("{}/{}", self.energy.floor() as i32, self.max_energy.floor() as i32)
    }
}

/// Receives a fresh snapshot at the end of every tick.
pub trait HudSink {
    fn sync(&mut self, hud: &HudSnapshot);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHud;

impl HudSink for NullHud {
    fn sync(&mut self, _hud: &HudSnapshot) {}
}

/// Keeps the latest snapshot behind a shared handle so the host can read
/// it after handing a clone to the session.
#[derive(Clone, Debug, Default)]
pub struct SharedHud(Rc<RefCell<Option<HudSnapshot>>>);

impl SharedHud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<HudSnapshot> {
        self.0.borrow().clone()
    }
}

impl HudSink for SharedHud {
    fn sync(&mut self, hud: &HudSnapshot) {
        *self.0.borrow_mut() = Some(hud.clone());
    }
}
