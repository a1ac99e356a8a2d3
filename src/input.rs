//! Keyboard mapping and held-key tracking.
//!
//! Terminals report presses (and auto-repeat) but usually not releases,
//! so a key counts as held while its last press or repeat is recent.

use std::collections::HashMap;

use crossterm::event::KeyCode;

/// How long a key stays "held" after its last press/repeat event.  OS
/// key repeat runs at 15 Hz or faster (at most ~67 ms apart), so a held
/// key keeps refreshing inside this window.  It does not bridge the
/// initial repeat delay (~250-500 ms); terminals that report releases
/// keep the key until the release arrives.
pub const HOLD_WINDOW_MS: u64 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Jump,
    Attack,
    EnergyBlast,
    Shield,
    Pause,
    Debug,
    Start,
    Restart,
    Menu,
    Quit,
}

impl Key {
    pub fn from_code(code: KeyCode) -> Option<Key> {
        let key = match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char(' ') => {
                Key::Jump
            }
            KeyCode::Char('j') | KeyCode::Char('J') => Key::Attack,
            KeyCode::Char('k') | KeyCode::Char('K') => Key::EnergyBlast,
            KeyCode::Char('l') | KeyCode::Char('L') => Key::Shield,
            KeyCode::Char('p') | KeyCode::Char('P') => Key::Pause,
            KeyCode::F(1) => Key::Debug,
            KeyCode::Enter => Key::Start,
            KeyCode::Char('r') | KeyCode::Char('R') => Key::Restart,
            KeyCode::Char('m') | KeyCode::Char('M') => Key::Menu,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Key::Quit,
            _ => return None,
        };
        Some(key)
    }
}

/// Action flags read by one simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub energy_blast: bool,
    pub shield: bool,
}

/// When each key was last seen, in host milliseconds.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    last_seen: HashMap<Key, u64>,
    /// Set once the terminal has sent a real release.
    reports_releases: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key, now_ms: u64) {
        self.last_seen.insert(key, now_ms);
    }

    /// Terminals with enhanced reporting send real releases.  From then on
    /// keys stay held until released instead of timing out.
    pub fn release(&mut self, key: Key) {
        self.reports_releases = true;
        self.last_seen.remove(&key);
    }

    pub fn is_held(&self, key: Key, now_ms: u64) -> bool {
        self.last_seen.get(&key).is_some_and(|&seen| {
            self.reports_releases || now_ms.saturating_sub(seen) <= HOLD_WINDOW_MS
        })
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }

    pub fn controls(&self, now_ms: u64) -> Controls {
        Controls {
            left: self.is_held(Key::Left, now_ms),
            right: self.is_held(Key::Right, now_ms),
            jump: self.is_held(Key::Jump, now_ms),
            attack: self.is_held(Key::Attack, now_ms),
            energy_blast: self.is_held(Key::EnergyBlast, now_ms),
            shield: self.is_held(Key::Shield, now_ms),
        }
    }
}
