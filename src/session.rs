//! One game session: owns the state, paces frames and handles lifecycle.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::compute::{self, Clock};
use crate::config::Tuning;
use crate::display::{self, Surface};
use crate::entities::{GameState, GameStatus};
use crate::error::KnightError;
use crate::hud::{HudSink, HudSnapshot};
use crate::input::{Controls, Key};
use crate::store::{self, KeyValueStore};

/// Accepts at most one frame per interval.  Calls that come too early are
/// skipped, not queued.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePacer {
    interval_ms: f64,
    last_ms: f64,
}

impl FramePacer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: 0.0,
        }
    }

    /// Milliseconds since the last accepted frame, or `None` if it is too
    /// soon.
    pub fn poll(&mut self, now_ms: f64) -> Option<f32> {
        let elapsed = now_ms - self.last_ms;
        if elapsed < self.interval_ms {
            return None;
        }
        self.last_ms = now_ms;
        Some(elapsed as f32)
    }

    /// Earliest time the next `poll` can succeed.
    pub fn next_due(&self) -> f64 {
        self.last_ms + self.interval_ms
    }
}

pub struct Session {
    state: Option<GameState>,
    tuning: Tuning,
    level: u32,
    pacer: FramePacer,
    rng: StdRng,
    store: Box<dyn KeyValueStore>,
    hud: Box<dyn HudSink>,
    debug: bool,
}

impl Session {
    /// Build a session for `level`, drawing on `surface`.  Fails if the
    /// surface has no usable area or the level data is invalid.
    pub fn create(
        tuning: Tuning,
        level: u32,
        surface: &dyn Surface,
        store: Box<dyn KeyValueStore>,
        mut hud: Box<dyn HudSink>,
        seed: u64,
    ) -> Result<Self, KnightError> {
        let (width, height) = surface.size();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(KnightError::SurfaceUnavailable(format!(
                "surface reports {width}x{height}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let high_score = store::load_high_score(store.as_ref());
        let state = compute::init_state(level, &tuning, high_score, &mut rng)?;
        hud.sync(&HudSnapshot::from_state(&state));

        info!(level, high_score, "Session created");
        Ok(Self {
            pacer: FramePacer::new(tuning.canvas.frame_interval_ms()),
            state: Some(state),
            tuning,
            level,
            rng,
            store,
            hud,
            debug: false,
        })
    }

    pub fn status(&self) -> GameStatus {
        self.state.as_ref().map_or(GameStatus::Stopped, |s| s.status)
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn high_score(&self) -> u32 {
        self.state
            .as_ref()
            .map_or_else(|| store::load_high_score(self.store.as_ref()), |s| s.high_score)
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn toggle_debug(&mut self) {
        self.debug = !self.debug;
    }

    fn transition(&mut self, from: GameStatus, to: GameStatus) -> bool {
        match self.state.as_mut() {
            Some(state) if state.status == from => {
                state.status = to;
                debug!(?from, ?to, "Status changed");
                true
            }
            _ => false,
        }
    }

    /// Menu → Playing.
    pub fn start(&mut self) -> bool {
        self.transition(GameStatus::Menu, GameStatus::Playing)
    }

    pub fn pause(&mut self) -> bool {
        self.transition(GameStatus::Playing, GameStatus::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(GameStatus::Paused, GameStatus::Playing)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// One-shot keys that act on the session itself.  Returns whether the
    /// key was consumed.
    pub fn on_key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Pause => self.toggle_pause(),
            Key::Debug => {
                self.toggle_debug();
                true
            }
            Key::Start => self.start(),
            _ => false,
        }
    }

    /// Rebuild the level from scratch and start playing it.  Only allowed
    /// from game over, victory or pause; returns `Ok(false)` otherwise,
    /// including after `cleanup`.
    pub fn restart(&mut self) -> Result<bool, KnightError> {
        if !matches!(
            self.status(),
            GameStatus::GameOver | GameStatus::Victory | GameStatus::Paused
        ) {
            return Ok(false);
        }
        self.persist_high_score();
        let high_score = self.high_score();
        let mut state = compute::init_state(self.level, &self.tuning, high_score, &mut self.rng)?;
        state.status = GameStatus::Playing;
        self.hud.sync(&HudSnapshot::from_state(&state));
        self.state = Some(state);
        info!(level = self.level, "Session restarted");
        Ok(true)
    }

    /// Host callback.  Runs one tick if the pacer accepts `now_ms`;
    /// returns whether it did.
    pub fn frame(&mut self, now_ms: f64, controls: &Controls) -> bool {
        if self.state.is_none() {
            return false;
        }
        let Some(dt) = self.pacer.poll(now_ms) else {
            return false;
        };
        self.update(controls, Clock::new(now_ms.max(0.0) as u64, dt));
        true
    }

    /// Milliseconds from `now_ms` until the pacer will accept a frame.
    pub fn time_to_next_frame(&self, now_ms: f64) -> f64 {
        (self.pacer.next_due() - now_ms).max(0.0)
    }

    /// Unpaced tick, for hosts and tests that drive the clock themselves.
    pub fn update(&mut self, controls: &Controls, clock: Clock) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let before = state.status;
        compute::tick(state, controls, clock, self.hud.as_mut(), &mut self.rng);
        let after = state.status;
        if before != after && matches!(after, GameStatus::GameOver | GameStatus::Victory) {
            info!(status = ?after, score = state.score, "Game finished");
            self.persist_high_score();
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if let Some(state) = &self.state {
            display::render(surface, state, self.debug);
        }
    }

    /// Save the high score and drop the state.  Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        if self.state.is_none() {
            return;
        }
        self.persist_high_score();
        self.state = None;
        info!("Session stopped");
    }

    fn persist_high_score(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.score > state.high_score {
            state.high_score = state.score;
        }
        match store::save_high_score(self.store.as_mut(), state.high_score) {
            Ok(true) => info!(high_score = state.high_score, "New high score saved"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Could not save high score"),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}
