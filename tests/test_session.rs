use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use knight::config::Tuning;
use knight::display::TerminalSurface;
use knight::entities::GameStatus;
use knight::error::KnightError;
use knight::hud::{NullHud, SharedHud};
use knight::input::{Controls, Key};
use knight::session::{FramePacer, Session};
use knight::store::{KeyValueStore, HIGH_SCORE_KEY};

/// Store whose contents stay visible after the session takes ownership.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<BTreeMap<String, String>>>);

impl SharedStore {
    fn value(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.value(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), KnightError> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn surface() -> TerminalSurface {
    TerminalSurface::new(100, 30, 1000.0, 600.0)
}

fn session_with(store: SharedStore) -> Session {
    Session::create(Tuning::default(), 1, &surface(), Box::new(store), Box::new(NullHud), 42)
        .unwrap()
}

// ── FramePacer ────────────────────────────────────────────────────────────────

#[test]
fn pacer_skips_early_calls_without_accumulating() {
    let mut pacer = FramePacer::new(1000.0 / 60.0);
    assert_eq!(pacer.poll(10.0), None);
    assert_eq!(pacer.poll(20.0), Some(20.0));
    assert_eq!(pacer.poll(30.0), None);
    assert_eq!(pacer.poll(40.0), Some(20.0));
    assert!((pacer.next_due() - (40.0 + 1000.0 / 60.0)).abs() < 1e-9);
}

#[test]
fn waking_at_each_deadline_keeps_sixty_ticks_a_second() {
    let mut session = session_with(SharedStore::default());
    session.start();
    let idle = Controls::default();
    let mut now = 0.0;
    let mut ticks = 0;
    while now < 1000.0 {
        if session.frame(now, &idle) {
            ticks += 1;
        }
        // wake slightly late, as a sleeping host does
        now += session.time_to_next_frame(now).min(4.0) + 0.05;
    }
    assert!(ticks >= 59, "only {ticks} ticks in one second");
}

// ── create ────────────────────────────────────────────────────────────────────

#[test]
fn create_fails_without_a_usable_surface() {
    let empty = TerminalSurface::new(0, 0, 1000.0, 600.0);
    let result = Session::create(
        Tuning::default(),
        1,
        &empty,
        Box::new(SharedStore::default()),
        Box::new(NullHud),
        1,
    );
    assert!(matches!(result, Err(KnightError::SurfaceUnavailable(_))));
}

#[test]
fn create_fails_on_invalid_level() {
    let mut tuning = Tuning::default();
    tuning.level.platforms.clear();
    let result = Session::create(tuning, 1, &surface(), Box::new(SharedStore::default()), Box::new(NullHud), 1);
    assert!(matches!(result, Err(KnightError::InvalidLevel(_))));
}

#[test]
fn create_reads_the_stored_high_score() {
    let store = SharedStore::default();
    store.0.borrow_mut().insert(HIGH_SCORE_KEY.to_string(), "1234".to_string());
    let session = session_with(store);
    assert_eq!(session.high_score(), 1234);
    assert_eq!(session.status(), GameStatus::Menu);
}

#[test]
fn create_pushes_an_initial_hud_snapshot() {
    let hud = SharedHud::new();
    let _session = Session::create(
        Tuning::default(),
        2,
        &surface(),
        Box::new(SharedStore::default()),
        Box::new(hud.clone()),
        1,
    )
    .unwrap();
    assert_eq!(hud.latest().map(|h| h.level), Some(2));
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn status_transitions() {
    let mut session = session_with(SharedStore::default());
    assert!(!session.pause());
    assert!(session.start());
    assert_eq!(session.status(), GameStatus::Playing);
    assert!(!session.start());

    assert!(session.pause());
    assert!(!session.pause());
    assert_eq!(session.status(), GameStatus::Paused);
    assert!(session.resume());
    assert!(!session.resume());

    assert!(session.toggle_pause());
    assert_eq!(session.status(), GameStatus::Paused);
    assert!(session.toggle_pause());
    assert_eq!(session.status(), GameStatus::Playing);
}

#[test]
fn one_shot_keys_drive_the_session() {
    let mut session = session_with(SharedStore::default());
    assert!(session.on_key_down(Key::Start));
    assert!(session.on_key_down(Key::Pause));
    assert_eq!(session.status(), GameStatus::Paused);

    assert!(!session.debug());
    assert!(session.on_key_down(Key::Debug));
    assert!(session.debug());

    assert!(!session.on_key_down(Key::Left));
}

#[test]
fn frame_respects_the_pacer() {
    let mut session = session_with(SharedStore::default());
    session.start();
    let idle = Controls::default();
    assert!(!session.frame(5.0, &idle));
    assert!(session.frame(20.0, &idle));
    assert!(!session.frame(25.0, &idle));
    assert_eq!(session.state().map(|s| s.frame), Some(1));
}

#[test]
fn paused_frames_do_not_advance_the_simulation() {
    let mut session = session_with(SharedStore::default());
    session.start();
    session.pause();
    session.frame(20.0, &Controls::default());
    assert_eq!(session.state().map(|s| s.frame), Some(0));
}

#[test]
fn cleanup_is_idempotent_and_saves_the_score() {
    let store = SharedStore::default();
    let mut session = session_with(store.clone());
    session.start();
    if let Some(state) = session.state_mut() {
        state.score = 500;
    }

    session.cleanup();
    assert_eq!(session.status(), GameStatus::Stopped);
    assert_eq!(store.value(HIGH_SCORE_KEY).as_deref(), Some("500"));

    session.cleanup();
    assert_eq!(session.status(), GameStatus::Stopped);
    assert!(!session.frame(1000.0, &Controls::default()));
    assert!(!session.start());
}

#[test]
fn winning_persists_the_high_score() {
    let store = SharedStore::default();
    let mut session = session_with(store.clone());
    session.start();
    if let Some(state) = session.state_mut() {
        state.enemies.clear();
        state.score = 300;
    }

    session.frame(20.0, &Controls::default());
    assert_eq!(session.status(), GameStatus::Victory);
    assert_eq!(store.value(HIGH_SCORE_KEY).as_deref(), Some("300"));
    assert_eq!(session.high_score(), 300);
}

#[test]
fn lower_scores_do_not_overwrite_the_record() {
    let store = SharedStore::default();
    store.0.borrow_mut().insert(HIGH_SCORE_KEY.to_string(), "900".to_string());
    let mut session = session_with(store.clone());
    session.start();
    if let Some(state) = session.state_mut() {
        state.score = 100;
    }
    session.cleanup();
    assert_eq!(store.value(HIGH_SCORE_KEY).as_deref(), Some("900"));
}

#[test]
fn restart_rebuilds_the_level() {
    let mut session = session_with(SharedStore::default());
    session.start();
    if let Some(state) = session.state_mut() {
        state.enemies.clear();
        state.score = 70;
    }
    session.frame(20.0, &Controls::default());
    assert_eq!(session.status(), GameStatus::Victory);

    assert!(session.restart().unwrap());
    let state = session.state().unwrap();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.enemies.len(), 5);
    assert_eq!(state.score, 0);
    assert_eq!(state.high_score, 70);
}

#[test]
fn restart_needs_a_finished_or_paused_game() {
    let mut session = session_with(SharedStore::default());
    assert!(!session.restart().unwrap());
    assert_eq!(session.status(), GameStatus::Menu);

    session.start();
    assert!(!session.restart().unwrap());
    session.pause();
    assert!(session.restart().unwrap());
    assert_eq!(session.status(), GameStatus::Playing);
}

#[test]
fn restart_after_cleanup_stays_stopped() {
    let mut session = session_with(SharedStore::default());
    session.start();
    session.cleanup();
    assert!(!session.restart().unwrap());
    assert_eq!(session.status(), GameStatus::Stopped);
    assert!(session.state().is_none());
}

#[test]
fn render_after_cleanup_draws_nothing() {
    let mut session = session_with(SharedStore::default());
    let mut target = surface();
    session.cleanup();
    session.render(&mut target);
    assert_eq!(target.cell(0, 0).map(|c| c.glyph), Some(' '));
}
