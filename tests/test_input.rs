use crossterm::event::KeyCode;

use knight::input::*;

#[test]
fn key_codes_map_to_actions() {
    assert_eq!(Key::from_code(KeyCode::Left), Some(Key::Left));
    assert_eq!(Key::from_code(KeyCode::Char('d')), Some(Key::Right));
    assert_eq!(Key::from_code(KeyCode::Char(' ')), Some(Key::Jump));
    assert_eq!(Key::from_code(KeyCode::Up), Some(Key::Jump));
    assert_eq!(Key::from_code(KeyCode::Char('J')), Some(Key::Attack));
    assert_eq!(Key::from_code(KeyCode::Char('k')), Some(Key::EnergyBlast));
    assert_eq!(Key::from_code(KeyCode::Char('l')), Some(Key::Shield));
    assert_eq!(Key::from_code(KeyCode::F(1)), Some(Key::Debug));
    assert_eq!(Key::from_code(KeyCode::Enter), Some(Key::Start));
    assert_eq!(Key::from_code(KeyCode::Esc), Some(Key::Quit));
    assert_eq!(Key::from_code(KeyCode::Char('z')), None);
}

#[test]
fn key_stays_held_for_the_hold_window() {
    let mut keys = KeyState::new();
    keys.press(Key::Right, 1000);
    assert!(keys.is_held(Key::Right, 1000));
    assert!(keys.is_held(Key::Right, 1000 + HOLD_WINDOW_MS));
    assert!(!keys.is_held(Key::Right, 1001 + HOLD_WINDOW_MS));
    assert!(!keys.is_held(Key::Left, 1000));
}

#[test]
fn os_repeats_keep_a_key_held() {
    let mut keys = KeyState::new();
    // 15 Hz repeat, polled every 4 ms
    let mut next_repeat = 0;
    for now in (0..1000).step_by(4) {
        if now >= next_repeat {
            keys.press(Key::Attack, now);
            next_repeat += 67;
        }
        assert!(keys.is_held(Key::Attack, now), "dropped at {now} ms");
    }
}

#[test]
fn release_and_clear_drop_keys() {
    let mut keys = KeyState::new();
    keys.press(Key::Left, 1);
    keys.press(Key::Jump, 1);
    keys.release(Key::Left);
    assert!(!keys.is_held(Key::Left, 1));
    assert!(keys.is_held(Key::Jump, 1));
    keys.clear();
    assert!(!keys.is_held(Key::Jump, 1));
}

#[test]
fn reported_releases_hold_keys_until_released() {
    let mut keys = KeyState::new();
    keys.press(Key::Right, 0);
    keys.release(Key::Right);

    keys.press(Key::Right, 100);
    assert!(keys.is_held(Key::Right, 100 + 10 * HOLD_WINDOW_MS));
    keys.release(Key::Right);
    assert!(!keys.is_held(Key::Right, 100 + 10 * HOLD_WINDOW_MS));
}

#[test]
fn controls_reflect_held_keys() {
    let mut keys = KeyState::new();
    keys.press(Key::Right, 5);
    keys.press(Key::Shield, 5);
    keys.press(Key::Pause, 5);
    let controls = keys.controls(6);
    assert_eq!(
        controls,
        Controls {
            right: true,
            shield: true,
            ..Controls::default()
        }
    );
}
