use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use knight::config::Tuning;
use knight::display::TerminalSurface;
use knight::entities::GameStatus;
use knight::hud::{HudSnapshot, SharedHud};
use knight::input::{Key, KeyState};
use knight::session::Session;
use knight::store::{self, FileStore};

/// Longest the loop sleeps before draining input again.
const MAX_IDLE: Duration = Duration::from_millis(4);

/// Rows reserved outside the play field: HUD on top, hint at the bottom.
const CHROME_ROWS: u16 = 2;

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to `$HOME/.knight.log`; stdout belongs to the game.  Filter with
/// `KNIGHT_LOG` (default `knight=info`).
fn init_logging() {
    let path = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".knight.log");
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_env("KNIGHT_LOG").unwrap_or_else(|_| EnvFilter::new("knight=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(u32),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚔  KNIGHT  ⚔";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(6),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(4)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select level:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Level 1", Color::Green, "Clear the field"),
        ("2", "Level 2", Color::Yellow, "Clear the field again"),
        ("3", "Level 3", Color::Red, "The dark lord waits"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(2) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {}", desc)))?;
    }

    let legend: &[(&str, Color, &str)] = &[
        ("■", Color::Red, " Health   +25 HP"),
        ("■", Color::Cyan, " Energy   +30 energy"),
        ("■", Color::Yellow, " Coin     +100 score"),
        ("■", Color::Magenta, " Power-up +5 attack"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        let row = cy + 2 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(14), cy + 7))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("A D : Move  W : Jump  J : Attack  K : Blast  L : Shield  Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind == KeyEventKind::Release {
                continue;
            }
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(1)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(2)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(3)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

/// Full-screen message; waits for any key.
fn show_notice<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    message: &str,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    out.queue(cursor::MoveTo(
        (width / 2).saturating_sub(message.chars().count() as u16 / 2),
        height / 2,
    ))?;
    out.queue(style::SetForegroundColor(Color::Red))?;
    out.queue(Print(message))?;
    out.queue(style::ResetColor)?;
    out.flush()?;
    while let Ok(ev) = rx.recv() {
        if matches!(ev, Event::Key(KeyEvent { kind: KeyEventKind::Press, .. })) {
            break;
        }
    }
    Ok(())
}

// ── HUD & hint rows ───────────────────────────────────────────────────────────

/// Ten-cell text bar, e.g. `[######    ]`.
fn gauge(ratio: f32) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(10 - filled))
}

fn draw_hud<W: Write>(out: &mut W, hud: Option<HudSnapshot>, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
    let Some(hud) = hud else {
        return Ok(());
    };

    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print(format!(" HP {} {:>7}", gauge(hud.health_ratio()), hud.health_text())))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(format!("   EN {} {:>7}", gauge(hud.energy_ratio()), hud.energy_text())))?;

    let right = format!("Score: {:>7}   Lives: {}   Level: {} ", hud.score, hud.lives, hud.level);
    out.queue(cursor::MoveTo(width.saturating_sub(right.chars().count() as u16), 0))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(right))?;
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, row: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(
        "A D : Move  W : Jump  J : Attack  K : Blast  L : Shield  P : Pause  R : Restart  M : Menu  Q : Quit",
    ))?;
    out.queue(style::ResetColor)?;
    Ok(())
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Menu,
    Quit,
}

/// Runs one session until the player quits or goes back to the menu.
///
/// Held keys are tracked in a `KeyState` and turned into `Controls` each
/// poll; one-shot keys (pause, debug, restart) go straight to the session.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    tuning: &Tuning,
    level: u32,
) -> std::io::Result<LoopExit> {
    let (cols, rows) = terminal::size()?;
    let mut surface = TerminalSurface::new(
        cols,
        rows.saturating_sub(CHROME_ROWS),
        tuning.canvas.width,
        tuning.canvas.height,
    );
    let hud = SharedHud::new();
    let store = FileStore::open(FileStore::default_path());
    info!(path = %store.path().display(), "High score store opened");

    let mut session = match Session::create(
        tuning.clone(),
        level,
        &surface,
        Box::new(store),
        Box::new(hud.clone()),
        rand::random(),
    ) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Failed to start session");
            show_notice(out, rx, "Failed to start, please retry")?;
            return Ok(LoopExit::Menu);
        }
    };
    session.start();
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let clock = Instant::now();
    let mut keys = KeyState::new();
    let mut height = rows;

    loop {
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        let stamp = now_ms as u64;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        session.cleanup();
                        return Ok(LoopExit::Quit);
                    }
                    let Some(key) = Key::from_code(code) else {
                        continue;
                    };
                    match kind {
                        KeyEventKind::Press => {
                            keys.press(key, stamp);
                            match key {
                                Key::Quit => {
                                    session.cleanup();
                                    return Ok(LoopExit::Quit);
                                }
                                Key::Menu => {
                                    session.cleanup();
                                    return Ok(LoopExit::Menu);
                                }
                                Key::Restart
                                    if matches!(
                                        session.status(),
                                        GameStatus::GameOver | GameStatus::Victory
                                    ) =>
                                {
                                    if let Err(e) = session.restart() {
                                        error!(error = %e, "Restart failed");
                                        show_notice(out, rx, "Failed to restart, please retry")?;
                                        return Ok(LoopExit::Menu);
                                    }
                                    keys.clear();
                                }
                                _ => {
                                    session.on_key_down(key);
                                }
                            }
                        }
                        KeyEventKind::Repeat => keys.press(key, stamp),
                        KeyEventKind::Release => keys.release(key),
                    }
                }
                Event::Resize(c, r) => {
                    surface.resize(c, r.saturating_sub(CHROME_ROWS));
                    height = r;
                    out.queue(terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }

        if session.frame(now_ms, &keys.controls(stamp)) {
            session.render(&mut surface);
            draw_hud(out, hud.latest(), surface.cols() as u16)?;
            draw_controls_hint(out, height.saturating_sub(1))?;
            surface.flush_to(out, 1)?;
        }

        // Wake at the pacer's deadline, or sooner to keep input responsive.
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        let wait = Duration::from_secs_f64(session.time_to_next_frame(now_ms) / 1000.0);
        std::thread::sleep(wait.min(MAX_IDLE));
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_logging();

    let tuning = match Tuning::discover() {
        Ok(tuning) => tuning,
        Err(e) => {
            error!(error = %e, "Could not load tuning");
            eprintln!("knight: {e}");
            std::process::exit(1);
        }
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Key-release events where the terminal supports them.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    info!("Knight started");
    let result = run(&mut out, &rx, &tuning);

    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, tuning: &Tuning) -> std::io::Result<()> {
    loop {
        let high_score = store::load_high_score(&FileStore::open(FileStore::default_path()));
        match show_menu(out, rx, high_score)? {
            MenuResult::Quit => break,
            MenuResult::Start(level) => {
                if let LoopExit::Quit = game_loop(out, rx, tuning, level)? {
                    break;
                }
            }
        }
    }
    info!("Knight exited");
    Ok(())
}
