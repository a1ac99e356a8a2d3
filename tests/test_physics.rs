use knight::config::PhysicsConfig;
use knight::entities::{Body, Platform, PlatformKind};
use knight::geometry::{intersects, resolve, Contact, Rect};
use knight::physics::{collide_platforms, integrate, step, Fate};

fn ledge(x: f32, y: f32, w: f32, h: f32) -> Platform {
    Platform {
        rect: Rect::new(x, y, w, h),
        kind: PlatformKind::Ledge,
    }
}

// ── intersects ────────────────────────────────────────────────────────────────

#[test]
fn overlapping_rects_intersect() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(intersects(&a, &b));
    assert!(intersects(&b, &a));
}

#[test]
fn touching_edges_do_not_intersect() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!intersects(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
    assert!(!intersects(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
}

// ── resolve ───────────────────────────────────────────────────────────────────

#[test]
fn resolve_pushes_out_sideways_when_horizontal_overlap_is_smaller() {
    let wall = Rect::new(100.0, 0.0, 20.0, 200.0);
    let mut body = Body::new(75.0, 50.0, 32.0, 48.0);
    body.vx = 4.0;
    let contact = resolve(&mut body, &wall);
    assert_eq!(contact, Contact::Left);
    assert_eq!(body.x, 68.0);
    assert_eq!(body.vx, 0.0);
    assert!(!body.is_grounded);
}

#[test]
fn resolve_bumps_head_on_underside() {
    let ceiling = Rect::new(0.0, 0.0, 200.0, 20.0);
    let mut body = Body::new(50.0, 15.0, 32.0, 48.0);
    body.vy = -6.0;
    let contact = resolve(&mut body, &ceiling);
    assert_eq!(contact, Contact::Bottom);
    assert_eq!(body.y, 20.0);
    assert_eq!(body.vy, 0.0);
}

// ── step ──────────────────────────────────────────────────────────────────────

#[test]
fn falling_body_lands_on_platform() {
    let platforms = vec![ledge(0.0, 100.0, 200.0, 20.0)];
    let mut body = Body::new(10.0, 51.0, 32.0, 48.0); // bottom 1 unit above the top
    body.vy = 5.0;

    let fate = step(&mut body, &platforms, &PhysicsConfig::default());

    assert_eq!(fate, Fate::InWorld);
    assert_eq!(body.y, 52.0);
    assert_eq!(body.vy, 0.0);
    assert!(body.is_grounded);
}

#[test]
fn vertical_speed_never_exceeds_terminal_velocity() {
    let cfg = PhysicsConfig::default();
    let mut body = Body::new(0.0, -2000.0, 10.0, 10.0);
    body.vy = 19.5;
    for _ in 0..50 {
        integrate(&mut body, &cfg);
        assert!(body.vy.abs() <= cfg.terminal_velocity);
    }
    assert_eq!(body.vy, cfg.terminal_velocity);
}

#[test]
fn dropping_below_world_bottom_reports_fell_out() {
    let mut body = Body::new(0.0, 590.0, 10.0, 10.0);
    body.vy = 20.0;
    assert_eq!(integrate(&mut body, &PhysicsConfig::default()), Fate::FellOut);
}

#[test]
fn horizontal_position_is_clamped_at_zero() {
    let mut body = Body::new(2.0, 0.0, 10.0, 10.0);
    body.vx = -5.0;
    integrate(&mut body, &PhysicsConfig::default());
    assert_eq!(body.x, 0.0);
}

#[test]
fn friction_damps_horizontal_speed() {
    let mut body = Body::new(100.0, 0.0, 10.0, 10.0);
    body.vx = 10.0;
    integrate(&mut body, &PhysicsConfig::default());
    assert!((body.vx - 8.5).abs() < 1e-4);
}

#[test]
fn grounded_flag_is_recomputed_each_pass() {
    let mut body = Body::new(0.0, 0.0, 10.0, 10.0);
    body.is_grounded = true;
    collide_platforms(&mut body, &[ledge(500.0, 500.0, 10.0, 10.0)]);
    assert!(!body.is_grounded);
}
