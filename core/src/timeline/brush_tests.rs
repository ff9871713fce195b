//! Tests for the brush state machine and timeline rendering

use std::time::{Duration, Instant};

use proptest::prelude::*;
use ymdash_types::{TimeRange, TimelineConfig};

use super::*;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 117.0;
/// 1 px == 1000 s with the fixture series below.
const SECS_PER_PX: i64 = 1000;

/// 101 points, 10 000 s apart, spanning 0..=1 000 000 s.
fn series() -> Vec<TimelinePoint> {
    (0..=100)
        .map(|i| TimelinePoint {
            at: i * 10_000,
            value: (i % 7) as f64,
        })
        .collect()
}

fn controller() -> BrushController {
    let mut brush = BrushController::new(TimelineConfig::default());
    brush.set_series(series());
    assert!(brush.resize(WIDTH, HEIGHT));
    brush
}

fn assert_px(range: TimeRange, left: f64, right: f64) {
    let l = (left as i64) * SECS_PER_PX;
    let r = (right as i64) * SECS_PER_PX;
    assert!(
        (range.start - l).abs() <= 1 && (range.end - r).abs() <= 1,
        "expected ~[{l}, {r}], got {range:?}"
    );
}

fn click(brush: &mut BrushController, surface: &mut RecordingSurface, x: f64) -> Option<TimeRange> {
    brush.pointer_down(x, surface);
    brush.pointer_up(x, surface)
}

fn selected_width_px(brush: &BrushController) -> f64 {
    let (l, r) = brush.interval_px().expect("span present");
    r - l
}

// ─────────────────────────────────────────────────────────────────────────────
// Pointer gestures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_click_creates_default_width_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    let range = click(&mut brush, &mut surface, 500.0).expect("click emits");
    assert_px(range, 475.0, 525.0);
    assert!(matches!(brush.state(), BrushState::Selected { drag: None, .. }));
    assert_eq!(surface.active_listeners(), 0);
}

#[test]
fn test_click_near_edge_is_shifted_inside() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    let range = click(&mut brush, &mut surface, 10.0).expect("click emits");
    assert_px(range, 0.0, 50.0);

    let mut brush = controller();
    let range = click(&mut brush, &mut surface, 995.0).expect("click emits");
    assert_px(range, 950.0, 1000.0);
}

#[test]
fn test_default_width_is_capped() {
    let mut brush = controller();
    brush.resize(4000.0, HEIGHT);
    let mut surface = RecordingSurface::new();

    click(&mut brush, &mut surface, 2000.0).expect("click emits");
    assert!((selected_width_px(&brush) - 100.0).abs() < 1e-6);
}

#[test]
fn test_drag_creates_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    brush.pointer_down(100.0, &mut surface);
    assert_eq!(surface.installs, 1);
    assert_eq!(brush.pointer_move(103.0), None, "below drag threshold");
    assert_eq!(brush.pointer_move(108.0), None, "dragging but narrower than min brush");

    let live = brush.pointer_move(300.0).expect("live update");
    assert_px(live, 100.0, 300.0);

    let committed = brush.pointer_up(300.0, &mut surface).expect("commit");
    assert_px(committed, 100.0, 300.0);
    assert_eq!(surface.active_listeners(), 0);
    assert_eq!(brush.interval(), Some(committed));
}

#[test]
fn test_reverse_drag_is_normalized() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    brush.pointer_down(600.0, &mut surface);
    brush.pointer_move(200.0);
    let range = brush.pointer_up(200.0, &mut surface).expect("commit");
    assert_px(range, 200.0, 600.0);
}

#[test]
fn test_drag_past_chart_is_clamped() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    brush.pointer_down(900.0, &mut surface);
    brush.pointer_move(1500.0);
    let range = brush.pointer_up(1500.0, &mut surface).expect("commit");
    assert_px(range, 900.0, 1000.0);
}

#[test]
fn test_short_drag_is_widened_to_min_brush() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    brush.pointer_down(400.0, &mut surface);
    brush.pointer_move(407.0);
    let range = brush.pointer_up(407.0, &mut surface).expect("commit");
    assert!((selected_width_px(&brush) - 10.0).abs() < 1e-6);
    assert!(range.start <= 400 * SECS_PER_PX && range.end >= 407 * SECS_PER_PX - 1);
}

#[test]
fn test_click_outside_span_clears_to_full_extent() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    click(&mut brush, &mut surface, 500.0);
    let range = click(&mut brush, &mut surface, 100.0).expect("clear emits");
    assert_eq!(range, TimeRange::new(0, 1_000_000));
    assert_eq!(*brush.state(), BrushState::Idle);
    assert_eq!(surface.active_listeners(), 0);
}

#[test]
fn test_drag_outside_span_replaces_it() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    click(&mut brush, &mut surface, 500.0);
    brush.pointer_down(100.0, &mut surface);
    brush.pointer_move(250.0);
    let range = brush.pointer_up(250.0, &mut surface).expect("commit");
    assert_px(range, 100.0, 250.0);
}

#[test]
fn test_move_span_body() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    click(&mut brush, &mut surface, 500.0);
    brush.pointer_down(500.0, &mut surface);
    assert!(matches!(
        brush.state(),
        BrushState::Selected {
            drag: Some(SpanDrag {
                handle: DragHandle::Move { .. },
                ..
            }),
            ..
        }
    ));

    let moved = brush.pointer_move(600.0).expect("move emits");
    assert_px(moved, 575.0, 625.0);
    brush.pointer_up(600.0, &mut surface);
    assert_eq!(surface.active_listeners(), 0);

    // Pushed against the right edge
    brush.pointer_down(600.0, &mut surface);
    let moved = brush.pointer_move(2000.0).expect("move emits");
    assert_px(moved, 950.0, 1000.0);
    brush.pointer_up(2000.0, &mut surface);
}

#[test]
fn test_resize_span_edges() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    click(&mut brush, &mut surface, 500.0);

    brush.pointer_down(526.0, &mut surface);
    let grown = brush.pointer_move(700.0).expect("resize emits");
    assert_px(grown, 475.0, 700.0);
    brush.pointer_up(700.0, &mut surface);

    brush.pointer_down(473.0, &mut surface);
    let grown = brush.pointer_move(300.0).expect("resize emits");
    assert_px(grown, 300.0, 700.0);

    // Start handle cannot cross the end
    let clamped = brush.pointer_move(900.0).expect("resize emits");
    assert_px(clamped, 690.0, 700.0);
    brush.pointer_up(900.0, &mut surface);
}

#[test]
fn test_click_inside_span_keeps_it() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    let first = click(&mut brush, &mut surface, 500.0);
    assert_eq!(click(&mut brush, &mut surface, 500.0), None);
    assert_eq!(brush.interval(), first);
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyboard
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_keys_ignored_without_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    assert_eq!(brush.key(BrushKey::Left, &mut surface), None);
    assert_eq!(brush.key(BrushKey::Grow, &mut surface), None);
}

#[test]
fn test_arrow_keys_translate() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    // Step is max(1% of 1000 px, one 10 px bucket)
    let right = brush.key(BrushKey::Right, &mut surface).expect("moves");
    assert_px(right, 485.0, 535.0);
    let left = brush.key(BrushKey::Left, &mut surface).expect("moves");
    assert_px(left, 475.0, 525.0);
}

#[test]
fn test_arrow_left_at_domain_start_is_noop() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 0.0);
    assert_eq!(brush.key(BrushKey::Left, &mut surface), None);
}

#[test]
fn test_step_uses_bucket_width_when_larger() {
    let mut brush = BrushController::new(TimelineConfig::default());
    // 100 000 s buckets are 100 px wide at this scale
    brush.set_series(
        (0..=10)
            .map(|i| TimelinePoint {
                at: i * 100_000,
                value: 1.0,
            })
            .collect(),
    );
    brush.resize(WIDTH, HEIGHT);
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    let moved = brush.key(BrushKey::Right, &mut surface).expect("moves");
    assert_px(moved, 575.0, 625.0);
}

#[test]
fn test_arrow_up_grows_right_edge() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    let grown = brush.key(BrushKey::Grow, &mut surface).expect("grows");
    assert_px(grown, 475.0, 530.0);

    click(&mut brush, &mut surface, 100.0);
    click(&mut brush, &mut surface, 990.0);
    assert_eq!(brush.key(BrushKey::Grow, &mut surface), None, "already at W");
}

#[test]
fn test_arrow_down_stops_at_two_steps() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    let shrunk = brush.key(BrushKey::Shrink, &mut surface).expect("shrinks");
    assert_px(shrunk, 475.0, 520.0);

    for _ in 0..50 {
        brush.key(BrushKey::Shrink, &mut surface);
    }
    assert!((selected_width_px(&brush) - 20.0).abs() < 1e-6);
    assert_eq!(brush.key(BrushKey::Shrink, &mut surface), None);
}

#[test]
fn test_escape_resets_from_any_state() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    let full = TimeRange::new(0, 1_000_000);

    assert_eq!(brush.escape(&mut surface), Some(full), "idle");

    click(&mut brush, &mut surface, 500.0);
    assert_eq!(brush.key(BrushKey::Reset, &mut surface), Some(full), "selected");
    assert_eq!(*brush.state(), BrushState::Idle);

    brush.pointer_down(100.0, &mut surface);
    brush.pointer_move(300.0);
    assert_eq!(surface.active_listeners(), 1);
    assert_eq!(brush.escape(&mut surface), Some(full), "mid drag");
    assert_eq!(surface.active_listeners(), 0);
    assert_eq!(brush.interval(), None);

    // Pointer-up after an aborted drag is harmless
    assert_eq!(brush.pointer_up(300.0, &mut surface), None);
    assert_eq!(surface.installs, surface.removals);
}

#[test]
fn test_key_names() {
    assert_eq!(BrushKey::from_key_name("ArrowLeft"), Some(BrushKey::Left));
    assert_eq!(BrushKey::from_key_name("ArrowDown"), Some(BrushKey::Shrink));
    assert_eq!(BrushKey::from_key_name("Escape"), Some(BrushKey::Reset));
    assert_eq!(BrushKey::from_key_name("Enter"), None);
    assert_eq!(
        BrushKey::key_names().collect::<Vec<_>>(),
        ["ArrowDown", "ArrowLeft", "ArrowRight", "ArrowUp", "Esc", "Escape"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Data, layout and rendering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_series_ignores_gestures() {
    let mut brush = BrushController::new(TimelineConfig::default());
    brush.resize(WIDTH, HEIGHT);
    let mut surface = RecordingSurface::new();

    assert_eq!(brush.domain(), None);
    assert_eq!(click(&mut brush, &mut surface, 500.0), None);
    assert_eq!(brush.pointer_move(600.0), None);
    assert_eq!(brush.key(BrushKey::Right, &mut surface), None);
    assert_eq!(brush.escape(&mut surface), None);
    assert!(brush.render().is_empty());
    assert_eq!(surface.installs, 0);
}

#[test]
fn test_series_cleared_keeps_committed_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    let range = click(&mut brush, &mut surface, 500.0);

    brush.set_series(Vec::new());
    assert_eq!(brush.interval(), range, "span survives an empty series");
    assert!(brush.render().is_empty());
    assert_eq!(click(&mut brush, &mut surface, 100.0), None);
    assert_eq!(brush.escape(&mut surface), None);
    assert_eq!(brush.interval(), range, "ignored gestures leave the span");

    brush.set_series(series());
    assert_eq!(brush.interval(), range);
    assert!(brush.interval_px().is_some(), "span drawn again");
}

#[test]
fn test_series_cleared_abandons_gesture() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    brush.pointer_down(200.0, &mut surface);
    brush.pointer_move(400.0);

    brush.set_series(Vec::new());
    assert_eq!(*brush.state(), BrushState::Idle);
}

// ─────────────────────────────────────────────────────────────────────────────
// Ranges committed elsewhere
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_set_interval_replaces_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    let range = TimeRange::new(100_000, 300_000);
    brush.set_interval(Some(range), &mut surface);
    assert_eq!(brush.interval(), Some(range));
    let (l, r) = brush.interval_px().expect("span drawn");
    assert!((l - 100.0).abs() < 1e-6 && (r - 300.0).abs() < 1e-6);

    let moved = brush.key(BrushKey::Right, &mut surface).expect("key moves span");
    assert_px(moved, 110.0, 310.0);
}

#[test]
fn test_set_interval_none_clears_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    click(&mut brush, &mut surface, 500.0);

    brush.set_interval(None, &mut surface);
    assert_eq!(*brush.state(), BrushState::Idle);
    assert_eq!(brush.interval(), None);
    assert_eq!(brush.key(BrushKey::Right, &mut surface), None, "nothing to move");
}

#[test]
fn test_set_interval_cancels_gesture() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    brush.pointer_down(200.0, &mut surface);
    assert_eq!(surface.active_listeners(), 1);

    let range = TimeRange::new(600_000, 700_000);
    brush.set_interval(Some(range), &mut surface);
    assert_eq!(surface.active_listeners(), 0, "drag listeners released");
    assert_eq!(brush.pointer_up(250.0, &mut surface), None);
    assert_eq!(brush.interval(), Some(range));
}

#[test]
fn test_resize_reprojects_span() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();
    let range = click(&mut brush, &mut surface, 500.0);

    assert!(brush.resize(2000.0, HEIGHT));
    assert_eq!(brush.interval(), range, "time interval unchanged");
    let (l, r) = brush.interval_px().expect("span");
    assert!((l - 950.0).abs() < 1e-6 && (r - 1050.0).abs() < 1e-6);
}

#[test]
fn test_small_resize_is_ignored() {
    let mut brush = controller();
    assert!(!brush.resize(WIDTH + 4.0, HEIGHT - 4.0));
    assert_eq!(brush.size(), (WIDTH, HEIGHT));
    assert!(brush.resize(WIDTH + 5.0, HEIGHT));
}

#[test]
fn test_render_frame() {
    let mut brush = controller();
    let mut surface = RecordingSurface::new();

    let frame = brush.render();
    assert_eq!(frame.len(), 2, "axis and area only");
    match &frame[0] {
        DrawCommand::Axis { ticks, baseline } => {
            assert_eq!(ticks.len(), 5);
            assert_eq!(ticks[0].x, 0.0);
            assert!((ticks[4].x - WIDTH).abs() < 1e-6);
            assert_eq!(*baseline, 100.0);
        }
        other => panic!("expected axis, got {other:?}"),
    }
    match &frame[1] {
        DrawCommand::Area { points, .. } => {
            assert_eq!(points.len(), 101);
            // Max value is 6, so a 6 reaches the top of the chart
            assert!(points.iter().any(|&(_, y)| y.abs() < 1e-9));
            assert!(points.iter().all(|&(_, y)| (0.0..=100.0).contains(&y)));
        }
        other => panic!("expected area, got {other:?}"),
    }

    click(&mut brush, &mut surface, 500.0);
    brush.redraw(&mut surface);
    let frame = surface.last_frame().expect("drawn");
    assert!(matches!(
        frame.last(),
        Some(DrawCommand::Brush { width, height, .. }) if (*width - 50.0).abs() < 1e-6 && *height == 100.0
    ));
}

#[test]
fn test_narrow_chart_has_three_ticks() {
    let mut brush = controller();
    brush.resize(200.0, HEIGHT);
    match &brush.render()[0] {
        DrawCommand::Axis { ticks, .. } => assert_eq!(ticks.len(), 3),
        other => panic!("expected axis, got {other:?}"),
    }
}

#[test]
fn test_all_zero_series_uses_default_y_max() {
    let mut brush = BrushController::new(TimelineConfig::default());
    brush.set_series(vec![
        TimelinePoint { at: 0, value: 0.0 },
        TimelinePoint { at: 10, value: 0.0 },
    ]);
    brush.resize(WIDTH, HEIGHT);
    match &brush.render()[1] {
        DrawCommand::Area { points, .. } => {
            assert!(points.iter().all(|&(_, y)| y == 100.0), "flat at the baseline");
        }
        other => panic!("expected area, got {other:?}"),
    }
}

#[test]
fn test_resize_debouncer_keeps_latest() {
    let mut debouncer = ResizeDebouncer::from_millis(200);
    let t0 = Instant::now();

    debouncer.request(800.0, 100.0, t0);
    debouncer.request(900.0, 120.0, t0 + Duration::from_millis(150));
    assert_eq!(debouncer.poll(t0 + Duration::from_millis(250)), None, "window restarted");
    assert_eq!(
        debouncer.poll(t0 + Duration::from_millis(350)),
        Some((900.0, 120.0))
    );
    assert_eq!(debouncer.poll(t0 + Duration::from_millis(900)), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Gesture {
    Down(f64),
    Move(f64),
    Up(f64),
    Key(BrushKey),
}

fn gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (-50.0..1050.0f64).prop_map(Gesture::Down),
        (-50.0..1050.0f64).prop_map(Gesture::Move),
        (-50.0..1050.0f64).prop_map(Gesture::Up),
        prop_oneof![
            Just(BrushKey::Left),
            Just(BrushKey::Right),
            Just(BrushKey::Grow),
            Just(BrushKey::Shrink),
            Just(BrushKey::Reset),
        ]
        .prop_map(Gesture::Key),
    ]
}

proptest! {
    #[test]
    fn prop_listeners_balanced_and_span_in_bounds(gestures in prop::collection::vec(gesture(), 0..40)) {
        let mut brush = controller();
        let mut surface = RecordingSurface::new();

        for g in gestures {
            let emitted = match g {
                Gesture::Down(x) => {
                    brush.pointer_down(x, &mut surface);
                    None
                }
                Gesture::Move(x) => brush.pointer_move(x),
                Gesture::Up(x) => brush.pointer_up(x, &mut surface),
                Gesture::Key(k) => brush.key(k, &mut surface),
            };
            prop_assert!(surface.active_listeners() <= 1);
            prop_assert_eq!(surface.active_listeners() == 1, brush.is_listening());
            if let Some(range) = emitted {
                prop_assert!(range.start >= 0 && range.end <= 1_000_000);
                prop_assert!(range.start <= range.end);
            }
        }

        brush.escape(&mut surface);
        prop_assert_eq!(surface.installs, surface.removals);
    }
}
