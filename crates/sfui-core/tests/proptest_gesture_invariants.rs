//! Property-based invariant tests for the clamp and the drag state machine.
//!
//! 1. Clamp results stay inside `[margin, viewport - element - margin]` when
//!    that range is non-empty, and collapse to `margin` otherwise.
//! 2. Clamp is idempotent.
//! 3. Pointer paths whose displacement never exceeds 3px yield `Click`.
//! 4. Pointer paths that exceed 3px on either axis at any point yield `Drag`.
//! 5. Every rendered position during a drag satisfies the clamp bounds.
//! 6. No listener pair survives a completed or cancelled gesture.

use proptest::prelude::*;
use sfui_core::{
    DEFAULT_MARGIN, DragGestureController, GestureConfig, ListenerRegistry, Point, Size, Verdict,
    clamp_position,
};

// ── Strategies ──────────────────────────────────────────────────────────

fn size_strategy() -> impl Strategy<Value = Size> {
    (0.0f64..3000.0, 0.0f64..3000.0).prop_map(|(w, h)| Size::new(w, h))
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0).prop_map(|(x, y)| Point::new(x, y))
}

/// Offsets within the 3px box (inclusive), in exact quarter-pixel steps.
fn jitter_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec(
        (-12i32..=12, -12i32..=12).prop_map(|(x, y)| (f64::from(x) / 4.0, f64::from(y) / 4.0)),
        0..20,
    )
}

/// Whole-pixel pointer origins away from the viewport edges.
fn origin_strategy() -> impl Strategy<Value = Point> {
    (100i32..900, 100i32..700).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

fn axis_bounds(element: f64, viewport: f64) -> (f64, f64) {
    let upper = viewport - element - DEFAULT_MARGIN;
    if upper < DEFAULT_MARGIN {
        (DEFAULT_MARGIN, DEFAULT_MARGIN)
    } else {
        (DEFAULT_MARGIN, upper)
    }
}

fn within_bounds(p: Point, element: Size, viewport: Size) -> bool {
    let (lx, ux) = axis_bounds(element.width, viewport.width);
    let (ly, uy) = axis_bounds(element.height, viewport.height);
    p.x >= lx && p.x <= ux && p.y >= ly && p.y <= uy
}

fn fresh() -> (DragGestureController, ListenerRegistry) {
    let listeners = ListenerRegistry::new();
    let gc = DragGestureController::new(
        GestureConfig::default(),
        Point::new(DEFAULT_MARGIN, DEFAULT_MARGIN),
        listeners.clone(),
    );
    (gc, listeners)
}

// ═══════════════════════════════════════════════════════════════════════
// 1–2. Clamp
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_respects_bounds(
        proposed in point_strategy(),
        element in size_strategy(),
        viewport in size_strategy(),
    ) {
        let clamped = clamp_position(proposed, element, viewport, DEFAULT_MARGIN);
        prop_assert!(within_bounds(clamped, element, viewport));
    }

    #[test]
    fn clamp_is_idempotent(
        proposed in point_strategy(),
        element in size_strategy(),
        viewport in size_strategy(),
    ) {
        let once = clamp_position(proposed, element, viewport, DEFAULT_MARGIN);
        let twice = clamp_position(once, element, viewport, DEFAULT_MARGIN);
        prop_assert_eq!(once, twice);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3–6. Drag verdicts
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn small_paths_are_clicks(
        origin in origin_strategy(),
        path in jitter_strategy(),
    ) {
        let (mut gc, listeners) = fresh();
        let element = Size::new(220.0, 56.0);
        let viewport = Size::new(1024.0, 768.0);

        gc.pointer_down(origin);
        for (dx, dy) in path {
            gc.pointer_move(Point::new(origin.x + dx, origin.y + dy), element, viewport);
        }
        prop_assert_eq!(gc.pointer_up(), Some(Verdict::Click));
        prop_assert_eq!(listeners.active(), 0);
        prop_assert!(gc.accept_click());
    }

    #[test]
    fn large_excursion_is_drag(
        origin in origin_strategy(),
        before in jitter_strategy(),
        excursion in prop_oneof![
            (3.001f64..400.0).prop_map(|d| (d, 0.0)),
            (-400.0f64..-3.001).prop_map(|d| (d, 0.0)),
            (3.001f64..400.0).prop_map(|d| (0.0, d)),
            (-400.0f64..-3.001).prop_map(|d| (0.0, d)),
        ],
        after in jitter_strategy(),
    ) {
        let (mut gc, listeners) = fresh();
        let element = Size::new(220.0, 56.0);
        let viewport = Size::new(1024.0, 768.0);

        gc.pointer_down(origin);
        let moves = before
            .into_iter()
            .chain(std::iter::once(excursion))
            .chain(after);
        for (dx, dy) in moves {
            if let Some(pos) =
                gc.pointer_move(Point::new(origin.x + dx, origin.y + dy), element, viewport)
            {
                prop_assert!(within_bounds(pos, element, viewport));
            }
        }
        prop_assert_eq!(gc.pointer_up(), Some(Verdict::Drag));
        prop_assert_eq!(listeners.active(), 0);
        prop_assert!(!gc.accept_click());
    }

    #[test]
    fn cancel_never_leaks_listeners(
        path in prop::collection::vec(point_strategy(), 0..10),
    ) {
        let (mut gc, listeners) = fresh();
        let element = Size::new(220.0, 56.0);
        let viewport = Size::new(1024.0, 768.0);

        gc.pointer_down(Point::new(500.0, 500.0));
        for p in path {
            gc.pointer_move(p, element, viewport);
        }
        prop_assert!(gc.pointer_cancel());
        prop_assert_eq!(listeners.active(), 0);
        prop_assert!(gc.state().origin().is_none());
    }
}
