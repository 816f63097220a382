#![forbid(unsafe_code)]

//! Drag gesture recognition for floating affordances.
//!
//! [`DragGestureController`] owns the drag state machine of exactly one
//! draggable element. It consumes raw pointer events, moves the element
//! (clamped to the viewport) while the pointer is held, and on release
//! reports whether the interaction was a [`Verdict::Click`] or a
//! [`Verdict::Drag`].
//!
//! # State Machine
//!
//! ```text
//!            pointer_down                 pointer_move
//!   Idle ───────────────────▶ Dragging ◀────────────┐
//!    ▲                          │  └────────────────┘
//!    └──── pointer_up / cancel ─┘
//! ```
//!
//! # Invariants
//!
//! 1. `Idle ⇒ origin == None`.
//! 2. `moved` is one-directional within a gesture: once the displacement
//!    from `origin` exceeds the threshold on either axis it stays `true`
//!    until the next `pointer_down`.
//! 3. Every `pointer_down → pointer_up` sequence yields exactly one verdict.
//! 4. A listener pair is held only while `Dragging`; leaving `Dragging` on
//!    any path (release, cancel, reset, drop) detaches it.
//! 5. A click arriving right after a `Drag` verdict is rejected by
//!    [`accept_click`](DragGestureController::accept_click).
//!
//! # Failure Modes
//!
//! None. Events that do not apply to the current state (a move or release
//! while idle) are ignored.

use crate::event::{EventResponse, PointerEvent, PointerEventKind};
use crate::geometry::{Anchor, DEFAULT_MARGIN, Point, Size, clamp_position};
use crate::listener::{ListenerGuard, ListenerRegistry};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Displacement (px, either axis) beyond which a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 3.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and geometry for drag recognition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Displacement that must be exceeded to count as a drag (default: 3px).
    pub drag_threshold: f64,
    /// Margin kept from every viewport edge (default: 20px).
    pub margin: f64,
    /// Corner the element's position is measured from (default: bottom-right).
    pub anchor: Anchor,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            margin: DEFAULT_MARGIN,
            anchor: Anchor::BottomRight,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Observable drag state.
///
/// Fields are private so that `Idle ⇒ origin == None` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    phase: DragPhase,
    origin: Option<Point>,
    moved: bool,
}

impl DragState {
    #[inline]
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Pointer position at `pointer_down`; `None` while idle.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    /// Whether the current (or last) gesture crossed the drag threshold.
    #[inline]
    #[must_use]
    pub fn moved(&self) -> bool {
        self.moved
    }
}

/// Outcome of a completed press/release interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The pointer never left the threshold box.
    Click,
    /// The pointer moved beyond the threshold at some point.
    Drag,
}

/// Result of feeding one [`PointerEvent`] through
/// [`DragGestureController::process`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutput {
    /// The event did not apply to the current state.
    Ignored,
    /// A gesture started; the host should honour the response flags.
    Pressed(EventResponse),
    /// The element moved to a new clamped position.
    Moved(Point),
    /// The gesture finished with a verdict.
    Released(Verdict),
    /// The gesture was aborted without a verdict.
    Cancelled,
}

// ---------------------------------------------------------------------------
// DragGestureController
// ---------------------------------------------------------------------------

/// Stateful drag/click disambiguator for a single draggable element.
pub struct DragGestureController {
    config: GestureConfig,
    state: DragState,
    /// Rendered position (anchored offset).
    position: Point,
    /// Rendered position when the current gesture started.
    start_position: Point,
    listeners: ListenerRegistry,
    capture: Option<ListenerGuard>,
    /// Verdict of the last completed gesture not yet consumed by a click.
    pending_verdict: Option<Verdict>,
}

impl std::fmt::Debug for DragGestureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragGestureController")
            .field("state", &self.state)
            .field("position", &self.position)
            .field("capturing", &self.capture.is_some())
            .finish()
    }
}

impl DragGestureController {
    /// Create an idle controller rendering at `initial_position`.
    ///
    /// Listener pairs are accounted in `listeners`.
    #[must_use]
    pub fn new(config: GestureConfig, initial_position: Point, listeners: ListenerRegistry) -> Self {
        Self {
            config,
            state: DragState::default(),
            position: initial_position,
            start_position: initial_position,
            listeners,
            capture: None,
            pending_verdict: None,
        }
    }

    /// Current state snapshot.
    #[inline]
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a gesture is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state.phase == DragPhase::Dragging
    }

    /// Current rendered position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// Re-clamp the rendered position, e.g. after a viewport resize.
    pub fn clamp_to(&mut self, element: Size, viewport: Size) -> Point {
        self.position = clamp_position(self.position, element, viewport, self.config.margin);
        self.position
    }

    /// Start a gesture at `pointer`.
    ///
    /// A press while already dragging restarts the gesture from `pointer`.
    pub fn pointer_down(&mut self, pointer: Point) -> EventResponse {
        // Detach before re-attaching so a restart never holds two pairs.
        self.capture = None;
        self.capture = Some(self.listeners.acquire());
        self.state = DragState {
            phase: DragPhase::Dragging,
            origin: Some(pointer),
            moved: false,
        };
        self.start_position = self.position;
        self.pending_verdict = None;
        tracing::debug!(
            target: "sfui.gesture",
            x = pointer.x,
            y = pointer.y,
            "drag gesture started"
        );
        EventResponse::PREVENT_DEFAULT
    }

    /// Track the pointer while dragging.
    ///
    /// Returns the new clamped position, or `None` when idle.
    pub fn pointer_move(&mut self, pointer: Point, element: Size, viewport: Size) -> Option<Point> {
        if self.state.phase != DragPhase::Dragging {
            return None;
        }
        let origin = self.state.origin?;
        let delta = pointer.delta_from(origin);

        if !self.state.moved && delta.exceeds(self.config.drag_threshold) {
            self.state.moved = true;
            tracing::trace!(target: "sfui.gesture", dx = delta.dx, dy = delta.dy, "drag threshold crossed");
        }

        let proposed = self.config.anchor.translate(self.start_position, delta);
        self.position = clamp_position(proposed, element, viewport, self.config.margin);
        Some(self.position)
    }

    /// Finish the gesture and report its verdict.
    ///
    /// Returns `None` when no gesture was in progress.
    pub fn pointer_up(&mut self) -> Option<Verdict> {
        if self.state.phase != DragPhase::Dragging {
            return None;
        }
        self.capture = None;
        self.state.phase = DragPhase::Idle;
        self.state.origin = None;

        let verdict = if self.state.moved {
            Verdict::Drag
        } else {
            Verdict::Click
        };
        self.pending_verdict = Some(verdict);
        tracing::debug!(target: "sfui.gesture", ?verdict, "drag gesture released");
        Some(verdict)
    }

    /// Abort the gesture without a verdict.
    ///
    /// Returns `true` if a gesture was in progress.
    pub fn pointer_cancel(&mut self) -> bool {
        if self.state.phase != DragPhase::Dragging {
            return false;
        }
        self.capture = None;
        self.state = DragState::default();
        self.pending_verdict = None;
        tracing::debug!(target: "sfui.gesture", "drag gesture cancelled");
        true
    }

    /// Consume the verdict of the last gesture, if a click has not
    /// consumed it yet.
    pub fn take_verdict(&mut self) -> Option<Verdict> {
        self.pending_verdict.take()
    }

    /// Decide whether a synthetic click should reach the click handler.
    ///
    /// A click directly following a [`Verdict::Drag`] is rejected once.
    pub fn accept_click(&mut self) -> bool {
        !matches!(self.take_verdict(), Some(Verdict::Drag))
    }

    /// Feed one raw pointer event.
    pub fn process(&mut self, event: &PointerEvent, element: Size, viewport: Size) -> GestureOutput {
        match event.kind {
            PointerEventKind::Down => GestureOutput::Pressed(self.pointer_down(event.pos)),
            PointerEventKind::Move => self
                .pointer_move(event.pos, element, viewport)
                .map_or(GestureOutput::Ignored, GestureOutput::Moved),
            PointerEventKind::Up => self
                .pointer_up()
                .map_or(GestureOutput::Ignored, GestureOutput::Released),
            PointerEventKind::Cancel => {
                if self.pointer_cancel() {
                    GestureOutput::Cancelled
                } else {
                    GestureOutput::Ignored
                }
            }
        }
    }

    /// Reset all gesture state to idle. The rendered position is kept.
    pub fn reset(&mut self) {
        self.capture = None;
        self.state = DragState::default();
        self.pending_verdict = None;
        self.start_position = self.position;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ELEMENT: Size = Size::new(240.0, 56.0);
    const VIEWPORT: Size = Size::new(1024.0, 768.0);

    fn controller() -> (DragGestureController, ListenerRegistry) {
        let listeners = ListenerRegistry::new();
        let gc = DragGestureController::new(
            GestureConfig::default(),
            Point::new(20.0, 20.0),
            listeners.clone(),
        );
        (gc, listeners)
    }

    fn run(gc: &mut DragGestureController, events: &[PointerEvent]) -> Vec<GestureOutput> {
        events
            .iter()
            .map(|ev| gc.process(ev, ELEMENT, VIEWPORT))
            .collect()
    }

    // --- Verdicts ---

    #[test]
    fn press_release_is_click() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        assert_eq!(gc.pointer_up(), Some(Verdict::Click));
    }

    #[test]
    fn small_jitter_stays_click() {
        let (mut gc, _) = controller();
        let out = run(
            &mut gc,
            &[
                PointerEvent::down(900.0, 700.0),
                PointerEvent::moved(902.0, 701.0),
                PointerEvent::moved(897.0, 697.0),
                PointerEvent::up(897.0, 697.0),
            ],
        );
        assert_eq!(out.last(), Some(&GestureOutput::Released(Verdict::Click)));
    }

    #[test]
    fn exactly_threshold_is_not_a_drag() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_move(Point::new(503.0, 497.0), ELEMENT, VIEWPORT);
        assert!(!gc.state().moved());
        assert_eq!(gc.pointer_up(), Some(Verdict::Click));
    }

    #[test]
    fn crossing_threshold_on_one_axis_is_drag() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_move(Point::new(500.0, 503.5), ELEMENT, VIEWPORT);
        assert!(gc.state().moved());
        assert_eq!(gc.pointer_up(), Some(Verdict::Drag));
    }

    #[test]
    fn moved_is_sticky_after_returning_home() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_move(Point::new(510.0, 500.0), ELEMENT, VIEWPORT);
        gc.pointer_move(Point::new(500.0, 500.0), ELEMENT, VIEWPORT);
        assert!(gc.state().moved());
        assert_eq!(gc.pointer_up(), Some(Verdict::Drag));
    }

    #[test]
    fn next_gesture_starts_fresh() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_move(Point::new(540.0, 500.0), ELEMENT, VIEWPORT);
        assert_eq!(gc.pointer_up(), Some(Verdict::Drag));
        // Last verdict stays observable until the next press.
        assert!(gc.state().moved());

        gc.pointer_down(Point::new(300.0, 300.0));
        assert!(!gc.state().moved());
        assert_eq!(gc.pointer_up(), Some(Verdict::Click));
    }

    // --- State invariants ---

    #[test]
    fn idle_has_no_origin() {
        let (mut gc, _) = controller();
        assert_eq!(gc.state().phase(), DragPhase::Idle);
        assert_eq!(gc.state().origin(), None);

        gc.pointer_down(Point::new(1.0, 2.0));
        assert_eq!(gc.state().origin(), Some(Point::new(1.0, 2.0)));

        gc.pointer_up();
        assert_eq!(gc.state().phase(), DragPhase::Idle);
        assert_eq!(gc.state().origin(), None);
    }

    #[test]
    fn move_and_up_while_idle_are_ignored() {
        let (mut gc, _) = controller();
        assert_eq!(gc.pointer_move(Point::new(9.0, 9.0), ELEMENT, VIEWPORT), None);
        assert_eq!(gc.pointer_up(), None);
        assert_eq!(gc.position(), Point::new(20.0, 20.0));
    }

    #[test]
    fn press_prevents_default() {
        let (mut gc, _) = controller();
        assert!(gc.pointer_down(Point::new(1.0, 1.0)).prevents_default());
    }

    // --- Position ---

    #[test]
    fn drag_moves_bottom_right_anchored_offset() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        // Pointer goes left/up by 100/50: offsets from the right/bottom grow.
        let pos = gc.pointer_move(Point::new(800.0, 650.0), ELEMENT, VIEWPORT);
        assert_eq!(pos, Some(Point::new(120.0, 70.0)));
    }

    #[test]
    fn delta_is_measured_from_origin_not_last_move() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        gc.pointer_move(Point::new(850.0, 700.0), ELEMENT, VIEWPORT);
        let pos = gc.pointer_move(Point::new(800.0, 700.0), ELEMENT, VIEWPORT);
        assert_eq!(pos, Some(Point::new(120.0, 20.0)));
    }

    #[test]
    fn drag_is_clamped_to_viewport() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        let pos = gc.pointer_move(Point::new(-5000.0, 5000.0), ELEMENT, VIEWPORT);
        assert_eq!(
            pos,
            Some(Point::new(1024.0 - 240.0 - 20.0, 20.0)),
        );
    }

    #[test]
    fn second_gesture_continues_from_dropped_position() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        gc.pointer_move(Point::new(800.0, 700.0), ELEMENT, VIEWPORT);
        gc.pointer_up();

        gc.pointer_down(Point::new(600.0, 600.0));
        let pos = gc.pointer_move(Point::new(590.0, 600.0), ELEMENT, VIEWPORT);
        assert_eq!(pos, Some(Point::new(130.0, 20.0)));
    }

    #[test]
    fn clamp_to_handles_viewport_shrink() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(900.0, 700.0));
        gc.pointer_move(Point::new(300.0, 700.0), ELEMENT, VIEWPORT);
        gc.pointer_up();
        assert_eq!(gc.position(), Point::new(620.0, 20.0));

        let pos = gc.clamp_to(ELEMENT, Size::new(400.0, 300.0));
        assert_eq!(pos, Point::new(400.0 - 240.0 - 20.0, 20.0));
    }

    // --- Listeners ---

    #[test]
    fn listeners_attached_only_while_dragging() {
        let (mut gc, listeners) = controller();
        assert_eq!(listeners.active(), 0);
        gc.pointer_down(Point::new(1.0, 1.0));
        assert_eq!(listeners.active(), 1);
        gc.pointer_up();
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn repeated_press_holds_single_pair() {
        let (mut gc, listeners) = controller();
        gc.pointer_down(Point::new(1.0, 1.0));
        gc.pointer_down(Point::new(2.0, 2.0));
        assert_eq!(listeners.active(), 1);
        assert_eq!(listeners.total_acquired(), 2);
    }

    #[test]
    fn cancel_releases_listeners_without_verdict() {
        let (mut gc, listeners) = controller();
        gc.pointer_down(Point::new(1.0, 1.0));
        gc.pointer_move(Point::new(50.0, 1.0), ELEMENT, VIEWPORT);
        assert_eq!(
            gc.process(&PointerEvent::cancel(), ELEMENT, VIEWPORT),
            GestureOutput::Cancelled
        );
        assert_eq!(listeners.active(), 0);
        assert_eq!(gc.take_verdict(), None);
        assert_eq!(gc.pointer_up(), None);
    }

    #[test]
    fn drop_mid_drag_releases_listeners() {
        let (mut gc, listeners) = controller();
        gc.pointer_down(Point::new(1.0, 1.0));
        drop(gc);
        assert_eq!(listeners.active(), 0);
    }

    #[test]
    fn reset_releases_listeners() {
        let (mut gc, listeners) = controller();
        gc.pointer_down(Point::new(1.0, 1.0));
        gc.reset();
        assert_eq!(listeners.active(), 0);
        assert!(!gc.is_dragging());
    }

    // --- Click suppression ---

    #[test]
    fn click_after_drag_is_suppressed_once() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_move(Point::new(520.0, 500.0), ELEMENT, VIEWPORT);
        gc.pointer_up();
        assert!(!gc.accept_click());
        // A later, unrelated click (e.g. keyboard activation) goes through.
        assert!(gc.accept_click());
    }

    #[test]
    fn click_after_click_verdict_is_accepted() {
        let (mut gc, _) = controller();
        gc.pointer_down(Point::new(500.0, 500.0));
        gc.pointer_up();
        assert!(gc.accept_click());
    }

    #[test]
    fn click_without_gesture_is_accepted() {
        let (mut gc, _) = controller();
        assert!(gc.accept_click());
    }

    // --- Tracing ---

    mod tracing_capture {
        use super::*;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::SubscriberExt;

        #[derive(Debug, Clone)]
        struct CapturedEvent {
            target: String,
            message: String,
        }

        struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

        struct MessageVisitor(String);

        impl tracing::field::Visit for MessageVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
            fn on_event(
                &self,
                event: &tracing::Event<'_>,
                _ctx: tracing_subscriber::layer::Context<'_, S>,
            ) {
                let mut visitor = MessageVisitor(String::new());
                event.record(&mut visitor);
                self.0.lock().unwrap().push(CapturedEvent {
                    target: event.metadata().target().to_string(),
                    message: visitor.0,
                });
            }
        }

        #[test]
        fn gesture_lifecycle_is_traced() {
            let events = Arc::new(Mutex::new(Vec::new()));
            let subscriber =
                tracing_subscriber::registry().with(EventCapture(Arc::clone(&events)));

            tracing::subscriber::with_default(subscriber, || {
                let (mut gc, _) = controller();
                gc.pointer_down(Point::new(500.0, 500.0));
                gc.pointer_move(Point::new(520.0, 500.0), ELEMENT, VIEWPORT);
                gc.pointer_up();
            });

            let events = events.lock().unwrap();
            let messages: Vec<&str> = events
                .iter()
                .filter(|e| e.target == "sfui.gesture")
                .map(|e| e.message.as_str())
                .collect();
            assert_eq!(
                messages,
                vec![
                    "drag gesture started",
                    "drag threshold crossed",
                    "drag gesture released"
                ]
            );
        }
    }

    #[test]
    fn custom_threshold() {
        let listeners = ListenerRegistry::new();
        let mut gc = DragGestureController::new(
            GestureConfig {
                drag_threshold: 10.0,
                ..GestureConfig::default()
            },
            Point::new(20.0, 20.0),
            listeners,
        );
        gc.pointer_down(Point::new(100.0, 100.0));
        gc.pointer_move(Point::new(108.0, 100.0), ELEMENT, VIEWPORT);
        assert_eq!(gc.pointer_up(), Some(Verdict::Click));
    }
}
