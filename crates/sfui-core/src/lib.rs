#![forbid(unsafe_code)]

//! Core: geometry, pointer events, and drag gesture recognition.
//!
//! # Role in sfui
//! `sfui-core` is the input layer. It owns the viewport clamp, the
//! canonical pointer event type, scoped listener accounting, and the drag
//! state machine that decides whether a press was a click or a drag.
//!
//! # How it fits in the system
//! `sfui-widgets` composes these pieces into floating affordances. Nothing
//! here knows about authentication, persistence, or timers; those live in
//! `sfui-runtime`.

pub mod event;
pub mod geometry;
pub mod gesture;
pub mod listener;

pub use event::{EventResponse, PointerEvent, PointerEventKind};
pub use geometry::{Anchor, DEFAULT_MARGIN, Delta, Point, Size, clamp_position};
pub use gesture::{
    DEFAULT_DRAG_THRESHOLD, DragGestureController, DragPhase, DragState, GestureConfig,
    GestureOutput, Verdict,
};
pub use listener::{ListenerGuard, ListenerRegistry};
