#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native input (DOM mouse events, winit cursor
//! events, touch) into [`PointerEvent`] values and feed them, in arrival
//! order, to the gesture layer. Only a single pointer is modelled.

use bitflags::bitflags;

use crate::geometry::Point;

/// Kind of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Primary button pressed.
    Down,
    /// Pointer moved (with or without a button held).
    Move,
    /// Primary button released.
    Up,
    /// The platform aborted the gesture (focus loss, capture lost, Escape).
    Cancel,
}

/// A pointer event in viewport coordinates (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pos: Point,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            pos: Point::new(x, y),
        }
    }

    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y)
    }

    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    #[must_use]
    pub const fn cancel() -> Self {
        Self::new(PointerEventKind::Cancel, 0.0, 0.0)
    }
}

bitflags! {
    /// What the host should do with the native event after the kernel
    /// handled it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventResponse: u8 {
        /// Nothing to do.
        const NONE = 0b0000_0000;
        /// Suppress the platform default (text selection, native drag).
        const PREVENT_DEFAULT = 0b0000_0001;
        /// Do not bubble to enclosing handlers.
        const STOP_PROPAGATION = 0b0000_0010;
    }
}

impl EventResponse {
    #[inline]
    #[must_use]
    pub fn prevents_default(self) -> bool {
        self.contains(Self::PREVENT_DEFAULT)
    }

    #[inline]
    #[must_use]
    pub fn stops_propagation(self) -> bool {
        self.contains(Self::STOP_PROPAGATION)
    }
}
