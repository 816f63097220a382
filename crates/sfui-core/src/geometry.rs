#![forbid(unsafe_code)]

//! Geometric primitives and viewport clamping.
//!
//! Positions of floating affordances are stored as offsets from one corner of
//! the viewport (the [`Anchor`]). [`clamp_position`] keeps such an offset
//! inside the viewport with a fixed margin on every side.
//!
//! # Invariants
//!
//! 1. `clamp_position` is total: every input (including NaN and elements
//!    larger than the viewport) produces a finite, deterministic result.
//! 2. When the clamp range `[margin, viewport - element - margin]` is
//!    non-empty, the result lies inside it on both axes.
//! 3. When the range is empty, the axis collapses to `margin`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Margin kept between an affordance and the viewport edges.
pub const DEFAULT_MARGIN: f64 = 20.0;

/// A 2D position in CSS-like pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Delta {
        Delta {
            dx: self.x - origin.x,
            dy: self.y - origin.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A pointer displacement in screen space (right and down are positive).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    /// Whether the displacement is strictly larger than `threshold` on
    /// either axis.
    #[inline]
    #[must_use]
    pub fn exceeds(self, threshold: f64) -> bool {
        self.dx.abs() > threshold || self.dy.abs() > threshold
    }
}

/// Width and height of an element or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The viewport corner a position is measured from.
///
/// Floating affordances sit in the bottom-right corner, so their offsets
/// shrink when the pointer moves right or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Anchor {
    /// Move an anchored offset by a screen-space pointer displacement.
    #[must_use]
    pub fn translate(self, position: Point, delta: Delta) -> Point {
        let (sx, sy) = match self {
            Self::TopLeft => (1.0, 1.0),
            Self::TopRight => (-1.0, 1.0),
            Self::BottomLeft => (1.0, -1.0),
            Self::BottomRight => (-1.0, -1.0),
        };
        Point::new(position.x + sx * delta.dx, position.y + sy * delta.dy)
    }
}

/// Clamp a proposed offset so the element stays inside the viewport.
///
/// Per axis: `max(margin, min(proposed, viewport - element - margin))`.
/// An element larger than the viewport collapses the range to `margin`;
/// a NaN coordinate also resolves to `margin`.
#[must_use]
pub fn clamp_position(proposed: Point, element: Size, viewport: Size, margin: f64) -> Point {
    Point::new(
        clamp_axis(proposed.x, element.width, viewport.width, margin),
        clamp_axis(proposed.y, element.height, viewport.height, margin),
    )
}

fn clamp_axis(proposed: f64, element: f64, viewport: f64, margin: f64) -> f64 {
    if proposed.is_nan() {
        return margin;
    }
    let upper = viewport - element - margin;
    // `upper` may itself be NaN; the comparisons below then fall to `margin`.
    let bounded = if proposed < upper { proposed } else { upper };
    if bounded > margin { bounded } else { margin }
}
