//! Events emitted by the engine, one batch per frame.

use std::ops::{Add, Sub};

use serde::Serialize;

/// A 2D point in display space (x right, y down, both normalized to `[0, 1]`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self { Point2 { x, y } }

    pub fn distance(self, other: Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(self) -> bool { self.x.is_finite() && self.y.is_finite() }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, o: Point2) -> Point2 { Point2::new(self.x + o.x, self.y + o.y) }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, o: Point2) -> Point2 { Point2::new(self.x - o.x, self.y - o.y) }
}

/// A high-level gesture recognised in one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// One hand is pinched; emitted every frame it stays that way.
    Hover { point: Point2 },

    /// The trigger gesture was held long enough. `double` when it follows the
    /// previous action on the same hand within the double window.
    Action { point: Point2, double: bool },

    /// Both hands pinched together.
    TwoHandPinch { hand0: Point2, hand1: Point2, phase: TwoHandPhase },
}

/// Lifecycle of a two-hand pinch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TwoHandPhase {
    Start,
    /// Change since the previous frame: spread between the hands (zoom)
    /// and motion of their midpoint (pan).
    Move { delta_distance: f32, delta_centroid: Point2 },
    End,
}

impl GestureEvent {
    pub fn is_hover(&self) -> bool { matches!(self, GestureEvent::Hover { .. }) }
}
