//! Two-hand composite pinch: start → move… → end.
//!
//! Each `Move` carries the change since the previous frame, not since
//! `Start`, so a consumer that applies every delta ends up with exactly the
//! total motion, however many frames it took.

use tracing::debug;

use crate::classifier::HandSignal;
use crate::event::{GestureEvent, Point2, TwoHandPhase};

/// Reference values carried from one frame to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoHandState {
    pub base_distance: f32,
    pub base_centroid: Point2,
    /// Last points seen, reported by the `End` event.
    pub hand0: Point2,
    pub hand1: Point2,
}

#[derive(Clone, Debug, Default)]
pub struct TwoHandTracker {
    state: Option<TwoHandState>,
}

impl TwoHandTracker {
    pub fn new() -> Self { Self::default() }

    pub fn is_active(&self) -> bool { self.state.is_some() }
    pub fn state(&self) -> Option<&TwoHandState> { self.state.as_ref() }

    /// Advance one frame.
    pub fn update(&mut self, signals: &[HandSignal; 2]) -> Option<GestureEvent> {
        let both = signals.iter().all(|s| s.detected && s.is_pinched)
            && signals.iter().all(|s| s.pinch_point.is_finite());

        if !both {
            return self.end();
        }

        let hand0 = signals[0].pinch_point;
        let hand1 = signals[1].pinch_point;
        let distance = hand0.distance(hand1);
        let centroid = hand0.midpoint(hand1);

        let phase = match self.state.as_ref() {
            None => {
                debug!(distance, "two-hand pinch start");
                TwoHandPhase::Start
            }
            Some(prev) => TwoHandPhase::Move {
                delta_distance: distance - prev.base_distance,
                delta_centroid: centroid - prev.base_centroid,
            },
        };

        self.state = Some(TwoHandState {
            base_distance: distance,
            base_centroid: centroid,
            hand0,
            hand1,
        });
        Some(GestureEvent::TwoHandPinch { hand0, hand1, phase })
    }

    /// Close an active gesture, e.g. when a frame is dropped outright.
    pub fn end(&mut self) -> Option<GestureEvent> {
        let last = self.state.take()?;
        debug!("two-hand pinch end");
        Some(GestureEvent::TwoHandPinch {
            hand0: last.hand0,
            hand1: last.hand1,
            phase: TwoHandPhase::End,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
