//! Geometric classifier: one landmark set in, one [`HandSignal`] out.
//!
//! Pure function of the current frame. Nothing here remembers the past.

use crate::config::{ActionTrigger, GestureConfig};
use crate::event::Point2;
use crate::landmarks::{index, Landmark, LandmarkSet};

/// Per-hand, per-frame booleans and control points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandSignal {
    pub detected:    bool,
    pub is_pinched:  bool,
    pub is_fisted:   bool,
    /// Index fingertip, display space.
    pub pinch_point: Point2,
    /// Wrist, display space.
    pub fist_point:  Point2,
}

impl HandSignal {
    /// Signal for a slot with no hand this frame.
    pub const LOST: HandSignal = HandSignal {
        detected:    false,
        is_pinched:  false,
        is_fisted:   false,
        pinch_point: Point2::new(0.0, 0.0),
        fist_point:  Point2::new(0.0, 0.0),
    };

    /// Whether the gesture bound to `trigger` is active.
    pub fn triggered(&self, trigger: ActionTrigger) -> bool {
        match trigger {
            ActionTrigger::Pinch => self.detected && self.is_pinched,
            ActionTrigger::Fist  => self.detected && self.is_fisted,
        }
    }

    /// Control point that goes with `trigger`.
    pub fn point_for(&self, trigger: ActionTrigger) -> Point2 {
        match trigger {
            ActionTrigger::Pinch => self.pinch_point,
            ActionTrigger::Fist  => self.fist_point,
        }
    }
}

/// Thumb tip ↔ index tip distance.
pub fn pinch_distance(hand: &LandmarkSet, use_depth: bool) -> f32 {
    let (thumb, tip) = (hand.thumb_tip(), hand.index_tip());
    if use_depth { thumb.distance_3d(&tip) } else { thumb.distance_2d(&tip) }
}

/// Distances from the index, middle, ring and pinky tips to the wrist.
pub fn fist_closure(hand: &LandmarkSet) -> [f32; 4] {
    let wrist = hand.wrist();
    index::FINGERTIPS.map(|i| hand.get(i).distance_2d(&wrist))
}

/// Classify one hand.
pub fn classify(hand: &LandmarkSet, cfg: &GestureConfig) -> HandSignal {
    let is_fisted  = fist_closure(hand).iter().all(|&d| d < cfg.fist_threshold);
    // A closed fist often rests the thumb on the index tip; the fist wins.
    let is_pinched = !is_fisted && pinch_distance(hand, cfg.use_depth) < cfg.pinch_threshold;

    HandSignal {
        detected:    true,
        is_pinched,
        is_fisted,
        pinch_point: to_display(hand.index_tip(), cfg.mirror_x),
        fist_point:  to_display(hand.wrist(), cfg.mirror_x),
    }
}

fn to_display(p: Landmark, mirror_x: bool) -> Point2 {
    let x = if mirror_x { 1.0 - p.x } else { p.x };
    Point2::new(x, p.y)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::HandPose;

    /// Open hand with the thumb tip placed `d` to the left of the index tip.
    fn hand_with_pinch_distance(d: f32) -> LandmarkSet {
        let mut pts = LandmarkSet::synthetic((0.5, 0.5), HandPose::Open).to_points();
        pts[index::INDEX_TIP] = [0.5, 0.5, 0.0];
        pts[index::THUMB_TIP] = [0.5 - d, 0.5, 0.0];
        LandmarkSet::from_points(&pts).unwrap()
    }

    #[test]
    fn pinch_threshold_is_exclusive() {
        let cfg = GestureConfig { pinch_threshold: 0.05, ..GestureConfig::default() };
        // 0.0625 and 0.03125 are exact in f32, so the distances are too.
        assert!(!classify(&hand_with_pinch_distance(0.0625), &cfg).is_pinched);
        assert!( classify(&hand_with_pinch_distance(0.03125), &cfg).is_pinched);

        let at = GestureConfig { pinch_threshold: 0.0625, ..GestureConfig::default() };
        assert!(!classify(&hand_with_pinch_distance(0.0625), &at).is_pinched);
    }

    #[test]
    fn synthetic_poses_classify() {
        let cfg = GestureConfig::default();
        let open  = classify(&LandmarkSet::synthetic((0.5, 0.5), HandPose::Open),  &cfg);
        let pinch = classify(&LandmarkSet::synthetic((0.5, 0.5), HandPose::Pinch), &cfg);
        let fist  = classify(&LandmarkSet::synthetic((0.5, 0.5), HandPose::Fist),  &cfg);

        assert!(!open.is_pinched && !open.is_fisted);
        assert!(pinch.is_pinched && !pinch.is_fisted);
        assert!(fist.is_fisted && !fist.is_pinched);
    }

    #[test]
    fn thumb_resting_on_fist_is_not_a_pinch() {
        let mut pts = LandmarkSet::synthetic((0.5, 0.5), HandPose::Fist).to_points();
        pts[index::THUMB_TIP] = pts[index::INDEX_TIP];
        let signal = classify(&LandmarkSet::from_points(&pts).unwrap(), &GestureConfig::default());
        assert!(signal.is_fisted);
        assert!(!signal.is_pinched);
    }

    #[test]
    fn fist_requires_all_four_fingers() {
        let cfg = GestureConfig::default();
        let mut pts = LandmarkSet::synthetic((0.5, 0.5), HandPose::Fist).to_points();
        // Extend the pinky alone.
        let wrist = pts[index::WRIST];
        pts[index::PINKY_TIP] = [wrist[0] + 0.06, wrist[1] - 0.2, 0.0];
        let hand = LandmarkSet::from_points(&pts).unwrap();
        assert!(!classify(&hand, &cfg).is_fisted);
    }

    #[test]
    fn mirroring_flips_x_only() {
        let hand = LandmarkSet::synthetic((0.2, 0.3), HandPose::Pinch);
        let mirrored = classify(&hand, &GestureConfig::default());
        let raw = classify(&hand, &GestureConfig { mirror_x: false, ..GestureConfig::default() });
        assert!((mirrored.pinch_point.x - 0.8).abs() < 1e-6);
        assert!((raw.pinch_point.x - 0.2).abs() < 1e-6);
        assert_eq!(mirrored.pinch_point.y, raw.pinch_point.y);
    }

    #[test]
    fn depth_counts_when_enabled() {
        let mut pts = hand_with_pinch_distance(0.03).to_points();
        pts[index::THUMB_TIP][2] = 0.1;
        let hand = LandmarkSet::from_points(&pts).unwrap();
        let flat  = GestureConfig::default();
        let depth = GestureConfig { use_depth: true, ..GestureConfig::default() };
        assert!(classify(&hand, &flat).is_pinched);
        assert!(!classify(&hand, &depth).is_pinched);
    }
}
