//! Hand landmarks as delivered by the external detector.
//!
//! Coordinates follow the usual 21-point hand model: x and y normalized to
//! `[0, 1]` of the capture frame with the origin top-left, z a relative depth
//! estimate (smaller = closer to the camera).

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GestureError;

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Maximum number of hands tracked per frame.
pub const MAX_HANDS: usize = 2;

/// Landmark indices used by the classifier.
pub mod index {
    pub const WRIST:      usize = 0;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_TIP:  usize = 20;

    /// The four non-thumb fingertips.
    pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point on a hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn distance_3d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx*dx + dy*dy + dz*dz).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// The full 21-point landmark set of one hand in one frame.
///
/// Always exactly [`LANDMARK_COUNT`] finite points; the fallible constructors
/// reject anything else so the classifier can index without checks.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn from_landmarks(points: &[Landmark]) -> Result<Self, GestureError> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into()
            .map_err(|_| GestureError::LandmarkCount {
                expected: LANDMARK_COUNT,
                got:      points.len(),
            })?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GestureError::NonFinite { index });
        }
        Ok(LandmarkSet { points })
    }

    /// Build from raw `[x, y, z]` triples, the shape most detectors emit.
    pub fn from_points(points: &[[f32; 3]]) -> Result<Self, GestureError> {
        let landmarks: Vec<Landmark> = points.iter()
            .map(|&[x, y, z]| Landmark::new(x, y, z))
            .collect();
        Self::from_landmarks(&landmarks)
    }

    pub fn get(&self, idx: usize) -> Landmark { self.points[idx] }
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn wrist(&self)     -> Landmark { self.points[index::WRIST] }
    pub fn thumb_tip(&self) -> Landmark { self.points[index::THUMB_TIP] }
    pub fn index_tip(&self) -> Landmark { self.points[index::INDEX_TIP] }

    pub fn to_points(&self) -> Vec<[f32; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Synthesize a plausible upright hand whose index fingertip sits at
    /// `index_tip` (raw camera coordinates).
    ///
    /// Used by the mouse-driven simulator and by tests. Proportions are those
    /// of a hand filling roughly a fifth of the frame height.
    pub fn synthetic(index_tip: (f32, f32), pose: HandPose) -> Self {
        // Offsets from the wrist, fingers pointing up (−y).
        const OPEN: [(f32, f32); LANDMARK_COUNT] = [
            ( 0.000,  0.000),
            (-0.040, -0.030), (-0.070, -0.060), (-0.090, -0.090), (-0.110, -0.110),
            (-0.030, -0.100), (-0.035, -0.140), (-0.037, -0.170), (-0.040, -0.200),
            ( 0.000, -0.110), ( 0.000, -0.155), ( 0.000, -0.185), ( 0.000, -0.215),
            ( 0.025, -0.100), ( 0.030, -0.140), ( 0.032, -0.165), ( 0.035, -0.190),
            ( 0.050, -0.085), ( 0.055, -0.115), ( 0.058, -0.135), ( 0.060, -0.155),
        ];

        let mut offsets = OPEN;
        match pose {
            HandPose::Open => {}
            HandPose::Pinch => {
                // Thumb tip meets the index tip.
                offsets[3]               = (-0.060, -0.160);
                offsets[index::THUMB_TIP] = (-0.050, -0.190);
            }
            HandPose::Fist => {
                offsets[index::THUMB_TIP]  = (-0.090, -0.050);
                offsets[index::INDEX_TIP]  = (-0.030, -0.090);
                offsets[index::MIDDLE_TIP] = ( 0.000, -0.100);
                offsets[index::RING_TIP]   = ( 0.020, -0.090);
                offsets[index::PINKY_TIP]  = ( 0.040, -0.080);
            }
        }

        let (tx, ty) = OPEN[index::INDEX_TIP];
        let wrist = (index_tip.0 - tx, index_tip.1 - ty);
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        for (p, (dx, dy)) in points.iter_mut().zip(offsets.iter()) {
            *p = Landmark::new(wrist.0 + dx, wrist.1 + dy, 0.0);
        }
        LandmarkSet { points }
    }
}

/// Posture used by [`LandmarkSet::synthetic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    Open,
    Pinch,
    Fist,
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the detector reported for one capture frame.
///
/// `hands[0]` is slot 0 (primary), `hands[1]` slot 1. A frame with no hands
/// is meaningful: it tells the engine every hand was lost.
#[derive(Clone, Debug)]
pub struct HandFrame {
    pub timestamp: Instant,
    hands:         Vec<LandmarkSet>,
}

impl HandFrame {
    pub fn new(timestamp: Instant, mut hands: Vec<LandmarkSet>) -> Self {
        if hands.len() > MAX_HANDS {
            debug!(count = hands.len(), "dropping hands beyond slot {}", MAX_HANDS - 1);
            hands.truncate(MAX_HANDS);
        }
        HandFrame { timestamp, hands }
    }

    pub fn empty(timestamp: Instant) -> Self {
        HandFrame { timestamp, hands: Vec::new() }
    }

    pub fn hands(&self) -> &[LandmarkSet] { &self.hands }
    pub fn hand(&self, slot: usize) -> Option<&LandmarkSet> { self.hands.get(slot) }
    pub fn hand_count(&self) -> usize { self.hands.len() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
