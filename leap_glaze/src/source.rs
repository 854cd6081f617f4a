//! Landmark sources: LeapMotion hardware, mouse simulation and trace replay.
//!
//! The public interface is [`SourceMessage`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware, the
//! mouse simulator or a recording.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use pinch_gesture::landmarks::HandPose;
use pinch_gesture::replay::TraceFrame;
use pinch_gesture::{GestureError, HandFrame, LandmarkSet};
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// SourceMessage
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub enum SourceMessage {
    /// One detector frame.
    Frame(HandFrame),

    /// The source cannot continue (e.g. the device failed to open).
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw, sim and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceMessage`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>);
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<SourceMessage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Display-space x back to raw camera x, so the engine's mirroring puts the
/// point where it was drawn.
fn to_raw_x(display_x: f32, mirror_x: bool) -> f32 {
    if mirror_x { 1.0 - display_x } else { display_x }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// # Mapping
///
/// Leap reports joints in millimetres above the device. Each tracked hand is
/// turned into the 21-point layout:
///
/// * wrist = base of the middle metacarpal
/// * thumb = proximal, intermediate and distal joints, then the tip
/// * fingers = MCP, PIP, DIP, tip from the bone joints
///
/// and the interaction box below is scaled to `[0, 1]`, with y flipped so
/// that up on the device is up on screen. Left hands go in slot 0.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    pub mirror_x: bool,
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("cannot create LeapC connection: {e:?}");
                let _ = tx.send(SourceMessage::Quit);
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!("cannot open LeapMotion device: {e:?}");
            let _ = tx.send(SourceMessage::Quit);
            return;
        }
        info!("LeapMotion connected");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let mut hands: Vec<_> = frame.hands().collect();
                hands.sort_by_key(|h| h.hand_type() != HandType::Left);

                let sets: Vec<LandmarkSet> = hands.iter()
                    .filter_map(|h| match leap_landmarks(h, self.mirror_x) {
                        Ok(set) => Some(set),
                        Err(e) => {
                            warn!("dropping Leap hand: {e}");
                            None
                        }
                    })
                    .collect();

                if tx.send(SourceMessage::Frame(HandFrame::new(Instant::now(), sets))).is_err() {
                    return;
                }
            }
        }
    }
}

/// Convert one Leap hand into a landmark set.
#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand, mirror_x: bool) -> Result<LandmarkSet, GestureError> {
    // One joint as `[x, y, z]` millimetres.
    macro_rules! mm {
        ($v:expr) => {{ let v = $v; [v.x, v.y, v.z] }};
    }
    let digits: Vec<_> = hand.digits().collect();
    let Some(middle) = digits.get(2) else {
        return Err(GestureError::LandmarkCount {
            expected: pinch_gesture::LANDMARK_COUNT,
            got:      digits.len() * 4,
        });
    };
    let wrist = mm!(middle.metacarpal().prev_joint());
    let joints: Vec<[[f32; 3]; 4]> = digits.iter()
        .map(|d| [
            mm!(d.proximal().prev_joint()),
            mm!(d.intermediate().prev_joint()),
            mm!(d.distal().prev_joint()),
            mm!(d.distal().next_joint()),
        ])
        .collect();
    landmarks_from_leap_joints(wrist, &joints, mirror_x)
}

// ── Leap millimetres → landmarks ─────────────────────────────────────────────

/// Leap interaction box, millimetres above the device.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
const LEAP_X_RANGE: (f32, f32) = (-200.0, 200.0);
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
const LEAP_Y_RANGE: (f32, f32) = (80.0, 400.0);
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
const LEAP_Z_SCALE: f32 = 400.0;

/// One Leap joint in raw camera space: `[0, 1]` across the interaction box,
/// y flipped so up on the device is up on screen.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
fn leap_to_raw(joint: [f32; 3], mirror_x: bool) -> [f32; 3] {
    let [x, y, z] = joint;
    let nx = (x - LEAP_X_RANGE.0) / (LEAP_X_RANGE.1 - LEAP_X_RANGE.0);
    let ny = 1.0 - (y - LEAP_Y_RANGE.0) / (LEAP_Y_RANGE.1 - LEAP_Y_RANGE.0);
    [to_raw_x(nx, mirror_x), ny, z / LEAP_Z_SCALE]
}

/// The 21-point layout from a wrist and five digits, thumb first. Each digit
/// is `[mcp, pip, dip, tip]` in millimetres.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
fn landmarks_from_leap_joints(
    wrist:    [f32; 3],
    digits:   &[[[f32; 3]; 4]],
    mirror_x: bool,
) -> Result<LandmarkSet, GestureError> {
    let points: Vec<[f32; 3]> = std::iter::once(wrist)
        .chain(digits.iter().flatten().copied())
        .map(|j| leap_to_raw(j, mirror_x))
        .collect();
    LandmarkSet::from_points(&points)
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source driven by [`SimInput`] samples (from the visualizer's window).
///
/// The visualizer sends the pointer state every frame; this translator
/// synthesizes hands from it. Keys other than `F` are handled by the window
/// itself.
///
/// | Input | Hands |
/// |---|---|
/// | Pointer in window | One open hand, index tip under the pointer |
/// | Left button held | That hand pinches |
/// | `F` held | That hand makes a fist |
/// | Right button held | Two pinching hands: one where the drag began, one under the pointer |
/// | Pointer outside window | No hands |
pub struct SimHandSource {
    pub rx:       Receiver<SimInput>,
    /// Must match the engine's `mirror_x`.
    pub mirror_x: bool,
}

/// Pointer sample from the simulation window, in display space (`[0, 1]`,
/// y down). A `None` position means the pointer is outside the view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimInput {
    pub position: Option<(f32, f32)>,
    pub left:     bool,
    pub right:    bool,
    /// `F` held.
    pub fist:     bool,
}

impl SimHandSource {
    /// Hands for one pointer sample. `anchor` is where the current right
    /// drag began.
    fn hands_for(&self, pointer: SimInput, anchor: &mut Option<(f32, f32)>) -> Vec<LandmarkSet> {
        let Some((x, y)) = pointer.position else {
            *anchor = None;
            return Vec::new();
        };
        let raw = |px: f32, py: f32, pose| LandmarkSet::synthetic((to_raw_x(px, self.mirror_x), py), pose);

        if pointer.right {
            let (ax, ay) = *anchor.get_or_insert((x, y));
            return vec![raw(ax, ay, HandPose::Pinch), raw(x, y, HandPose::Pinch)];
        }
        *anchor = None;

        let pose = if pointer.fist {
            HandPose::Fist
        } else if pointer.left {
            HandPose::Pinch
        } else {
            HandPose::Open
        };
        vec![raw(x, y, pose)]
    }
}

impl LandmarkSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        let mut anchor = None;
        for input in &self.rx {
            let frame = HandFrame::new(Instant::now(), self.hands_for(input, &mut anchor));
            if tx.send(SourceMessage::Frame(frame)).is_err() { return; }
        }
        debug!("simulation window closed");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource: recorded traces
// ════════════════════════════════════════════════════════════════════════════

/// Plays a recorded landmark trace, paced by its timestamps.
pub struct ReplaySource {
    pub frames: Vec<TraceFrame>,
    /// Sleep between frames to match the recording. Off for tests.
    pub paced:  bool,
}

impl LandmarkSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<SourceMessage>) {
        let start = Instant::now();
        info!(frames = self.frames.len(), "replay started");

        for tf in &self.frames {
            if self.paced {
                let due = start + Duration::from_millis(tf.t_ms);
                let now = Instant::now();
                if due > now { thread::sleep(due - now); }
            }
            let frame = match tf.to_hand_frame(start) {
                Ok(f) => f,
                Err(e) => {
                    warn!(t_ms = tf.t_ms, "skipping frame: {e}");
                    continue;
                }
            };
            if tx.send(SourceMessage::Frame(frame)).is_err() { return; }
        }
        debug!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_gesture::{classify, GestureConfig};

    fn sim() -> (Sender<SimInput>, Receiver<SourceMessage>) {
        let (tx, rx) = mpsc::channel();
        let out = spawn_landmark_source(SimHandSource { rx, mirror_x: true });
        (tx, out)
    }

    fn frame(rx: &Receiver<SourceMessage>) -> HandFrame {
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(SourceMessage::Frame(f)) => f,
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn left_button_pinches_under_pointer() {
        let (tx, rx) = sim();
        tx.send(SimInput { position: Some((0.3, 0.6)), left: true, ..Default::default() }).unwrap();
        let f = frame(&rx);
        assert_eq!(f.hand_count(), 1);

        let signal = classify(f.hand(0).unwrap(), &GestureConfig::default());
        assert!(signal.is_pinched);
        assert!((signal.pinch_point.x - 0.3).abs() < 1e-5);
        assert!((signal.pinch_point.y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn right_drag_makes_two_hands_from_anchor() {
        let (tx, rx) = sim();
        let drag = |x| SimInput { position: Some((x, 0.5)), right: true, ..Default::default() };
        tx.send(drag(0.4)).unwrap();
        tx.send(drag(0.7)).unwrap();
        frame(&rx);
        let f = frame(&rx);
        assert_eq!(f.hand_count(), 2);

        let cfg = GestureConfig::default();
        let a = classify(f.hand(0).unwrap(), &cfg);
        let b = classify(f.hand(1).unwrap(), &cfg);
        assert!(a.is_pinched && b.is_pinched);
        assert!((a.pinch_point.x - 0.4).abs() < 1e-5);
        assert!((b.pinch_point.x - 0.7).abs() < 1e-5);
    }

    #[test]
    fn pointer_outside_means_no_hands() {
        let (tx, rx) = sim();
        tx.send(SimInput::default()).unwrap();
        assert_eq!(frame(&rx).hand_count(), 0);
    }

    #[test]
    fn fist_key_overrides_pinch() {
        let (tx, rx) = sim();
        tx.send(SimInput { position: Some((0.5, 0.5)), left: true, fist: true, ..Default::default() }).unwrap();
        let signal = classify(frame(&rx).hand(0).unwrap(), &GestureConfig::default());
        assert!(signal.is_fisted);
        assert!(!signal.is_pinched);
    }

    #[test]
    fn closing_window_ends_source() {
        let (tx, rx) = sim();
        drop(tx);
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_err());
    }

    /// Five straight digits fanned across x, tips 100 mm above the wrist.
    fn leap_digits() -> Vec<[[f32; 3]; 4]> {
        (0..5).map(|d| {
            let x = -80.0 + 40.0 * d as f32;
            [[x, 160.0, 0.0], [x, 190.0, 0.0], [x, 215.0, 0.0], [x, 240.0, 0.0]]
        }).collect()
    }

    #[test]
    fn leap_box_maps_to_unit_square() {
        assert_eq!(leap_to_raw([-200.0, 400.0, 0.0], false), [0.0, 0.0, 0.0]);
        assert_eq!(leap_to_raw([200.0, 80.0, 200.0], false), [1.0, 1.0, 0.5]);
        assert_eq!(leap_to_raw([-200.0, 240.0, 0.0], true), [1.0, 0.5, 0.0]);
    }

    #[test]
    fn leap_joints_fill_landmark_order() {
        let set = landmarks_from_leap_joints([0.0, 140.0, 0.0], &leap_digits(), false).unwrap();
        let wrist = set.wrist();
        assert!((wrist.x - 0.5).abs() < 1e-6);
        assert!((wrist.y - (1.0 - 60.0 / 320.0)).abs() < 1e-6);

        // Thumb tip is the first digit's tip, index tip the second's.
        assert!((set.thumb_tip().x - 0.3).abs() < 1e-6);
        assert!((set.index_tip().x - 0.4).abs() < 1e-6);
        assert!((set.index_tip().y - 0.5).abs() < 1e-6);
        let pinky = set.get(pinch_gesture::landmarks::index::PINKY_TIP);
        assert!((pinky.x - 0.7).abs() < 1e-6);
    }

    #[test]
    fn leap_hand_missing_a_digit_is_rejected() {
        let digits = &leap_digits()[..4];
        match landmarks_from_leap_joints([0.0, 140.0, 0.0], digits, true) {
            Err(GestureError::LandmarkCount { expected: 21, got: 17 }) => {}
            other => panic!("expected a landmark count error, got {other:?}"),
        }
    }

    #[test]
    fn replay_skips_bad_frames() {
        let frames = vec![
            TraceFrame { t_ms: 0,  hands: vec![] },
            TraceFrame { t_ms: 10, hands: vec![vec![[0.5, 0.5, 0.0]; 3]] },
            TraceFrame { t_ms: 20, hands: vec![] },
        ];
        let rx = spawn_landmark_source(ReplaySource { frames, paced: false });
        let got: Vec<_> = rx.iter().collect();
        assert_eq!(got.len(), 2);
    }
}
