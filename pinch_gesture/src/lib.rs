//! # pinch_gesture
//!
//! Turns a per-frame stream of hand landmarks into clean gesture events.
//!
//! ```text
//! HandFrame ──► classifier ──┬──► debounce (per slot) ──► Action { point, double }
//!                            ├──► hover channel       ──► Hover  { point }
//!                            └──► two-hand tracker    ──► TwoHandPinch { hand0, hand1, phase }
//! ```
//!
//! ## Gesture → Event mapping
//!
//! | Gesture | Hands | Event |
//! |---|---|---|
//! | Pinch held (thumb + index tips together) | One | `Hover` every frame |
//! | Trigger held ≥ `min_hold_ms` | Either | `Action { double: false }` |
//! | Second trigger within `double_window_ms` | Either | `Action { double: true }` |
//! | Both hands pinched | Both | `TwoHandPinch` start → move… → end |
//!
//! The trigger is the pinch by default; [`ActionTrigger::Fist`] binds
//! actions to a closed fist instead.
//!
//! All timing is driven by the timestamps carried in each [`HandFrame`], so
//! the engine is deterministic and has no timers or threads of its own.

pub mod classifier;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod event;
pub mod hover;
pub mod landmarks;
pub mod replay;
pub mod two_hand;

pub use classifier::{classify, HandSignal};
pub use config::{ActionTrigger, GestureConfig};
pub use debounce::{DebounceMachine, DebounceState};
pub use engine::GestureEngine;
pub use error::GestureError;
pub use event::{GestureEvent, Point2, TwoHandPhase};
pub use landmarks::{HandFrame, Landmark, LandmarkSet, LANDMARK_COUNT};
pub use two_hand::TwoHandTracker;

/// Crate version, reported by the binaries on startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
