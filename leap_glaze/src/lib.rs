//! # leap_glaze
//!
//! Hands-free explorer for a 3D node-link graph. Hand landmarks go through
//! [`pinch_gesture`]; the resulting events move the camera through
//! [`graph_camera`].
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Pinch and hold still | One | Highlight the node under the fingertips (lime) |
//! | Pinch held ≥ 150 ms | One | Glide to the node, or forward along the gaze on a miss |
//! | Two pinches within 500 ms | One | Glide to the node from further out |
//! | Pinch both hands, spread / close | Both | Dolly in / out |
//! | Pinch both hands, move together | Both | Pan |
//!
//! ## Visualization
//!
//! The scene is projected through the host camera and drawn far to near.
//! Labels shrink with camera distance and, far away, only central nodes keep
//! one. Detected hands are drawn over the scene with thumb and index tips
//! enlarged, yellow while pinched.
//!
//! ## Feature flags
//!
//! * (default) **Simulation mode**: the mouse stands in for a hand.
//! * `leap` **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Gesture |
//! |---|---|
//! | Move | Open hand under the pointer |
//! | Left button | Pinch |
//! | `F` | Fist |
//! | Right drag | Two pinching hands: drag start and pointer |
//! | `R` | Fit the whole scene |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod source;
pub mod visualizer;
