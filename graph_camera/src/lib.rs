//! # graph_camera
//!
//! Camera navigation for a 3D node-link scene, driven by
//! [`pinch_gesture::GestureEvent`]s.
//!
//! ## Event → camera mapping
//!
//! | Event | Effect |
//! |---|---|
//! | `Hover` | Ray-cast the point; report which node (if any) is targeted |
//! | `Action` | Glide to the hit node (60 units away, 400 ms) |
//! | `Action` (double) | Glide to the hit node (150 units away, 1000 ms) |
//! | `Action` on empty space | Glide forward along the current gaze |
//! | `TwoHandPinch` move | Spread/close hands to dolly, move both hands to pan |
//!
//! The controller never owns the renderer. It talks to it through the
//! [`RenderHandles`] trait; [`SceneHost`] is the in-process implementation
//! used by the visualizer and tests.

pub mod camera;
pub mod controller;
pub mod controls;
pub mod error;
pub mod handles;
pub mod host;
pub mod labels;
pub mod raycast;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use controller::{CameraConfig, CameraController, ControllerOutcome, HoverChange};
pub use controls::OrbitControls;
pub use error::SceneError;
pub use handles::{CameraCommand, RenderHandles};
pub use host::SceneHost;
pub use labels::{LabelLod, LabelStyle};
pub use raycast::{pick, Hit, Ray};
pub use scene::{Scene, SceneLink, SceneNode};
