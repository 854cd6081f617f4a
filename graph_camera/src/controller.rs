//! Gesture events → camera motion.
//!
//! | Event | Handles needed | Effect |
//! |---|---|---|
//! | `Hover` | camera, scene | pick; report [`HoverChange`] |
//! | `Action` | camera, scene | transition to hit node or along gaze |
//! | `TwoHandPinch` start | camera, controls | `save_state` |
//! | `TwoHandPinch` move | camera, controls | dolly + pan, immediate |
//! | `TwoHandPinch` end | controls | drop the snapshot, stay put |
//!
//! A missing handle turns the event into a logged no-op; the next event is
//! handled normally.

use std::path::Path;
use std::time::Duration;

use nalgebra::{Point3, Unit, Vector3};
use pinch_gesture::{GestureEvent, Point2, TwoHandPhase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::camera::PerspectiveCamera;
use crate::error::SceneError;
use crate::handles::{CameraCommand, RenderHandles};
use crate::raycast::{pick, Hit};
use crate::scene::Scene;

// ════════════════════════════════════════════════════════════════════════════
// CameraConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera distance from a node after a single action.
    pub single_distance: f32,
    /// Camera distance from a node after a double action.
    pub double_distance: f32,
    pub single_duration_ms: u64,
    pub double_duration_ms: u64,
    /// Side of the node the camera ends up on. Normalized on use.
    pub approach_direction: [f32; 3],
    /// How far along the gaze a missed action aims.
    pub fallback_depth: f32,
    /// World units of dolly per unit of hand spread.
    pub zoom_sensitivity: f32,
    /// World units of pan per unit of centroid motion at the reference
    /// distance.
    pub pan_sensitivity: f32,
    pub pan_reference_distance: f32,
    pub pan_scale_min: f32,
    pub pan_scale_max: f32,
    /// Dolly never brings the camera closer than this to the orbit target.
    pub min_target_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            single_distance:        60.0,
            double_distance:        150.0,
            single_duration_ms:     400,
            double_duration_ms:     1000,
            approach_direction:     [0.0, 0.0, 1.0],
            fallback_depth:         200.0,
            zoom_sensitivity:       600.0,
            pan_sensitivity:        300.0,
            pan_reference_distance: 300.0,
            pan_scale_min:          0.2,
            pan_scale_max:          4.0,
            min_target_distance:    5.0,
        }
    }
}

impl CameraConfig {
    pub fn from_json(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: CameraConfig = serde_json::from_str(&text).map_err(|source| SceneError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let positive = [
            ("single_distance",        self.single_distance),
            ("double_distance",        self.double_distance),
            ("fallback_depth",         self.fallback_depth),
            ("zoom_sensitivity",       self.zoom_sensitivity),
            ("pan_sensitivity",        self.pan_sensitivity),
            ("pan_reference_distance", self.pan_reference_distance),
            ("pan_scale_min",          self.pan_scale_min),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(SceneError::InvalidConfig(format!("{name} must be positive, got {v}")));
            }
        }
        if !(self.pan_scale_max.is_finite() && self.pan_scale_max >= self.pan_scale_min) {
            return Err(SceneError::InvalidConfig(format!(
                "pan_scale_max ({}) must be at least pan_scale_min ({})",
                self.pan_scale_max, self.pan_scale_min
            )));
        }
        if !(self.min_target_distance.is_finite() && self.min_target_distance >= 0.0) {
            return Err(SceneError::InvalidConfig(format!(
                "min_target_distance must be non-negative, got {}", self.min_target_distance
            )));
        }
        let dir = Vector3::from(self.approach_direction);
        if !dir.iter().all(|c| c.is_finite()) || dir.norm_squared() < 1e-12 {
            return Err(SceneError::InvalidConfig("approach_direction must be a non-zero vector".into()));
        }
        Ok(())
    }

    fn approach(&self) -> Unit<Vector3<f32>> {
        Unit::try_new(Vector3::from(self.approach_direction), 1e-6)
            .unwrap_or_else(Vector3::z_axis)
    }

    fn snap(&self, double: bool) -> (f32, Duration) {
        if double {
            (self.double_distance, Duration::from_millis(self.double_duration_ms))
        } else {
            (self.single_distance, Duration::from_millis(self.single_duration_ms))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcomes
// ════════════════════════════════════════════════════════════════════════════

/// Change in the node under a hovering hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverChange {
    Entered(String),
    Left,
    Unchanged,
}

/// What [`CameraController::handle`] did with an event.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerOutcome {
    Hover(HoverChange),
    /// Action issued a transition; `target` is the hit node id, or `None`
    /// for the gaze fallback.
    Transition { target: Option<String>, command: CameraCommand },
    GestureStarted,
    /// Two-hand move applied. Either part may be zero.
    Moved { translate_z: f32, pan: Vector3<f32> },
    GestureEnded,
    /// A handle was missing.
    Ignored,
}

// ════════════════════════════════════════════════════════════════════════════
// CameraController
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct CameraController {
    config:  CameraConfig,
    hovered: Option<String>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        CameraController { config, hovered: None }
    }

    pub fn config(&self) -> &CameraConfig { &self.config }

    /// Node currently under the hovering hand.
    pub fn hovered(&self) -> Option<&str> { self.hovered.as_deref() }

    /// Forget the hovered node, e.g. after a grace period without hover.
    pub fn clear_hover(&mut self) -> HoverChange {
        match self.hovered.take() {
            Some(_) => HoverChange::Left,
            None => HoverChange::Unchanged,
        }
    }

    pub fn handle(&mut self, handles: &mut dyn RenderHandles, event: &GestureEvent) -> ControllerOutcome {
        match *event {
            GestureEvent::Hover { point } => self.on_hover(&*handles, point),
            GestureEvent::Action { point, double } => self.on_action(handles, point, double),
            GestureEvent::TwoHandPinch { phase, .. } => match phase {
                TwoHandPhase::Start => self.on_two_hand_start(handles),
                TwoHandPhase::Move { delta_distance, delta_centroid } => {
                    self.on_two_hand_move(handles, delta_distance, delta_centroid)
                }
                TwoHandPhase::End => self.on_two_hand_end(handles),
            },
        }
    }

    // ── hover ──

    fn on_hover(&mut self, handles: &dyn RenderHandles, point: Point2) -> ControllerOutcome {
        let (Some(camera), Some(scene)) = (handles.camera(), handles.scene()) else {
            warn!("hover ignored: camera or scene not ready");
            return ControllerOutcome::Ignored;
        };
        let hit = pick(&camera.ray_through(point), scene).map(|h| h.id);

        let change = match (&self.hovered, &hit) {
            (Some(prev), Some(id)) if prev == id => HoverChange::Unchanged,
            (_, Some(id)) => HoverChange::Entered(id.clone()),
            (Some(_), None) => HoverChange::Left,
            (None, None) => HoverChange::Unchanged,
        };
        if change != HoverChange::Unchanged {
            debug!(?change, "hover target changed");
        }
        self.hovered = hit;
        ControllerOutcome::Hover(change)
    }

    // ── action ──

    fn on_action(&mut self, handles: &mut dyn RenderHandles, point: Point2, double: bool) -> ControllerOutcome {
        let (Some(camera), Some(scene)) = (handles.camera(), handles.scene()) else {
            warn!("action ignored: camera or scene not ready");
            return ControllerOutcome::Ignored;
        };
        let (hit, command) = self.action_command(camera, scene, point, double);
        let camera = *camera;

        let target = hit.map(|h| h.id);
        match &target {
            Some(id) => info!(node = %id, double, "focusing node"),
            None => info!(double, "action missed; moving along gaze"),
        }
        let (position, look_at, duration) = command.resolve(&camera, camera.position);
        handles.camera_position(position, look_at, duration);
        ControllerOutcome::Transition { target, command }
    }

    /// Transition for an action at `point`, plus the node hit if any.
    pub fn action_command(
        &self,
        camera: &PerspectiveCamera,
        scene: &Scene,
        point: Point2,
        double: bool,
    ) -> (Option<Hit>, CameraCommand) {
        let (distance, duration) = self.config.snap(double);
        let hit = pick(&camera.ray_through(point), scene);
        let (position, look_at) = match &hit {
            Some(h) => {
                let node = scene.nodes()[h.index].position;
                (node + self.config.approach().into_inner() * distance, node)
            }
            None => {
                let look_at = camera.position + camera.forward().into_inner() * self.config.fallback_depth;
                (standoff(look_at, camera, distance), look_at)
            }
        };
        (hit, CameraCommand::Transition { position, look_at, duration })
    }

    // ── two hands ──

    fn on_two_hand_start(&mut self, handles: &mut dyn RenderHandles) -> ControllerOutcome {
        let Some(camera) = handles.camera().copied() else {
            warn!("two-hand start ignored: no camera");
            return ControllerOutcome::Ignored;
        };
        let Some(controls) = handles.controls() else {
            warn!("two-hand start ignored: no controls");
            return ControllerOutcome::Ignored;
        };
        controls.save_state(&camera);
        debug!("two-hand gesture started; camera state saved");
        ControllerOutcome::GestureStarted
    }

    fn on_two_hand_move(
        &mut self,
        handles: &mut dyn RenderHandles,
        delta_distance: f32,
        delta_centroid: Point2,
    ) -> ControllerOutcome {
        let Some(camera) = handles.camera().copied() else {
            warn!("two-hand move ignored: no camera");
            return ControllerOutcome::Ignored;
        };
        let Some((target, distance)) = handles.controls()
            .map(|c| (c.target, c.distance_to_target(&camera)))
        else {
            warn!("two-hand move ignored: no controls");
            return ControllerOutcome::Ignored;
        };

        let dolly = self.dolly_command(delta_distance, distance);
        if let Some(cmd) = dolly {
            cmd.apply(handles, target);
        }

        let pan = self.pan_command(&camera, delta_centroid, distance);
        if let Some(cmd) = pan {
            cmd.apply(handles, target);
        }

        ControllerOutcome::Moved {
            translate_z: match dolly {
                Some(CameraCommand::Dolly { translate_z }) => translate_z,
                _ => 0.0,
            },
            pan: match pan {
                Some(CameraCommand::Translate { delta }) => delta,
                _ => Vector3::zeros(),
            },
        }
    }

    /// Dolly for one frame of hand spread. Spreading moves in. `None` when
    /// there is nothing to do.
    pub fn dolly_command(&self, delta_distance: f32, distance_to_target: f32) -> Option<CameraCommand> {
        let mut forward = delta_distance * self.config.zoom_sensitivity;
        if forward > 0.0 {
            let room = (distance_to_target - self.config.min_target_distance).max(0.0);
            forward = forward.min(room);
        }
        if forward == 0.0 || !forward.is_finite() {
            return None;
        }
        Some(CameraCommand::Dolly { translate_z: -forward })
    }

    /// Pan for one frame of centroid motion. The camera moves against the
    /// hands so the scene follows them.
    pub fn pan_command(
        &self,
        camera: &PerspectiveCamera,
        delta_centroid: Point2,
        distance_to_target: f32,
    ) -> Option<CameraCommand> {
        if delta_centroid == Point2::default() || !delta_centroid.is_finite() {
            return None;
        }
        let cfg = &self.config;
        let scale = cfg.pan_sensitivity
            * (distance_to_target / cfg.pan_reference_distance).clamp(cfg.pan_scale_min, cfg.pan_scale_max);
        let delta = (camera.right().into_inner() * -delta_centroid.x
            + camera.up().into_inner() * delta_centroid.y) * scale;
        Some(CameraCommand::Translate { delta })
    }

    fn on_two_hand_end(&mut self, handles: &mut dyn RenderHandles) -> ControllerOutcome {
        let Some(controls) = handles.controls() else {
            warn!("two-hand end ignored: no controls");
            return ControllerOutcome::Ignored;
        };
        controls.discard_saved_state();
        debug!("two-hand gesture ended");
        ControllerOutcome::GestureEnded
    }
}

/// Camera position that keeps `target` at `distance` straight ahead.
pub fn standoff(target: Point3<f32>, camera: &PerspectiveCamera, distance: f32) -> Point3<f32> {
    target - camera.forward().into_inner() * distance
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
