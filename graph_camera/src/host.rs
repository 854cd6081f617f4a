//! In-process [`RenderHandles`] implementation.
//!
//! `SceneHost` owns the camera, scene and orbit controls the visualizer
//! draws from, and plays out smoothed camera transitions when ticked. Each
//! handle starts absent and is installed once it exists, the same way a
//! renderer comes up piece by piece.

use std::time::{Duration, Instant};

use nalgebra::Point3;
use tracing::{debug, warn};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::handles::RenderHandles;
use crate::scene::Scene;

/// Margin applied when framing the whole scene.
const FIT_PADDING: f32 = 1.2;

// ════════════════════════════════════════════════════════════════════════════
// CameraTransition
// ════════════════════════════════════════════════════════════════════════════

/// A pending glide between two poses. The clock starts on the first tick
/// after it is requested, so a transition issued mid-frame never skips ahead.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CameraTransition {
    from_position: Point3<f32>,
    from_look_at:  Point3<f32>,
    to_position:   Point3<f32>,
    to_look_at:    Point3<f32>,
    duration:      Duration,
    started:       Option<Instant>,
}

impl CameraTransition {
    /// Fraction of the move done at `now`, eased.
    fn progress(&mut self, now: Instant) -> f32 {
        let started = *self.started.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started).as_secs_f32();
        let t = (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        ease_out_quad(t)
    }
}

pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

// ════════════════════════════════════════════════════════════════════════════
// SceneHost
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct SceneHost {
    camera:     Option<PerspectiveCamera>,
    scene:      Option<Scene>,
    controls:   Option<OrbitControls>,
    transition: Option<CameraTransition>,
}

impl SceneHost {
    /// A host with nothing installed yet.
    pub fn new() -> Self { Self::default() }

    /// A fully populated host: camera framing the scene, controls on the
    /// origin.
    pub fn with_scene(scene: Scene, fov_y_deg: f32, aspect: f32) -> Self {
        let mut host = SceneHost {
            camera:     Some(PerspectiveCamera::new(Point3::new(0.0, 0.0, 1.0), Point3::origin(), fov_y_deg, aspect)),
            scene:      Some(scene),
            controls:   Some(OrbitControls::default()),
            transition: None,
        };
        host.zoom_to_fit(Duration::ZERO);
        host
    }

    pub fn set_camera(&mut self, camera: PerspectiveCamera) {
        self.camera = Some(camera);
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = Some(scene);
    }

    pub fn set_controls(&mut self, controls: OrbitControls) {
        self.controls = Some(controls);
    }

    /// Merge a scene fragment into the current scene, or install it if
    /// there is none yet. Returns `(nodes_added, links_added)`.
    pub fn merge_scene(&mut self, fragment: Scene) -> (usize, usize) {
        match &mut self.scene {
            Some(scene) => scene.merge(fragment),
            None => {
                let counts = (fragment.nodes().len(), fragment.links().len());
                self.scene = Some(fragment);
                counts
            }
        }
    }

    /// Viewport resized.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Some(cam) = &mut self.camera {
            cam.aspect = aspect;
        }
    }

    pub fn orbit_target(&self) -> Option<Point3<f32>> {
        self.controls.as_ref().map(|c| c.target)
    }

    pub fn is_transitioning(&self) -> bool { self.transition.is_some() }

    /// Back the camera off along +z until the whole scene fits the vertical
    /// field of view.
    pub fn zoom_to_fit(&mut self, duration: Duration) {
        let (Some(cam), Some(scene)) = (self.camera, self.scene.as_ref()) else {
            warn!("zoom_to_fit skipped: camera or scene not ready");
            return;
        };
        let radius = scene.bounding_radius().max(1.0);
        let half_fov = (cam.fov_y_deg.to_radians() * 0.5).max(1e-3);
        let dist = radius / half_fov.sin() * FIT_PADDING;
        self.camera_position(Point3::new(0.0, 0.0, dist), Point3::origin(), duration);
    }

    /// Advance any transition in flight. Returns true while the camera is
    /// still moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(mut tr) = self.transition else { return false; };
        let k = tr.progress(now);
        let position = tr.from_position + (tr.to_position - tr.from_position) * k;
        let look_at  = tr.from_look_at + (tr.to_look_at - tr.from_look_at) * k;
        self.place(position, look_at);

        if k >= 1.0 {
            debug!("camera transition finished");
            self.transition = None;
            false
        } else {
            self.transition = Some(tr);
            true
        }
    }

    fn place(&mut self, position: Point3<f32>, look_at: Point3<f32>) {
        if let Some(cam) = &mut self.camera {
            cam.position = position;
            cam.look_at(look_at);
        }
        if let Some(controls) = &mut self.controls {
            controls.target = look_at;
        }
    }
}

impl RenderHandles for SceneHost {
    fn camera(&self) -> Option<&PerspectiveCamera> { self.camera.as_ref() }

    fn scene(&self) -> Option<&Scene> { self.scene.as_ref() }

    fn controls(&mut self) -> Option<&mut OrbitControls> { self.controls.as_mut() }

    fn camera_position(&mut self, position: Point3<f32>, look_at: Point3<f32>, duration: Duration) {
        let Some(cam) = self.camera else {
            warn!("camera_position ignored: no camera");
            return;
        };
        if duration.is_zero() {
            self.transition = None;
            self.place(position, look_at);
            return;
        }
        let from_look_at = self.orbit_target()
            .unwrap_or_else(|| cam.position + cam.forward().into_inner());
        self.transition = Some(CameraTransition {
            from_position: cam.position,
            from_look_at,
            to_position:   position,
            to_look_at:    look_at,
            duration,
            started:       None,
        });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    fn host() -> SceneHost {
        let scene = Scene::from_nodes(vec![
            SceneNode::new("a", Point3::new(-30.0, 0.0, 0.0)),
            SceneNode::new("b", Point3::new(30.0, 0.0, 0.0)),
        ]).unwrap();
        SceneHost::with_scene(scene, 60.0, 1.0)
    }

    #[test]
    fn ease_endpoints() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert!((ease_out_quad(0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn immediate_move_syncs_target() {
        let mut h = host();
        h.camera_position(Point3::new(10.0, 0.0, 50.0), Point3::new(10.0, 0.0, 0.0), Duration::ZERO);
        assert_eq!(h.camera().unwrap().position, Point3::new(10.0, 0.0, 50.0));
        assert_eq!(h.orbit_target(), Some(Point3::new(10.0, 0.0, 0.0)));
        assert!(!h.is_transitioning());
    }

    #[test]
    fn transition_starts_on_first_tick_and_eases() {
        let mut h = host();
        let start = h.camera().unwrap().position;
        let goal = Point3::new(0.0, 0.0, 10.0);
        h.camera_position(goal, Point3::origin(), Duration::from_millis(400));
        assert_eq!(h.camera().unwrap().position, start);

        let t0 = Instant::now();
        assert!(h.tick(t0));
        assert_eq!(h.camera().unwrap().position, start);

        assert!(h.tick(t0 + Duration::from_millis(200)));
        let mid = start + (goal - start) * 0.75;
        assert!((h.camera().unwrap().position - mid).norm() < 1e-3);

        assert!(!h.tick(t0 + Duration::from_millis(400)));
        assert_eq!(h.camera().unwrap().position, goal);
        assert!(!h.is_transitioning());
    }

    #[test]
    fn immediate_move_cancels_transition() {
        let mut h = host();
        h.camera_position(Point3::new(0.0, 0.0, 10.0), Point3::origin(), Duration::from_millis(400));
        h.camera_position(Point3::new(0.0, 0.0, 90.0), Point3::origin(), Duration::ZERO);
        assert!(!h.tick(Instant::now()));
        assert_eq!(h.camera().unwrap().position, Point3::new(0.0, 0.0, 90.0));
    }

    #[test]
    fn zoom_to_fit_frames_scene() {
        let h = host();
        let cam = h.camera().unwrap();
        let r = h.scene().unwrap().bounding_radius();
        assert!(cam.position.z > r);
        assert!(cam.forward().z < -0.999);
    }

    #[test]
    fn empty_host_ignores_moves() {
        let mut h = SceneHost::new();
        h.camera_position(Point3::new(1.0, 2.0, 3.0), Point3::origin(), Duration::ZERO);
        assert!(h.camera().is_none());
        assert!(!h.tick(Instant::now()));
    }

    #[test]
    fn controller_comes_alive_as_handles_are_installed() {
        use crate::controller::{CameraController, ControllerOutcome};
        use pinch_gesture::{GestureEvent, Point2, TwoHandPhase};

        let action = GestureEvent::Action { point: Point2::new(0.5, 0.5), double: false };
        let start = GestureEvent::TwoHandPinch {
            hand0: Point2::new(0.4, 0.5),
            hand1: Point2::new(0.6, 0.5),
            phase: TwoHandPhase::Start,
        };
        let mut h = SceneHost::new();
        let mut ctl = CameraController::default();
        assert_eq!(ctl.handle(&mut h, &action), ControllerOutcome::Ignored);

        h.set_camera(PerspectiveCamera::new(Point3::new(0.0, 0.0, 200.0), Point3::origin(), 60.0, 1.0));
        assert_eq!(ctl.handle(&mut h, &action), ControllerOutcome::Ignored);

        h.set_scene(Scene::from_nodes(vec![SceneNode::new("hub", Point3::origin())]).unwrap());
        match ctl.handle(&mut h, &action) {
            ControllerOutcome::Transition { target, .. } => assert_eq!(target.as_deref(), Some("hub")),
            other => panic!("expected a transition, got {other:?}"),
        }
        assert!(h.is_transitioning());

        assert_eq!(ctl.handle(&mut h, &start), ControllerOutcome::Ignored);
        h.set_controls(OrbitControls::new(Point3::origin()));
        assert_eq!(ctl.handle(&mut h, &start), ControllerOutcome::GestureStarted);
        assert!(h.controls().unwrap().has_saved_state());
    }

    #[test]
    fn merge_installs_when_empty() {
        let mut h = SceneHost::new();
        let frag = Scene::from_nodes(vec![SceneNode::new("x", Point3::origin())]).unwrap();
        assert_eq!(h.merge_scene(frag), (1, 0));
        assert!(h.scene().is_some());
    }
}
