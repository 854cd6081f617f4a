//! The renderer-facing capability boundary.

use std::time::Duration;

use nalgebra::{Point3, Vector3};

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::scene::Scene;

/// What the controller may ask of the renderer. Any handle may be missing
/// (e.g. before the first frame is drawn); callers treat `None` as "skip".
pub trait RenderHandles {
    /// The active camera.
    fn camera(&self) -> Option<&PerspectiveCamera>;

    /// Root of the pickable scene.
    fn scene(&self) -> Option<&Scene>;

    /// Orbit controls, for saving and restoring camera state.
    fn controls(&mut self) -> Option<&mut OrbitControls>;

    /// Move the camera to `position` facing `look_at` over `duration`.
    /// A zero duration applies immediately and cancels any transition in
    /// flight.
    fn camera_position(&mut self, position: Point3<f32>, look_at: Point3<f32>, duration: Duration);
}

/// A camera change computed by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraCommand {
    /// Smoothed move to an absolute pose.
    Transition {
        position: Point3<f32>,
        look_at:  Point3<f32>,
        duration: Duration,
    },
    /// Translate along the camera's local z axis, which points away from
    /// the gaze: negative moves in, positive backs out.
    Dolly { translate_z: f32 },
    /// Move camera and orbit target together.
    Translate { delta: Vector3<f32> },
}

impl CameraCommand {
    /// Absolute pose this command leads to, from the given camera and orbit
    /// target.
    pub fn resolve(
        &self,
        camera: &PerspectiveCamera,
        target: Point3<f32>,
    ) -> (Point3<f32>, Point3<f32>, Duration) {
        match *self {
            CameraCommand::Transition { position, look_at, duration } => (position, look_at, duration),
            CameraCommand::Dolly { translate_z } => (
                camera.position - camera.forward().into_inner() * translate_z,
                target,
                Duration::ZERO,
            ),
            CameraCommand::Translate { delta } => (camera.position + delta, target + delta, Duration::ZERO),
        }
    }

    /// Send the command through the handles.
    pub fn apply(&self, handles: &mut dyn RenderHandles, target: Point3<f32>) -> bool {
        let Some(camera) = handles.camera().copied() else { return false; };
        let (position, look_at, duration) = self.resolve(&camera, target);
        handles.camera_position(position, look_at, duration);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dolly_moves_along_gaze_and_keeps_target() {
        let cam = PerspectiveCamera::new(Point3::new(0.0, 0.0, 100.0), Point3::origin(), 60.0, 1.0);
        let (pos, look, dur) = CameraCommand::Dolly { translate_z: -30.0 }.resolve(&cam, Point3::origin());
        assert!((pos.z - 70.0).abs() < 1e-4);
        assert_eq!(look, Point3::origin());
        assert_eq!(dur, Duration::ZERO);
    }

    #[test]
    fn translate_carries_target() {
        let cam = PerspectiveCamera::new(Point3::new(0.0, 0.0, 100.0), Point3::origin(), 60.0, 1.0);
        let delta = Vector3::new(5.0, -2.0, 0.0);
        let (pos, look, _) = CameraCommand::Translate { delta }.resolve(&cam, Point3::origin());
        assert_eq!(pos, Point3::new(5.0, -2.0, 100.0));
        assert_eq!(look, Point3::new(5.0, -2.0, 0.0));
    }
}
