//! Orbit controls: the point the camera circles, plus a saved snapshot.

use nalgebra::Point3;

use crate::camera::PerspectiveCamera;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SavedState {
    position: Point3<f32>,
    target:   Point3<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    saved:      Option<SavedState>,
}

impl Default for OrbitControls {
    fn default() -> Self { Self::new(Point3::origin()) }
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        OrbitControls { target, saved: None }
    }

    /// Remember the camera position and target for a later [`reset`](Self::reset).
    pub fn save_state(&mut self, camera: &PerspectiveCamera) {
        self.saved = Some(SavedState { position: camera.position, target: self.target });
    }

    pub fn has_saved_state(&self) -> bool { self.saved.is_some() }

    /// Put the camera back where [`save_state`](Self::save_state) found it.
    /// Returns false when nothing was saved.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) -> bool {
        match self.saved {
            Some(s) => {
                camera.position = s.position;
                self.target = s.target;
                camera.look_at(s.target);
                true
            }
            None => false,
        }
    }

    pub fn discard_saved_state(&mut self) {
        self.saved = None;
    }

    pub fn distance_to_target(&self, camera: &PerspectiveCamera) -> f32 {
        nalgebra::distance(&camera.position, &self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reset() {
        let mut cam = PerspectiveCamera::new(Point3::new(0.0, 0.0, 100.0), Point3::origin(), 60.0, 1.0);
        let mut controls = OrbitControls::default();
        controls.save_state(&cam);

        cam.position = Point3::new(40.0, 10.0, 20.0);
        controls.target = Point3::new(40.0, 10.0, 0.0);
        cam.look_at(controls.target);

        assert!(controls.reset(&mut cam));
        assert_eq!(cam.position, Point3::new(0.0, 0.0, 100.0));
        assert_eq!(controls.target, Point3::origin());
        assert!((cam.forward().z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn reset_without_save_is_refused() {
        let mut cam = PerspectiveCamera::new(Point3::new(0.0, 0.0, 100.0), Point3::origin(), 60.0, 1.0);
        let mut controls = OrbitControls::default();
        assert!(!controls.reset(&mut cam));
    }
}
