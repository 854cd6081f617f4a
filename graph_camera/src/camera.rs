//! Perspective camera: position, gaze and projection.
//!
//! World space is right-handed with +y up. The camera looks along
//! `forward`; `right` and `up` complete an orthonormal basis with the
//! world +y axis as reference.

use nalgebra::{Point3, Unit, Vector3};
use pinch_gesture::Point2;

use crate::raycast::Ray;

/// A point projected into normalized device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub ndc_x: f32,
    pub ndc_y: f32,
    /// Distance along the gaze axis.
    pub depth: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position:  Point3<f32>,
    forward:       Unit<Vector3<f32>>,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Width / height.
    pub aspect:    f32,
    pub near:      f32,
    pub far:       f32,
}

impl PerspectiveCamera {
    pub fn new(position: Point3<f32>, look_at: Point3<f32>, fov_y_deg: f32, aspect: f32) -> Self {
        let mut cam = PerspectiveCamera {
            position,
            forward: -Vector3::z_axis(),
            fov_y_deg,
            aspect,
            near: 0.1,
            far:  10_000.0,
        };
        cam.look_at(look_at);
        cam
    }

    pub fn forward(&self) -> Unit<Vector3<f32>> { self.forward }

    pub fn right(&self) -> Unit<Vector3<f32>> {
        let r = self.forward.cross(&Vector3::y());
        if r.norm_squared() < 1e-8 {
            // Looking straight up or down.
            Vector3::x_axis()
        } else {
            Unit::new_normalize(r)
        }
    }

    pub fn up(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.right().cross(&self.forward))
    }

    /// Turn to face `target`. A target at the camera position is ignored.
    pub fn look_at(&mut self, target: Point3<f32>) {
        let dir = target - self.position;
        if dir.norm_squared() > 1e-12 {
            self.forward = Unit::new_normalize(dir);
        }
    }

    fn half_height(&self) -> f32 {
        (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    /// World-space ray through a point given in normalized device
    /// coordinates (`[-1, 1]`, y up).
    pub fn ray_through_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let h = self.half_height();
        let dir = self.forward.into_inner()
            + self.right().into_inner() * (ndc_x * h * self.aspect)
            + self.up().into_inner() * (ndc_y * h);
        Ray::new(self.position, dir)
    }

    /// World-space ray through a display-space point (`[0, 1]`, y down).
    pub fn ray_through(&self, point: Point2) -> Ray {
        let (x, y) = display_to_ndc(point);
        self.ray_through_ndc(x, y)
    }

    /// Project a world point. `None` when it is behind the near plane.
    pub fn project(&self, p: Point3<f32>) -> Option<Projected> {
        let v = p - self.position;
        let depth = v.dot(&self.forward);
        if depth <= self.near { return None; }
        let h = self.half_height();
        Some(Projected {
            ndc_x: v.dot(&self.right()) / (depth * h * self.aspect),
            ndc_y: v.dot(&self.up()) / (depth * h),
            depth,
        })
    }

    /// On-screen size of a world length at the given depth, as a fraction of
    /// the viewport height.
    pub fn screen_scale(&self, depth: f32) -> f32 {
        1.0 / (2.0 * depth.max(self.near) * self.half_height())
    }
}

/// Display space → NDC.
pub fn display_to_ndc(p: Point2) -> (f32, f32) {
    (2.0 * p.x - 1.0, 1.0 - 2.0 * p.y)
}

/// NDC → display space.
pub fn ndc_to_display(ndc_x: f32, ndc_y: f32) -> Point2 {
    Point2::new((ndc_x + 1.0) * 0.5, (1.0 - ndc_y) * 0.5)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
