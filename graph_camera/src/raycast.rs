//! Ray casting against the scene's pickable nodes.

use nalgebra::{Point3, Unit, Vector3};

use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin:    Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray { origin, direction: Unit::new_normalize(direction) }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }

    /// Distance along the ray to the first contact with a sphere, if any.
    /// An origin inside the sphere counts as contact at 0.
    pub fn intersect_sphere(&self, centre: Point3<f32>, radius: f32) -> Option<f32> {
        let oc = self.origin - centre;
        let b = oc.dot(&self.direction);
        let c = oc.norm_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 { return None; }

        let sq = disc.sqrt();
        let (t0, t1) = (-b - sq, -b + sq);
        if t1 < 0.0 {
            None
        } else if t0 < 0.0 {
            Some(0.0)
        } else {
            Some(t0)
        }
    }
}

/// Nearest node hit by a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub index:    usize,
    pub id:       String,
    pub distance: f32,
    pub point:    Point3<f32>,
}

/// Nearest node intersected by `ray`. An empty scene never hits.
pub fn pick(ray: &Ray, scene: &Scene) -> Option<Hit> {
    scene.nodes().iter().enumerate()
        .filter_map(|(i, n)| ray.intersect_sphere(n.position, n.pick_radius()).map(|t| (i, n, t)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(index, node, t)| Hit {
            index,
            id:       node.id.clone(),
            distance: t,
            point:    ray.at(t),
        })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    fn down_z() -> Ray {
        Ray::new(Point3::new(0.0, 0.0, 100.0), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn sphere_front_hit() {
        let t = down_z().intersect_sphere(Point3::origin(), 10.0).unwrap();
        assert!((t - 90.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_behind_is_missed() {
        assert!(down_z().intersect_sphere(Point3::new(0.0, 0.0, 200.0), 10.0).is_none());
    }

    #[test]
    fn inside_sphere_hits_at_zero() {
        assert_eq!(down_z().intersect_sphere(Point3::new(0.0, 0.0, 100.0), 10.0), Some(0.0));
    }

    #[test]
    fn nearest_node_wins() {
        let scene = Scene::from_nodes(vec![
            SceneNode::new("far",  Point3::new(0.0, 0.0, -50.0)),
            SceneNode::new("near", Point3::new(0.0, 0.0,  20.0)),
            SceneNode::new("off",  Point3::new(80.0, 0.0, 50.0)),
        ]).unwrap();
        let hit = pick(&down_z(), &scene).unwrap();
        assert_eq!(hit.id, "near");
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn empty_scene_never_hits() {
        assert!(pick(&down_z(), &Scene::default()).is_none());
    }
}
