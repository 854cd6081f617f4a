//! Label level of detail by camera distance.
//!
//! Three bands measured from the scene origin: close labels at full size,
//! mid-range labels at 0.6×, and far away only central nodes keep a label
//! at 0.4×. Band edges are widened by a small buffer so labels do not
//! flicker when the camera hovers at a boundary.

use crate::scene::SceneNode;

pub fn font_size_from_weight(weight: f32) -> f32 {
    2.0 + weight * 8.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
    pub visible:     bool,
    pub text_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelLod {
    pub near:   f32,
    pub far:    f32,
    pub buffer: f32,
}

impl Default for LabelLod {
    fn default() -> Self {
        LabelLod { near: 400.0, far: 800.0, buffer: 20.0 }
    }
}

impl LabelLod {
    pub fn style(&self, camera_distance: f32, node: &SceneNode) -> LabelStyle {
        let size = font_size_from_weight(node.weight);
        if camera_distance < self.near - self.buffer {
            LabelStyle { visible: true, text_height: size }
        } else if camera_distance < self.far + self.buffer {
            LabelStyle { visible: true, text_height: size * 0.6 }
        } else {
            LabelStyle { visible: node.central, text_height: size * 0.4 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn bands() {
        let lod = LabelLod::default();
        let mut node = SceneNode::new("n", Point3::origin());
        node.weight = 0.5;

        assert_eq!(lod.style(100.0, &node), LabelStyle { visible: true, text_height: 6.0 });
        assert!((lod.style(600.0, &node).text_height - 3.6).abs() < 1e-5);
        assert!(lod.style(379.0, &node).text_height == 6.0);
        assert!(lod.style(381.0, &node).text_height < 6.0);
        assert!(lod.style(819.0, &node).visible);
        assert!(!lod.style(821.0, &node).visible);

        node.central = true;
        let far = lod.style(2000.0, &node);
        assert!(far.visible);
        assert!((far.text_height - 2.4).abs() < 1e-5);
    }
}
