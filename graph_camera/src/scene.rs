//! The pickable node-link scene.
//!
//! Only what the camera needs: node positions, pick radii, label weight and
//! the links for drawing. Layout is not computed here; nodes arrive with
//! positions or are placed once on a Fibonacci sphere.

use std::collections::HashMap;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SceneError;
use crate::labels::font_size_from_weight;

/// Weight assumed for nodes that do not carry one.
pub const DEFAULT_WEIGHT: f32 = 0.3;

/// Smallest pick radius, so tiny labels stay hittable.
const MIN_PICK_RADIUS: f32 = 4.0;

// ════════════════════════════════════════════════════════════════════════════
// SceneNode / SceneLink
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id:       String,
    pub position: Point3<f32>,
    /// Label importance in `[0, 1]`.
    pub weight:   f32,
    /// Central nodes keep their label at any distance.
    pub central:  bool,
}

impl SceneNode {
    pub fn new(id: &str, position: Point3<f32>) -> Self {
        SceneNode { id: id.to_string(), position, weight: DEFAULT_WEIGHT, central: false }
    }

    pub fn pick_radius(&self) -> f32 {
        font_size_from_weight(self.weight).max(MIN_PICK_RADIUS)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneLink {
    pub source: String,
    pub target: String,
}

impl SceneLink {
    pub fn new(source: &str, target: &str) -> Self {
        SceneLink { source: source.to_string(), target: target.to_string() }
    }

    /// Links are undirected for de-duplication.
    pub fn same_edge(&self, other: &SceneLink) -> bool {
        (self.source == other.source && self.target == other.target)
            || (self.source == other.target && self.target == other.source)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene file format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct SceneFile {
    nodes: Vec<NodeSpec>,
    #[serde(default)]
    links: Vec<LinkSpec>,
}

#[derive(Debug, Deserialize)]
struct NodeSpec {
    id:       String,
    #[serde(default)]
    weight:   Option<f32>,
    #[serde(default)]
    central:  bool,
    #[serde(default)]
    position: Option<[f32; 3]>,
}

#[derive(Debug, Deserialize)]
struct LinkSpec {
    source: String,
    target: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    links: Vec<SceneLink>,
    index: HashMap<String, usize>,
}

impl Scene {
    pub fn new(nodes: Vec<SceneNode>, links: Vec<SceneLink>) -> Result<Self, SceneError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            if index.insert(n.id.clone(), i).is_some() {
                return Err(SceneError::DuplicateNode(n.id.clone()));
            }
        }
        for l in &links {
            for end in [&l.source, &l.target] {
                if !index.contains_key(end) {
                    return Err(SceneError::UnknownEndpoint {
                        source_id: l.source.clone(),
                        target_id: l.target.clone(),
                        missing:   end.clone(),
                    });
                }
            }
        }
        Ok(Scene { nodes, links, index })
    }

    pub fn from_nodes(nodes: Vec<SceneNode>) -> Result<Self, SceneError> {
        Self::new(nodes, Vec::new())
    }

    /// Parse the JSON scene format. Nodes without a position are placed on a
    /// sphere around the origin.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self, SceneError> {
        let file: SceneFile = serde_json::from_str(text).map_err(|source| SceneError::Json {
            path: origin.to_path_buf(),
            source,
        })?;

        let unplaced = file.nodes.iter().filter(|n| n.position.is_none()).count();
        let mut slot = 0;
        let nodes = file.nodes.into_iter().map(|spec| {
            let position = match spec.position {
                Some([x, y, z]) => Point3::new(x, y, z),
                None => {
                    let p = fibonacci_point(slot, unplaced, placement_radius(unplaced));
                    slot += 1;
                    p
                }
            };
            SceneNode {
                id:       spec.id,
                position,
                weight:   spec.weight.unwrap_or(DEFAULT_WEIGHT).clamp(0.0, 1.0),
                central:  spec.central,
            }
        }).collect();
        let links = file.links.into_iter()
            .map(|l| SceneLink { source: l.source, target: l.target })
            .collect();

        Self::new(nodes, links)
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }

    pub fn nodes(&self) -> &[SceneNode] { &self.nodes }
    pub fn links(&self) -> &[SceneLink] { &self.links }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Both endpoints of a link, for drawing.
    pub fn link_ends(&self, link: &SceneLink) -> Option<(&SceneNode, &SceneNode)> {
        Some((self.node(&link.source)?, self.node(&link.target)?))
    }

    /// Radius of the smallest origin-centred sphere containing every node
    /// plus its pick radius.
    pub fn bounding_radius(&self) -> f32 {
        self.nodes.iter()
            .map(|n| n.position.coords.norm() + n.pick_radius())
            .fold(0.0, f32::max)
    }

    /// Add nodes whose ids are new and links whose edge is new in either
    /// direction. Links whose endpoints are still unknown after the merge
    /// are dropped. Returns `(nodes_added, links_added)`.
    pub fn merge(&mut self, fragment: Scene) -> (usize, usize) {
        let mut nodes_added = 0;
        for node in fragment.nodes {
            if self.index.contains_key(&node.id) { continue; }
            self.index.insert(node.id.clone(), self.nodes.len());
            self.nodes.push(node);
            nodes_added += 1;
        }

        let mut links_added = 0;
        for link in fragment.links {
            if self.links.iter().any(|l| l.same_edge(&link)) { continue; }
            if !self.index.contains_key(&link.source) || !self.index.contains_key(&link.target) {
                warn!(source = %link.source, target = %link.target, "dropping link to unknown node");
                continue;
            }
            self.links.push(link);
            links_added += 1;
        }

        debug!(nodes_added, links_added, "scene merged");
        (nodes_added, links_added)
    }
}

fn placement_radius(count: usize) -> f32 {
    40.0 * (count.max(1) as f32).sqrt()
}

/// `i`-th of `n` roughly evenly spaced points on a sphere of radius `r`.
fn fibonacci_point(i: usize, n: usize, r: f32) -> Point3<f32> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());
    let n = n.max(1) as f32;
    let y = 1.0 - 2.0 * (i as f32 + 0.5) / n;
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = golden_angle * i as f32;
    Point3::from(Vector3::new(ring * theta.cos(), y, ring * theta.sin()) * r)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            { "id": "Rust", "weight": 1.0, "central": true, "position": [0, 0, 0] },
            { "id": "Ownership", "weight": 0.6 },
            { "id": "Borrowing" }
        ],
        "links": [
            { "source": "Rust", "target": "Ownership" },
            { "source": "Rust", "target": "Borrowing" }
        ]
    }"#;

    fn sample() -> Scene {
        Scene::from_json_str(SAMPLE, Path::new("sample.json")).unwrap()
    }

    #[test]
    fn parses_and_places_nodes() {
        let scene = sample();
        assert_eq!(scene.nodes().len(), 3);
        assert!(scene.node("Rust").unwrap().central);
        assert_eq!(scene.node("Borrowing").unwrap().weight, DEFAULT_WEIGHT);
        let r = placement_radius(2);
        for id in ["Ownership", "Borrowing"] {
            let d = scene.node(id).unwrap().position.coords.norm();
            assert!((d - r).abs() < 1e-3, "{id} at {d}");
        }
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = Scene::from_nodes(vec![
            SceneNode::new("a", Point3::origin()),
            SceneNode::new("a", Point3::origin()),
        ]).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateNode(id) if id == "a"));
    }

    #[test]
    fn unknown_link_endpoint_rejected() {
        let err = Scene::new(
            vec![SceneNode::new("a", Point3::origin())],
            vec![SceneLink::new("a", "b")],
        ).unwrap_err();
        assert!(matches!(err, SceneError::UnknownEndpoint { missing, .. } if missing == "b"));
    }

    #[test]
    fn merge_skips_known_nodes_and_reverse_links() {
        let mut scene = sample();
        let fragment = Scene::new(
            vec![
                SceneNode::new("Ownership", Point3::new(1.0, 2.0, 3.0)),
                SceneNode::new("Lifetimes", Point3::new(50.0, 0.0, 0.0)),
            ],
            vec![
                SceneLink::new("Ownership", "Lifetimes"),
            ],
        ).unwrap();
        let (n, l) = scene.merge(fragment);
        assert_eq!((n, l), (1, 1));
        // Existing node keeps its original position.
        assert_ne!(scene.node("Ownership").unwrap().position, Point3::new(1.0, 2.0, 3.0));

        let reverse = Scene::new(
            vec![
                SceneNode::new("Ownership", Point3::origin()),
                SceneNode::new("Rust", Point3::origin()),
            ],
            vec![SceneLink::new("Ownership", "Rust")],
        ).unwrap();
        assert_eq!(scene.merge(reverse), (0, 0));
        assert_eq!(scene.links().len(), 3);
    }

    #[test]
    fn bounding_radius_covers_nodes() {
        let scene = Scene::from_nodes(vec![SceneNode::new("x", Point3::new(30.0, 40.0, 0.0))]).unwrap();
        assert!((scene.bounding_radius() - (50.0 + scene.nodes()[0].pick_radius())).abs() < 1e-4);
    }
}
