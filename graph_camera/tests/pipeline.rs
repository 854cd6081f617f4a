//! Landmark frames through the gesture engine into the camera controller.

use std::time::{Duration, Instant};

use graph_camera::{
    CameraController, ControllerOutcome, HoverChange, RenderHandles, Scene, SceneHost, SceneNode,
};
use nalgebra::Point3;
use pinch_gesture::landmarks::HandPose;
use pinch_gesture::{GestureConfig, GestureEngine, HandFrame, LandmarkSet};

fn scene() -> Scene {
    Scene::from_nodes(vec![
        SceneNode::new("hub",   Point3::origin()),
        SceneNode::new("spoke", Point3::new(120.0, 0.0, 0.0)),
    ]).unwrap()
}

fn hand(x: f32, y: f32, pose: HandPose) -> LandmarkSet {
    LandmarkSet::synthetic((x, y), pose)
}

#[test]
fn held_pinch_hovers_then_focuses_node() {
    let t0 = Instant::now();
    let mut engine = GestureEngine::new(GestureConfig::default());
    let mut controller = CameraController::default();
    let mut host = SceneHost::with_scene(scene(), 60.0, 1.0);

    let mut outcomes = Vec::new();
    for ms in [0u64, 40, 80, 120, 160] {
        let frame = HandFrame::new(t0 + Duration::from_millis(ms), vec![hand(0.5, 0.5, HandPose::Pinch)]);
        for ev in engine.process_frame(&frame) {
            outcomes.push(controller.handle(&mut host, &ev));
        }
    }

    assert_eq!(outcomes[0], ControllerOutcome::Hover(HoverChange::Entered("hub".into())));
    let focused: Vec<_> = outcomes.iter().filter_map(|o| match o {
        ControllerOutcome::Transition { target, .. } => Some(target.clone()),
        _ => None,
    }).collect();
    assert_eq!(focused, vec![Some("hub".to_string())]);

    // Play the 400 ms glide out.
    let t1 = Instant::now();
    assert!(host.tick(t1));
    assert!(!host.tick(t1 + Duration::from_millis(400)));
    let cam = host.camera().unwrap();
    assert!((cam.position - Point3::new(0.0, 0.0, 60.0)).norm() < 1e-3);
    assert_eq!(host.orbit_target(), Some(Point3::origin()));
}

#[test]
fn closing_two_hands_backs_camera_out() {
    let t0 = Instant::now();
    let mut engine = GestureEngine::new(GestureConfig::default());
    let mut controller = CameraController::default();
    let mut host = SceneHost::with_scene(scene(), 60.0, 1.0);
    let start_z = host.camera().unwrap().position.z;

    // Hands 0.20 apart, closing symmetrically to 0.05 so the centroid stays put.
    for step in 0..=10u64 {
        let half = (0.20 - 0.015 * step as f32) * 0.5;
        let frame = HandFrame::new(
            t0 + Duration::from_millis(step * 33),
            vec![hand(0.5 - half, 0.5, HandPose::Pinch), hand(0.5 + half, 0.5, HandPose::Pinch)],
        );
        for ev in engine.process_frame(&frame) {
            controller.handle(&mut host, &ev);
        }
    }
    let end_frame = HandFrame::new(t0 + Duration::from_millis(400), vec![hand(0.5, 0.5, HandPose::Open)]);
    for ev in engine.process_frame(&end_frame) {
        controller.handle(&mut host, &ev);
    }

    let z = host.camera().unwrap().position.z;
    let expected = 0.15 * controller.config().zoom_sensitivity;
    assert!((z - start_z - expected).abs() < 0.05, "moved {}", z - start_z);
    assert!(!host.controls().unwrap().has_saved_state());
}
