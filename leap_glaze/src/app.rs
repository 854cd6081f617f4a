//! Top-level application state machine.
//!
//! `AppState` owns the gesture engine, the camera controller and the
//! `SceneHost` the visualizer draws from. It processes landmark frames and
//! advances camera transitions each display frame.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use graph_camera::{
    CameraConfig, CameraController, ControllerOutcome, HoverChange, LabelLod, Scene, SceneHost,
};
use pinch_gesture::landmarks::index;
use pinch_gesture::replay::{read_trace, TraceRecorder};
use pinch_gesture::{GestureConfig, GestureEngine, GestureEvent, HandFrame};
use tracing::{debug, info, warn};

use crate::source::{spawn_landmark_source, ReplaySource, SimInput, SourceMessage};
use crate::visualizer::{Visualizer, WindowCommand};

/// Built-in scene used when no `--scene` is given.
const DEMO_SCENE: &str = include_str!("../demos/rust_topics.json");

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub gesture:     GestureConfig,
    pub camera:      CameraConfig,
    pub labels:      LabelLod,
    /// JSON scene file; the built-in demo scene when `None`.
    pub scene_path:  Option<PathBuf>,
    /// Replay this landmark trace instead of a live source.
    pub replay_path: Option<PathBuf>,
    /// Record live frames to this trace file.
    pub record_path: Option<PathBuf>,
    /// How long the hover highlight outlives the last hover event.
    pub hover_grace_ms: u64,
    pub fov_y_deg:   f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gesture:        GestureConfig::default(),
            camera:         CameraConfig::default(),
            labels:         LabelLod::default(),
            scene_path:     None,
            replay_path:    None,
            record_path:    None,
            hover_grace_ms: 250,
            fov_y_deg:      60.0,
        }
    }
}

/// Load the configured scene, or the demo scene.
pub fn load_scene(cfg: &AppConfig) -> Result<Scene, String> {
    match &cfg.scene_path {
        Some(path) => Scene::load(path).map_err(|e| e.to_string()),
        None => Scene::from_json_str(DEMO_SCENE, Path::new("demos/rust_topics.json"))
            .map_err(|e| e.to_string()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand overlay
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand, ready to draw: display-space points plus pinch state.
#[derive(Clone, Debug, PartialEq)]
pub struct HandOverlay {
    pub points:  Vec<(f32, f32)>,
    pub pinched: bool,
}

impl HandOverlay {
    pub fn thumb_tip(&self) -> (f32, f32) { self.points[index::THUMB_TIP] }
    pub fn index_tip(&self) -> (f32, f32) { self.points[index::INDEX_TIP] }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── recognition ──────────────────────────────────────────────────────
    engine:      GestureEngine,
    controller:  CameraController,

    // ── scene + camera ───────────────────────────────────────────────────
    host:        SceneHost,
    labels:      LabelLod,

    // ── hover highlight ──────────────────────────────────────────────────
    highlight:   Option<String>,
    last_hover:  Option<Instant>,
    hover_grace: Duration,

    // ── hand overlay ─────────────────────────────────────────────────────
    hands:       Vec<HandOverlay>,

    // ── trace recording ──────────────────────────────────────────────────
    recorder:    Option<TraceRecorder<BufWriter<File>>>,

    // ── status message ───────────────────────────────────────────────────
    pub status:  String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, scene: Scene) -> Self {
        let nodes = scene.nodes().len();
        let links = scene.links().len();
        AppState {
            engine:      GestureEngine::new(cfg.gesture.clone()),
            controller:  CameraController::new(cfg.camera.clone()),
            host:        SceneHost::with_scene(scene, cfg.fov_y_deg, 1.0),
            labels:      cfg.labels,
            highlight:   None,
            last_hover:  None,
            hover_grace: Duration::from_millis(cfg.hover_grace_ms),
            hands:       Vec::new(),
            recorder:    None,
            status:      format!("Ready: {} nodes, {} links", nodes, links),
        }
    }

    /// Record every following frame to `path` as a JSON-lines trace.
    pub fn start_recording(&mut self, path: &Path) -> Result<(), String> {
        let file = File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
        self.recorder = Some(TraceRecorder::new(BufWriter::new(file)));
        info!(path = %path.display(), "recording landmark trace");
        Ok(())
    }

    pub fn finish_recording(&mut self) {
        if let Some(rec) = self.recorder.take() {
            if let Err(e) = rec.into_inner().flush() {
                warn!("trace recording incomplete: {e}");
            }
        }
    }

    // ── process one HandFrame ────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: HandFrame) {
        if let Some(rec) = &mut self.recorder {
            if let Err(e) = rec.record(&frame) {
                warn!("trace recording stopped: {e}");
                self.recorder = None;
            }
        }

        let now = frame.timestamp;
        for event in self.engine.process_frame(&frame) {
            let outcome = self.controller.handle(&mut self.host, &event);
            self.apply(now, &event, outcome);
        }
        self.hands = self.overlay(&frame);
    }

    fn apply(&mut self, now: Instant, event: &GestureEvent, outcome: ControllerOutcome) {
        match outcome {
            ControllerOutcome::Hover(change) => {
                self.last_hover = Some(now);
                match change {
                    HoverChange::Entered(id) => {
                        self.status = format!("Hover \"{}\"", id);
                        self.highlight = Some(id);
                    }
                    HoverChange::Left => self.highlight = None,
                    HoverChange::Unchanged => {}
                }
            }
            ControllerOutcome::Transition { target, .. } => {
                let double = matches!(event, GestureEvent::Action { double: true, .. });
                self.status = match (target, double) {
                    (Some(id), false) => format!("Focus \"{}\"", id),
                    (Some(id), true)  => format!("Focus \"{}\" (wide)", id),
                    (None, _)         => "Fly forward".to_string(),
                };
            }
            ControllerOutcome::GestureStarted => {
                self.status = "Two hands: spread to zoom, move to pan".to_string();
            }
            ControllerOutcome::Moved { translate_z, pan } => {
                self.status = format!("Zoom {:+.1}  Pan ({:+.1}, {:+.1}, {:+.1})", -translate_z, pan.x, pan.y, pan.z);
            }
            ControllerOutcome::GestureEnded => {
                self.status = "Two hands released".to_string();
            }
            ControllerOutcome::Ignored => {}
        }
    }

    fn overlay(&self, frame: &HandFrame) -> Vec<HandOverlay> {
        let mirror = self.engine.config().mirror_x;
        let signals = self.engine.last_signals();
        frame.hands().iter().zip(signals.iter())
            .map(|(hand, signal)| HandOverlay {
                points: hand.points().iter()
                    .map(|p| (if mirror { 1.0 - p.x } else { p.x }, p.y))
                    .collect(),
                pinched: signal.is_pinched,
            })
            .collect()
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        self.host.tick(now);

        if let Some(last) = self.last_hover {
            if now.saturating_duration_since(last) > self.hover_grace {
                debug!("hover grace elapsed");
                self.controller.clear_hover();
                self.highlight = None;
                self.last_hover = None;
            }
        }
    }

    pub fn fit_view(&mut self) {
        self.host.zoom_to_fit(Duration::from_millis(self.controller.config().double_duration_ms));
        self.status = "Fit view".to_string();
    }

    pub fn set_aspect(&mut self, aspect: f32) { self.host.set_aspect(aspect); }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn host(&self)      -> &SceneHost      { &self.host }
    pub fn labels(&self)    -> &LabelLod       { &self.labels }
    pub fn highlight(&self) -> Option<&str>    { self.highlight.as_deref() }
    pub fn hands(&self)     -> &[HandOverlay]  { &self.hands }
    pub fn two_hand_active(&self) -> bool      { self.engine.two_hand_active() }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Live landmark source: LeapMotion with `--features leap`, the mouse
/// simulator otherwise. The sender feeds the simulator from the window.
#[cfg(feature = "leap")]
fn spawn_live_source(cfg: &AppConfig) -> (Receiver<SourceMessage>, Option<Sender<SimInput>>) {
    use crate::source::LeapHandSource;
    (spawn_landmark_source(LeapHandSource { mirror_x: cfg.gesture.mirror_x }), None)
}

#[cfg(not(feature = "leap"))]
fn spawn_live_source(cfg: &AppConfig) -> (Receiver<SourceMessage>, Option<Sender<SimInput>>) {
    use crate::source::SimHandSource;
    let (sim_tx, sim_rx) = std::sync::mpsc::channel::<SimInput>();
    let rx = spawn_landmark_source(SimHandSource { rx: sim_rx, mirror_x: cfg.gesture.mirror_x });
    (rx, Some(sim_tx))
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It loads the scene,
/// starts the landmark source (replay, simulation or hardware) and the
/// visualizer, and drives the frame/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── Scene + state ─────────────────────────────────────────────────────
    let scene = load_scene(&cfg)?;
    let mut app = AppState::new(&cfg, scene);

    // ── Landmark source ───────────────────────────────────────────────────
    let (frames_rx, sim_tx) = match &cfg.replay_path {
        Some(path) => {
            let frames = read_trace(path).map_err(|e| e.to_string())?;
            app.status = format!("Replaying {} frames", frames.len());
            (spawn_landmark_source(ReplaySource { frames, paced: true }), None)
        }
        None => {
            if let Some(path) = &cfg.record_path {
                app.start_recording(path)?;
            }
            spawn_live_source(&cfg)
        }
    };

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;
    app.set_aspect(vis.aspect());

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut source_done = false;
    while vis.is_open() {
        // 1. Poll window input; pointer samples go to the simulator
        match vis.poll_input() {
            WindowCommand::Quit    => break,
            WindowCommand::FitView => app.fit_view(),
            WindowCommand::None    => {}
        }

        // 2. Drain landmark frames
        loop {
            match frames_rx.try_recv() {
                Ok(SourceMessage::Frame(frame)) => app.handle_frame(frame),
                Ok(SourceMessage::Quit)         => {
                    app.finish_recording();
                    return Err("landmark source stopped".to_string());
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    if !source_done {
                        info!("landmark source finished");
                        source_done = true;
                    }
                    break;
                }
            }
        }

        // 3. Per-frame logic
        app.tick(Instant::now());

        // 4. Render
        vis.render(
            app.host(),
            app.labels(),
            app.highlight(),
            app.hands(),
            &app.status,
            app.two_hand_active(),
        );
    }

    app.finish_recording();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use graph_camera::{RenderHandles, SceneNode};
    use nalgebra::Point3;
    use pinch_gesture::landmarks::HandPose;
    use pinch_gesture::LandmarkSet;

    fn make_app() -> AppState {
        let scene = Scene::from_nodes(vec![
            SceneNode::new("hub",  Point3::origin()),
            SceneNode::new("edge", Point3::new(150.0, 0.0, 0.0)),
        ]).unwrap();
        AppState::new(&AppConfig::default(), scene)
    }

    fn pinch_at(t: Instant, x: f32, y: f32) -> HandFrame {
        // Default config mirrors x; feed raw camera coordinates.
        HandFrame::new(t, vec![LandmarkSet::synthetic((1.0 - x, y), HandPose::Pinch)])
    }

    fn open_at(t: Instant, x: f32, y: f32) -> HandFrame {
        HandFrame::new(t, vec![LandmarkSet::synthetic((1.0 - x, y), HandPose::Open)])
    }

    #[test]
    fn demo_scene_loads() {
        let scene = load_scene(&AppConfig::default()).unwrap();
        assert!(scene.nodes().len() > 10);
        assert!(scene.node("Rust").unwrap().central);
    }

    #[test]
    fn pinch_highlights_node_under_hand() {
        let mut app = make_app();
        app.handle_frame(pinch_at(Instant::now(), 0.5, 0.5));
        assert_eq!(app.highlight(), Some("hub"));
        assert_eq!(app.status, "Hover \"hub\"");
    }

    #[test]
    fn highlight_survives_grace_then_clears() {
        let mut app = make_app();
        let t0 = Instant::now();
        app.handle_frame(pinch_at(t0, 0.5, 0.5));
        app.handle_frame(open_at(t0 + Duration::from_millis(30), 0.5, 0.5));

        app.tick(t0 + Duration::from_millis(200));
        assert_eq!(app.highlight(), Some("hub"));

        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.highlight(), None);
    }

    #[test]
    fn held_pinch_starts_focus_transition() {
        let mut app = make_app();
        let t0 = Instant::now();
        for ms in [0u64, 40, 80, 120, 160] {
            app.handle_frame(pinch_at(t0 + Duration::from_millis(ms), 0.5, 0.5));
        }
        assert!(app.host().is_transitioning());
        // Hover follows the action in the same frame, so the status line was
        // set by the action.
        assert_eq!(app.status, "Focus \"hub\"");
    }

    #[test]
    fn overlay_is_in_display_space() {
        let mut app = make_app();
        app.handle_frame(pinch_at(Instant::now(), 0.25, 0.4));
        let hands = app.hands();
        assert_eq!(hands.len(), 1);
        assert!(hands[0].pinched);
        let (x, y) = hands[0].index_tip();
        assert!((x - 0.25).abs() < 1e-5 && (y - 0.4).abs() < 1e-5);
    }

    #[test]
    fn fit_view_glides_back() {
        let mut app = make_app();
        let start = app.host().camera().unwrap().position;
        app.host.camera_position(Point3::new(0.0, 0.0, 20.0), Point3::origin(), Duration::ZERO);
        app.fit_view();
        let t = Instant::now();
        app.tick(t);
        app.tick(t + Duration::from_secs(2));
        assert!((app.host().camera().unwrap().position - start).norm() < 1e-3);
    }
}
