//! leap_glaze: interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use graph_camera::CameraConfig;
use leap_glaze::app::{run, AppConfig};
use pinch_gesture::{ActionTrigger, GestureConfig};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "leap_glaze", version, about = "Hands-free 3D graph explorer")]
struct Args {
    /// Skip the prompts and start with defaults.
    #[arg(long, default_value_t = false)]
    quick: bool,

    /// Gesture engine configuration (JSON).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Camera controller configuration (JSON).
    #[arg(long, value_name = "FILE")]
    camera: Option<PathBuf>,

    /// Scene to explore (JSON). A built-in demo scene otherwise.
    #[arg(short, long, value_name = "FILE")]
    scene: Option<PathBuf>,

    /// Replay a recorded landmark trace instead of a live source.
    #[arg(long, value_name = "TRACE", conflicts_with = "record")]
    replay: Option<PathBuf>,

    /// Record live landmark frames to a trace file.
    #[arg(long, value_name = "TRACE")]
    record: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let level = args.log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Glaze - Hands-free 3D Graph Explorer             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!("  Gesture engine: pinch_gesture v{}", pinch_gesture::VERSION);
    println!();

    let mut cfg = AppConfig::default();
    if let Some(path) = &args.config {
        cfg.gesture = GestureConfig::from_json(path).unwrap_or_else(|e| fail(&e));
    }
    if let Some(path) = &args.camera {
        cfg.camera = CameraConfig::from_json(path).unwrap_or_else(|e| fail(&e));
    }
    cfg.scene_path  = args.scene;
    cfg.replay_path = args.replay;
    cfg.record_path = args.record;

    if args.quick || args.config.is_some() || cfg.replay_path.is_some() {
        println!("  Quick-start: pinch to focus, {} ms hold\n", cfg.gesture.min_hold_ms);
    } else {
        configure_interactively(&mut cfg.gesture);
    }

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        fail(&e);
    }
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    error!("{e}");
    std::process::exit(1);
}

fn configure_interactively(gesture: &mut GestureConfig) {
    println!("  Action gesture:");
    println!("    1.Pinch (thumb + index)  2.Fist");
    gesture.action_trigger = match read_line("    Choice (1–2, default 1): ").trim() {
        "2" => ActionTrigger::Fist,
        _   => ActionTrigger::Pinch,
    };

    gesture.min_hold_ms = read_line("  Hold before firing, ms (default 150): ")
        .trim().parse::<u64>().unwrap_or(150).min(2000);

    gesture.pinch_threshold = read_line("  Pinch threshold 0.01–0.2 (default 0.06): ")
        .trim().parse::<f32>().unwrap_or(0.06).clamp(0.01, 0.2);

    gesture.mirror_x = !matches!(
        read_line("  Mirror like a selfie camera? (Y/n): ").trim(),
        "n" | "N"
    );
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
