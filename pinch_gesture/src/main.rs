//! gesture_replay: run a recorded landmark trace through the engine and
//! print the gesture events it produces.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};

use pinch_gesture::replay::read_trace;
use pinch_gesture::{GestureConfig, GestureEngine, GestureEvent, TwoHandPhase};

#[derive(Parser, Debug)]
#[command(name = "gesture_replay", version, about = "Replay a landmark trace through the gesture engine")]
struct Args {
    /// JSON-lines landmark trace.
    #[arg(value_name = "TRACE")]
    trace: PathBuf,

    /// Engine configuration (JSON). Defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print events as JSON lines instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let level = args.log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    info!(version = pinch_gesture::VERSION, "gesture_replay starting");

    let config = match args.config.as_deref() {
        Some(path) => match GestureConfig::from_json(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        },
        None => GestureConfig::default(),
    };

    let frames = match read_trace(&args.trace) {
        Ok(f) => f,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    info!("replaying {} frames from {}", frames.len(), args.trace.display());

    let start = Instant::now();
    let mut engine = GestureEngine::new(config);
    let (mut actions, mut hovers) = (0usize, 0usize);

    for tf in &frames {
        let frame = match tf.to_hand_frame(start) {
            Ok(f) => f,
            Err(e) => {
                warn!(t_ms = tf.t_ms, "skipping frame: {e}");
                continue;
            }
        };
        for event in engine.process_frame(&frame) {
            match &event {
                GestureEvent::Hover { .. }  => hovers += 1,
                GestureEvent::Action { .. } => actions += 1,
                GestureEvent::TwoHandPinch { .. } => {}
            }
            if args.json {
                let line = serde_json::json!({ "t_ms": tf.t_ms, "event": event });
                println!("{line}");
            } else if !event.is_hover() {
                println!("{:>7} ms  {}", tf.t_ms, describe(&event));
            }
        }
    }

    if !args.json {
        println!();
        println!("  {} frames, {} actions, {} hover frames", frames.len(), actions, hovers);
    }
}

fn describe(event: &GestureEvent) -> String {
    match event {
        GestureEvent::Hover { point } =>
            format!("hover        ({:.3}, {:.3})", point.x, point.y),
        GestureEvent::Action { point, double } =>
            format!("{:<12} ({:.3}, {:.3})", if *double { "action x2" } else { "action" }, point.x, point.y),
        GestureEvent::TwoHandPinch { hand0, hand1, phase } => match phase {
            TwoHandPhase::Start => format!(
                "two-hand     start ({:.3}, {:.3}) ({:.3}, {:.3})", hand0.x, hand0.y, hand1.x, hand1.y
            ),
            TwoHandPhase::Move { delta_distance, delta_centroid } => format!(
                "two-hand     move  zoom {:+.4}  pan ({:+.4}, {:+.4})",
                delta_distance, delta_centroid.x, delta_centroid.y
            ),
            TwoHandPhase::End => "two-hand     end".to_string(),
        },
    }
}
