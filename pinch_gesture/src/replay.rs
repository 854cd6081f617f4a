//! Landmark traces: JSON-lines recordings of detector output.
//!
//! One object per line:
//!
//! ```text
//! {"t_ms": 0,  "hands": [[[0.41, 0.52, 0.0], ... 21 points ...]]}
//! {"t_ms": 33, "hands": []}
//! ```
//!
//! `t_ms` is milliseconds since the start of the recording and must not
//! decrease. Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::landmarks::{HandFrame, LandmarkSet};

/// One recorded frame, as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub t_ms:  u64,
    #[serde(default)]
    pub hands: Vec<Vec<[f32; 3]>>,
}

impl TraceFrame {
    pub fn from_hand_frame(t_ms: u64, frame: &HandFrame) -> Self {
        TraceFrame {
            t_ms,
            hands: frame.hands().iter().map(LandmarkSet::to_points).collect(),
        }
    }

    /// Rebuild the frame relative to `start`.
    pub fn to_hand_frame(&self, start: Instant) -> Result<HandFrame, GestureError> {
        let hands = self.hands.iter()
            .map(|pts| LandmarkSet::from_points(pts))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HandFrame::new(start + Duration::from_millis(self.t_ms), hands))
    }
}

/// Parse a whole trace. Errors carry 1-based line numbers.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceFrame>, GestureError> {
    let mut frames: Vec<TraceFrame> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| GestureError::Trace { line: line_no, reason: e.to_string() })?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') { continue; }

        let frame: TraceFrame = serde_json::from_str(text)
            .map_err(|e| GestureError::Trace { line: line_no, reason: e.to_string() })?;

        if let Some(prev) = frames.last() {
            if frame.t_ms < prev.t_ms {
                return Err(GestureError::Trace {
                    line:   line_no,
                    reason: format!("t_ms {} is before previous {}", frame.t_ms, prev.t_ms),
                });
            }
        }
        frames.push(frame);
    }
    Ok(frames)
}

pub fn read_trace(path: &Path) -> Result<Vec<TraceFrame>, GestureError> {
    let file = File::open(path).map_err(|source| GestureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(BufReader::new(file))
}

/// Appends frames to a JSON-lines trace as they arrive.
pub struct TraceRecorder<W: Write> {
    out:   W,
    start: Option<Instant>,
}

impl<W: Write> TraceRecorder<W> {
    pub fn new(out: W) -> Self { TraceRecorder { out, start: None } }

    /// The first recorded frame defines `t_ms = 0`.
    pub fn record(&mut self, frame: &HandFrame) -> std::io::Result<()> {
        let start = *self.start.get_or_insert(frame.timestamp);
        let t_ms = frame.timestamp.saturating_duration_since(start).as_millis() as u64;
        let line = serde_json::to_string(&TraceFrame::from_hand_frame(t_ms, frame))?;
        writeln!(self.out, "{line}")
    }

    pub fn into_inner(self) -> W { self.out }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
