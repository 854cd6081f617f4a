//! Error types for the pinch_gesture crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the fallible edges of the engine: building landmark sets,
/// loading configuration and reading recorded traces.
///
/// Per-frame processing itself never fails; bad frames are dropped.
#[derive(Debug, Error)]
pub enum GestureError {
    /// A hand did not carry exactly 21 landmarks.
    #[error("expected {expected} landmarks per hand, got {got}")]
    LandmarkCount { expected: usize, got: usize },

    /// A landmark coordinate was NaN or infinite.
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Reading a config or trace file failed.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid JSON for [`crate::GestureConfig`].
    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A trace line could not be decoded.
    #[error("trace line {line}: {reason}")]
    Trace { line: usize, reason: String },
}
