//! Error types for the graph_camera crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two nodes share an id.
    #[error("duplicate node id {0:?}")]
    DuplicateNode(String),

    /// A link names a node that does not exist.
    #[error("link {source_id:?} -> {target_id:?} references unknown node {missing:?}")]
    UnknownEndpoint {
        source_id: String,
        target_id: String,
        missing:   String,
    },

    #[error("invalid camera config: {0}")]
    InvalidConfig(String),
}
