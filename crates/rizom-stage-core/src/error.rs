//! Error types for rizom-stage

use std::time::Duration;
use thiserror::Error;

/// Result type alias using rizom-stage's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while staging or running a RizomUV job
#[derive(Error, Debug)]
pub enum Error {
    /// The input mesh reference did not resolve to a path
    #[error("missing input mesh file")]
    MissingInputMesh,

    /// The output mesh reference did not resolve to a path
    #[error("missing output mesh file")]
    MissingOutputMesh,

    /// Neither the output extension nor any save flag selects a format
    #[error("no save operation: output extension is not .obj, .fbx or .dae and no save flag is set")]
    NoSaveOperation,

    /// A script template references a placeholder with no binding
    #[error("Unbound script placeholder: ${0}")]
    UnboundPlaceholder(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The RizomUV executable could not be started
    #[error("Failed to launch RizomUV: {0}")]
    Spawn(#[source] std::io::Error),

    /// RizomUV exited with a non-zero status
    #[error("RizomUV exited with code {code:?}: {stderr}")]
    ToolFailed {
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// RizomUV did not finish in time and was killed
    #[error("RizomUV timed out after {0:?}")]
    Timeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
