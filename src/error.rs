//! Error types for preslog

use thiserror::Error;

/// Errors that can occur while extracting results from a single log file
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("unpaired block boundary: {markers} block markers cannot be paired")]
    UnpairedBoundary { markers: usize },

    #[error("cue marker at row {index} is the final row, no closing row exists")]
    OutOfRangeCue { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
