// ============================================================================
// smokeset-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for smokeset-core
//
// This module defines the error taxonomy shared by the frame extractor, the
// dataset splitter and the dataset utilities. Every error is raised at the
// call that detects it; no operation returns partial results.
//
// KEY COMPONENTS:
// - CoreError: Enum of all failures the library reports
// - CoreResult: Result alias used throughout the crate

use thiserror::Error;

/// Custom error type for smokeset-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid strategy, algorithm, ratios or frame count.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A segment holds fewer frames than requested and duplicates are disallowed.
    #[error(
        "Not enough frames available ({available}) in state [{start}, {end}] \
         to extract {requested} frames from {video}"
    )]
    InsufficientRange {
        video: String,
        start: i64,
        end: i64,
        available: u64,
        requested: usize,
    },

    /// Seeking to or decoding a frame failed.
    #[error("Could not read frame {frame} from {video}")]
    FrameRead { video: String, frame: i64 },

    #[error("Invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Required external command not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for smokeset-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
