//! Configuration structures and constants for the smokeset-core library.
//!
//! This module provides the default values shared by the frame extractor, the
//! dataset splitter and the subsampler, plus the `ExtractionConfig` consumed by
//! [`crate::FrameExtractor`].

mod builder;
pub mod utils;

pub use builder::ExtractionConfigBuilder;

use crate::sampling::Strategy;

// Default constants

/// Seed used for every seeded operation unless overridden.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of frames extracted per state.
pub const DEFAULT_FRAMES_PER_STATE: usize = 2;

/// Default frame selection strategy.
pub const DEFAULT_STRATEGY: Strategy = Strategy::Random;

/// Default split ratios, in assignment order.
pub const DEFAULT_SPLIT_RATIOS: [(&str, f64); 3] = [("train", 0.7), ("val", 0.15), ("test", 0.15)];

/// Tolerance applied when checking that split ratios do not exceed 1.0.
pub const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// Environment variable overriding [`DEFAULT_SEED`].
pub const ENV_SEED: &str = "SMOKESET_SEED";

/// Environment variable overriding [`DEFAULT_FRAMES_PER_STATE`].
pub const ENV_FRAMES: &str = "SMOKESET_FRAMES";

// Column names

/// First frame of a state (inclusive).
pub const STATE_START_COLUMN: &str = "stateStart";

/// Last frame of a state (inclusive).
pub const STATE_END_COLUMN: &str = "stateEnd";

/// Source video file name of a state.
pub const VIDEO_COLUMN: &str = "fBase";

/// Selected frame index in a label table.
pub const FRAME_COLUMN: &str = "frame";

/// Image file name in label and metadata tables.
pub const IMAGE_COLUMN: &str = "imgFile";

/// Sequence identifier grouping images that must stay in the same split.
pub const SEQUENCE_COLUMN: &str = "fire_id";

/// Default target column of the wildfire dataset.
pub const DEFAULT_TARGET_COLUMN: &str = "fire";

/// Configuration of a frame extraction run.
///
/// Build it with [`ExtractionConfigBuilder`]; the strategy is validated when
/// its name is parsed, the frame count when the builder finishes.
///
/// # Examples
///
/// ```rust
/// use smokeset_core::config::ExtractionConfigBuilder;
/// use smokeset_core::Strategy;
///
/// let config = ExtractionConfigBuilder::new()
///     .strategy(Strategy::Evenly)
///     .frames_per_state(3)
///     .seed(69)
///     .build()
///     .unwrap();
/// assert_eq!(config.frames_per_state, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// How frames are picked inside each state
    pub strategy: Strategy,

    /// Number of frames picked per state
    pub frames_per_state: usize,

    /// Whether states shorter than `frames_per_state` may be sampled with replacement
    pub allow_duplicates: bool,

    /// Seed of the per-state random source
    pub seed: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY,
            frames_per_state: DEFAULT_FRAMES_PER_STATE,
            allow_duplicates: false,
            seed: DEFAULT_SEED,
        }
    }
}
