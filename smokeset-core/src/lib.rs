//! Core library for preparing wildfire detection datasets from labeled videos.
//!
//! This crate extracts still frames from labeled fire/no-fire video states,
//! splits image tables into train/validation/test subsets without leaking a
//! fire sequence across subsets, subsamples long sequences and prefetches
//! dataset images to local storage.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use smokeset_core::config::ExtractionConfigBuilder;
//! use smokeset_core::video::{SidecarDecoder, check_ffmpeg};
//! use smokeset_core::{DatasetSplitter, FrameExtractor, SplitRatios, WildfireDataset};
//! use std::path::Path;
//!
//! check_ffmpeg().unwrap();
//! let config = ExtractionConfigBuilder::new()
//!     .frames_per_state(4)
//!     .build()
//!     .unwrap();
//! let mut extractor = FrameExtractor::new(
//!     "/path/to/videos",
//!     Path::new("/path/to/wildfire_states.csv"),
//!     config,
//! ).unwrap();
//! extractor.run(Path::new("/path/to/frames"), &SidecarDecoder).unwrap();
//!
//! let dataset = WildfireDataset::from_path(
//!     &extractor.labels_path(Path::new("/path/to/frames")),
//!     "/path/to/frames",
//! ).unwrap();
//! let splits = DatasetSplitter::new(SplitRatios::default())
//!     .with_sequence_column("fBase")
//!     .fit(&dataset)
//!     .unwrap();
//! println!("{} training images", splits.subset("train").unwrap().len());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod prefetch;
pub mod sampling;
pub mod splitter;
pub mod states;
pub mod subsample;
pub mod table;
pub mod transforms;
pub mod video;

// Re-exports for public API
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use dataset::WildfireDataset;
pub use error::{CoreError, CoreResult};
pub use extractor::{FrameExtractor, write_frames};
pub use prefetch::{parallel_map, prefetch};
pub use sampling::{FrameSelection, Strategy, select_frames};
pub use splitter::{
    DatasetSplits, DatasetSplitter, SplitAlgorithm, SplitAssignment, SplitRatios, SplitSummary,
    parse_ratio,
};
pub use states::{StateRecord, frame_file_name, parse_states};
pub use subsample::subsample_sequences;
pub use table::Table;
pub use transforms::{CenterCrop, ImageTransform, Resize};
