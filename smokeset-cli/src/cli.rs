// smokeset-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use smokeset_core::config::{
    DEFAULT_FRAMES_PER_STATE, DEFAULT_SEED, DEFAULT_STRATEGY, ENV_FRAMES, ENV_SEED,
    SEQUENCE_COLUMN, VIDEO_COLUMN,
};
use smokeset_core::parse_ratio;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Smokeset: Wildfire dataset preparation tool",
    long_about = "Extracts labeled frames from wildfire videos and builds leakage-free \
                  train/validation/test splits via the smokeset-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extracts frames of every labeled state into PNG files plus a label table
    Extract(ExtractArgs),
    /// Splits an image table into subsets without sharing a sequence between them
    Split(SplitArgs),
    /// Keeps at most N images of every sequence
    Subsample(SubsampleArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Directory containing the source videos
    #[arg(long = "videos", value_name = "VIDEOS_DIR")]
    pub videos_dir: PathBuf,

    /// CSV table of labeled states (fBase, stateStart, stateEnd, ...)
    #[arg(long = "states", value_name = "STATES_CSV")]
    pub states_path: PathBuf,

    /// Directory where frames and the label table will be written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Frame selection strategy: random or evenly
    #[arg(long, value_name = "STRATEGY", default_value_t = DEFAULT_STRATEGY.to_string())]
    pub strategy: String,

    /// Number of frames to extract per state
    #[arg(long, value_name = "N", env = ENV_FRAMES, default_value_t = DEFAULT_FRAMES_PER_STATE)]
    pub frames: usize,

    /// Allow repeated frames when a state is shorter than the requested count
    #[arg(long)]
    pub allow_duplicates: bool,

    /// Seed for random frame selection
    #[arg(long, value_name = "SEED", env = ENV_SEED, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// CSV table of images with a sequence column
    #[arg(long = "metadata", value_name = "METADATA_CSV")]
    pub metadata_path: PathBuf,

    /// Directory where one CSV per split will be written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Split ratio as NAME=FRACTION, repeatable and ordered (default train=0.7 val=0.15 test=0.15)
    #[arg(long = "ratio", value_name = "NAME=FRACTION", value_parser = parse_ratio_arg)]
    pub ratios: Vec<(String, f64)>,

    /// Splitting algorithm
    #[arg(long, value_name = "ALGORITHM", default_value = "fixed_size")]
    pub algorithm: String,

    /// Seed for shuffling sequences
    #[arg(long, value_name = "SEED", env = ENV_SEED, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Column identifying the sequence each image belongs to
    #[arg(long, value_name = "COLUMN", default_value = SEQUENCE_COLUMN)]
    pub sequence_column: String,
}

#[derive(Parser, Debug)]
pub struct SubsampleArgs {
    /// CSV table of images with a sequence column
    #[arg(long = "metadata", value_name = "METADATA_CSV")]
    pub metadata_path: PathBuf,

    /// Path of the reduced CSV table
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_CSV")]
    pub output_path: PathBuf,

    /// Maximum number of images kept per sequence
    #[arg(long, value_name = "N")]
    pub frames_per_sequence: usize,

    /// Seed for choosing the kept images
    #[arg(long, value_name = "SEED", env = ENV_SEED, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Column identifying the sequence each image belongs to
    #[arg(long, value_name = "COLUMN", default_value = VIDEO_COLUMN)]
    pub sequence_column: String,
}

fn parse_ratio_arg(s: &str) -> Result<(String, f64), String> {
    parse_ratio(s).map_err(|e| e.to_string())
}
