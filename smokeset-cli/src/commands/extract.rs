//! Implementation of the 'extract' subcommand.
//!
//! Builds the extraction configuration from the arguments, then delegates to
//! the smokeset-core frame extractor with the ffmpeg-backed decoder.

use crate::cli::ExtractArgs;
use crate::error::{CliErrorContext, CliResult};

use smokeset_core::config::ExtractionConfigBuilder;
use smokeset_core::video::{SidecarDecoder, check_ffmpeg};
use smokeset_core::FrameExtractor;

use log::info;

pub fn run_extract(args: ExtractArgs) -> CliResult<()> {
    let config = ExtractionConfigBuilder::new()
        .strategy_name(&args.strategy)?
        .frames_per_state(args.frames)
        .allow_duplicates(args.allow_duplicates)
        .seed(args.seed)
        .build()?;

    let mut extractor = FrameExtractor::new(&args.videos_dir, &args.states_path, config)?;
    info!(
        "Loaded {} states from {}",
        extractor.states().len(),
        args.states_path.display()
    );

    check_ffmpeg()?;
    let labels_path = extractor.labels_path(&args.output_dir);
    let written = extractor
        .run(&args.output_dir, &SidecarDecoder)
        .cli_with_context(|| format!("Extraction into '{}' failed", args.output_dir.display()))?
        .len();

    println!("Extracted {} frames to {}", written, args.output_dir.display());
    println!("Frame labels: {}", labels_path.display());
    Ok(())
}
