//! Implementation of the 'subsample' subcommand.

use crate::cli::SubsampleArgs;
use crate::error::{CliErrorContext, CliResult};

use smokeset_core::{Table, subsample_sequences};

use std::fs;

pub fn run_subsample(args: SubsampleArgs) -> CliResult<()> {
    let table = Table::from_path(&args.metadata_path)?;
    let reduced = subsample_sequences(
        &table,
        &args.sequence_column,
        args.frames_per_sequence,
        args.seed,
    )?;

    if let Some(parent) = args.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    reduced.write_to_path(&args.output_path)?;

    println!(
        "Kept {} of {} rows in {}",
        reduced.len(),
        table.len(),
        args.output_path.display()
    );
    Ok(())
}
