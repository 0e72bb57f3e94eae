//! Implementation of the 'split' subcommand.
//!
//! Reads an image table, assigns every sequence to one split and writes
//! `<output>/<split>.csv` for each split plus `split_summary.json`.

use crate::cli::SplitArgs;
use crate::error::{CliErrorContext, CliResult};

use smokeset_core::{DatasetSplitter, SplitRatios, Table};

use log::{debug, info};

use std::fs;

pub const SUMMARY_FILE: &str = "split_summary.json";

pub fn run_split(args: SplitArgs) -> CliResult<()> {
    let ratios = if args.ratios.is_empty() {
        SplitRatios::default()
    } else {
        SplitRatios::new(args.ratios.iter().cloned())?
    };

    let table = Table::from_path(&args.metadata_path)?;
    info!("Loaded {} rows from {}", table.len(), args.metadata_path.display());

    let splitter = DatasetSplitter::new(ratios)
        .with_algorithm(args.algorithm.as_str())
        .with_seed(args.seed)
        .with_sequence_column(args.sequence_column.as_str());
    let assignment = splitter.assign(&table)?;

    fs::create_dir_all(&args.output_dir)
        .cli_with_context(|| format!("Failed to create output directory '{}'", args.output_dir.display()))?;

    for name in assignment.names() {
        let split_table = assignment
            .table(&table, name)
            .cli_with_context(|| format!("No rows assigned for split '{}'", name))?;
        let path = args.output_dir.join(format!("{}.csv", name));
        debug!("Writing {} rows to {}", split_table.len(), path.display());
        split_table.write_to_path(&path)?;
    }

    let summary = assignment.summary(splitter.seed(), splitter.algorithm());
    let summary_path = args.output_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)
        .cli_with_context(|| format!("Failed to write '{}'", summary_path.display()))?;

    for stats in &summary.splits {
        println!(
            "{:<8} {:>6} images {:>5} sequences  ratio {:.3} (requested {:.3})",
            stats.name, stats.n_samples, stats.n_sequences, stats.realized_ratio, stats.requested_ratio
        );
    }
    println!("Splits written to {}", args.output_dir.display());
    Ok(())
}
