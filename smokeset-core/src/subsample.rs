//! Per-sequence subsampling of image tables.
//!
//! Long sequences contribute many near-identical images. Subsampling keeps at
//! most a fixed number of rows per sequence so every fire weighs about the same.

use crate::error::{CoreError, CoreResult};
use crate::table::Table;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use std::collections::HashMap;

/// Keeps at most `frames_per_sequence` rows of every sequence.
///
/// Rows are grouped by `sequence_column` and chosen uniformly at random with
/// `seed`. The result keeps the input's row order; sequences shorter than the
/// limit are kept whole.
pub fn subsample_sequences(
    table: &Table,
    sequence_column: &str,
    frames_per_sequence: usize,
    seed: u64,
) -> CoreResult<Table> {
    if frames_per_sequence == 0 {
        return Err(CoreError::Configuration(
            "At least one frame per sequence must be kept".to_string(),
        ));
    }
    let seq_col = table.column_index(sequence_column)?;

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    for row in 0..table.len() {
        let index = *group_of
            .entry(table.cell(row, seq_col))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[index].push(row);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut kept: Vec<usize> = Vec::new();
    for rows in &groups {
        if rows.len() <= frames_per_sequence {
            kept.extend(rows);
        } else {
            kept.extend(sample(&mut rng, rows.len(), frames_per_sequence).into_iter().map(|i| rows[i]));
        }
    }
    kept.sort_unstable();

    debug!("Kept rows: {:?}", kept);
    info!(
        "Subsampled {} sequences: {} of {} rows kept",
        groups.len(),
        kept.len(),
        table.len()
    );
    Ok(table.select_rows(&kept))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(sequences: usize, frames: usize) -> Table {
        let mut table = Table::new(["fBase", "frame", "imgFile"]);
        for frame in 0..frames {
            for seq in 0..sequences {
                table
                    .push_row(vec![
                        format!("{}.mp4", seq),
                        frame.to_string(),
                        format!("{}_frame{}.png", seq, frame),
                    ])
                    .unwrap();
            }
        }
        table
    }

    #[test]
    fn test_keeps_limit_per_sequence() {
        let table = table(10, 10);
        let result = subsample_sequences(&table, "fBase", 2, 42).unwrap();
        assert_eq!(result.len(), 20);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in result.rows() {
            *counts.entry(row[0].as_str()).or_default() += 1;
        }
        assert_eq!(counts.len(), 10);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn test_preserves_row_order() {
        let table = table(3, 20);
        let result = subsample_sequences(&table, "fBase", 5, 1).unwrap();
        let positions: Vec<usize> = result
            .rows()
            .iter()
            .map(|row| table.rows().iter().position(|r| r == row).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_short_sequences_are_kept_whole() {
        let table = table(4, 3);
        let result = subsample_sequences(&table, "fBase", 5, 42).unwrap();
        assert_eq!(result, table);
    }

    #[test]
    fn test_seed_determinism() {
        let table = table(10, 10);
        let a = subsample_sequences(&table, "fBase", 2, 42).unwrap();
        let b = subsample_sequences(&table, "fBase", 2, 42).unwrap();
        let c = subsample_sequences(&table, "fBase", 2, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_rejects_zero_and_missing_column() {
        let table = table(2, 2);
        assert!(matches!(
            subsample_sequences(&table, "fBase", 0, 42),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            subsample_sequences(&table, "fire_id", 1, 42),
            Err(CoreError::MissingColumn(_))
        ));
    }
}
