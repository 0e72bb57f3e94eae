//! State records.
//!
//! A state describes a contiguous frame range of one video sharing the same
//! labels, e.g. "between frames 27 and 56, fire visible with confidence". The
//! states table must carry `stateStart`, `stateEnd` and `fBase`; every other
//! column is metadata that flows through to the frame labels.

use crate::config::{STATE_END_COLUMN, STATE_START_COLUMN, VIDEO_COLUMN};
use crate::error::{CoreError, CoreResult};
use crate::table::{Table, parse_frame_number};

use std::path::Path;

/// One labeled frame range of a source video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    /// Row of the state in its table
    pub row: usize,
    /// First frame of the range (inclusive)
    pub start: i64,
    /// Last frame of the range (inclusive)
    pub end: i64,
    /// Source video file name, e.g. "952.mp4"
    pub video: String,
}

impl StateRecord {
    pub fn new(video: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            row: 0,
            start,
            end,
            video: video.into(),
        }
    }

    /// Number of frames in the inclusive range, saturating at `u64::MAX`.
    pub fn range_len(&self) -> u64 {
        let len = self.end as i128 - self.start as i128 + 1;
        len.clamp(0, u64::MAX as i128) as u64
    }
}

/// Parses every row of a states table.
///
/// Fails with `MissingColumn` if a required column is absent and with
/// `InvalidRecord` if a bound is not an integer, `start > end`, or the range
/// holds more frames than an `i64` can count.
pub fn parse_states(table: &Table) -> CoreResult<Vec<StateRecord>> {
    let start_col = table.column_index(STATE_START_COLUMN)?;
    let end_col = table.column_index(STATE_END_COLUMN)?;
    let video_col = table.column_index(VIDEO_COLUMN)?;

    (0..table.len())
        .map(|row| {
            let bound = |col: usize, name: &str| {
                parse_frame_number(table.cell(row, col)).ok_or_else(|| CoreError::InvalidRecord {
                    row,
                    reason: format!("{} '{}' is not a frame number", name, table.cell(row, col)),
                })
            };
            let start = bound(start_col, STATE_START_COLUMN)?;
            let end = bound(end_col, STATE_END_COLUMN)?;
            if start > end {
                return Err(CoreError::InvalidRecord {
                    row,
                    reason: format!("state starts at {} after it ends at {}", start, end),
                });
            }
            if end.checked_sub(start).and_then(|span| span.checked_add(1)).is_none() {
                return Err(CoreError::InvalidRecord {
                    row,
                    reason: format!("state [{}, {}] spans too many frames", start, end),
                });
            }

            Ok(StateRecord {
                row,
                start,
                end,
                video: table.cell(row, video_col).to_string(),
            })
        })
        .collect()
}

/// Output file name of an extracted frame: `<video_stem>_frame<frame>.png`.
pub fn frame_file_name(video: &str, frame: i64) -> String {
    let stem = Path::new(video)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.to_string());
    format!("{}_frame{}.png", stem, frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_states() {
        let csv = "fBase,fire,stateStart,stateEnd\n0.mp4,0,4,344\n0.mp4,1,1111,1449\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let states = parse_states(&table).unwrap();

        assert_eq!(states.len(), 2);
        assert_eq!(states[1].row, 1);
        assert_eq!(states[1].start, 1111);
        assert_eq!(states[1].end, 1449);
        assert_eq!(states[1].video, "0.mp4");
    }

    #[test]
    fn test_inverted_state_is_rejected() {
        let csv = "fBase,stateStart,stateEnd\n0.mp4,50,10\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            parse_states(&table),
            Err(CoreError::InvalidRecord { row: 0, .. })
        ));
    }

    #[test]
    fn test_missing_video_column() {
        let csv = "stateStart,stateEnd\n1,2\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(parse_states(&table), Err(CoreError::MissingColumn(_))));
    }

    #[test]
    fn test_range_len_is_inclusive() {
        assert_eq!(StateRecord::new("952.mp4", 100, 106).range_len(), 7);
        assert_eq!(StateRecord::new("952.mp4", 5, 5).range_len(), 1);
        assert_eq!(StateRecord::new("952.mp4", 0, i64::MAX).range_len(), 1 << 63);
        assert_eq!(StateRecord::new("952.mp4", i64::MIN, i64::MAX).range_len(), u64::MAX);
    }

    #[test]
    fn test_oversized_state_is_rejected() {
        let csv = "fBase,stateStart,stateEnd\n0.mp4,0,9223372036854775807\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            parse_states(&table),
            Err(CoreError::InvalidRecord { row: 0, .. })
        ));

        let csv = "fBase,stateStart,stateEnd\n0.mp4,1,9223372036854775807\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(parse_states(&table).unwrap()[0].range_len(), i64::MAX as u64);
    }

    #[test]
    fn test_frame_file_name_uses_stem() {
        assert_eq!(frame_file_name("3.mp4", 56), "3_frame56.png");
        assert_eq!(frame_file_name("noext", 1), "noext_frame1.png");
    }
}
