// ============================================================================
// smokeset-core/src/extractor.rs
// ============================================================================
//
// FRAME EXTRACTOR: From Labeled States to Still Frames
//
// The extractor reads a states table (one row per labeled frame range of a
// wildfire video), picks frames in every state according to the configured
// strategy, writes one label row per picked frame and finally decodes each
// picked frame to `<video_stem>_frame<frame>.png`.
//
// KEY COMPONENTS:
// - FrameExtractor: holds states and configuration, runs the extraction
// - write_frames: decodes and saves the frames listed in a label table
//
// Example states table:
//
//   fname               fBase  fps  fire  stateStart  stateEnd
//   0_seq0_344.mp4      0.mp4  25   0     4           344
//   0_seq1061_1475.mp4  0.mp4  25   1     1111        1449

use crate::config::{ExtractionConfig, FRAME_COLUMN, IMAGE_COLUMN, VIDEO_COLUMN};
use crate::error::{CoreError, CoreResult};
use crate::sampling::select_frames;
use crate::states::{StateRecord, frame_file_name, parse_states};
use crate::table::{Table, parse_frame_number};
use crate::video::{Frame, VideoDecoder, VideoStream};

use log::{debug, info};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Extracts frames from wildfire videos according to a strategy.
///
/// # Examples
///
/// ```rust,no_run
/// use smokeset_core::config::ExtractionConfigBuilder;
/// use smokeset_core::video::SidecarDecoder;
/// use smokeset_core::FrameExtractor;
/// use std::path::Path;
///
/// let config = ExtractionConfigBuilder::new()
///     .strategy_name("random")?
///     .frames_per_state(2)
///     .build()?;
/// let mut extractor = FrameExtractor::new(
///     "../WildFire",
///     Path::new("wildfire_states.csv"),
///     config,
/// )?;
/// let labels = extractor.run(Path::new("frames"), &SidecarDecoder)?;
/// println!("{} frames extracted", labels.len());
/// # Ok::<(), smokeset_core::CoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    videos_dir: PathBuf,
    states: Table,
    records: Vec<StateRecord>,
    labels_basename: String,
    config: ExtractionConfig,
    labels: Option<Table>,
}

impl FrameExtractor {
    /// Loads the states CSV at `states_path`.
    ///
    /// The label table of a run is named after the states file:
    /// `states.csv` produces `states.labels.csv`.
    pub fn new(
        videos_dir: impl Into<PathBuf>,
        states_path: &Path,
        config: ExtractionConfig,
    ) -> CoreResult<Self> {
        let states = Table::from_path(states_path)?;
        let basename = states_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CoreError::InvalidPath(format!(
                    "States path '{}' has no file name",
                    states_path.display()
                ))
            })?;
        Self::from_table(videos_dir, states, basename, config)
    }

    /// Uses an in-memory states table.
    pub fn from_table(
        videos_dir: impl Into<PathBuf>,
        states: Table,
        labels_basename: impl Into<String>,
        config: ExtractionConfig,
    ) -> CoreResult<Self> {
        if config.frames_per_state == 0 {
            return Err(CoreError::Configuration(
                "At least one frame per state must be requested".to_string(),
            ));
        }
        let records = parse_states(&states)?;

        Ok(Self {
            videos_dir: videos_dir.into(),
            states,
            records,
            labels_basename: labels_basename.into(),
            config,
            labels: None,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn states(&self) -> &Table {
        &self.states
    }

    /// Labels of the last successful run.
    pub fn frame_labels(&self) -> Option<&Table> {
        self.labels.as_ref()
    }

    /// Where `run` writes the label table for `output_dir`.
    pub fn labels_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.labels.csv", self.labels_basename))
    }

    /// Picks frames for every state and builds the label table.
    ///
    /// The result has the states' columns plus `frame` and `imgFile`, one row
    /// per picked frame, sorted by source video then frame index. Every
    /// state is sampled with the same seed; overlapping states of one video
    /// may pick the same frame.
    pub fn build_frame_labels(&self) -> CoreResult<Table> {
        let mut headers = self.states.headers().to_vec();
        let frame_col = column_or_append(&mut headers, FRAME_COLUMN);
        let image_col = column_or_append(&mut headers, IMAGE_COLUMN);

        let mut entries: Vec<(&str, i64, Vec<String>)> = Vec::new();
        for record in &self.records {
            let selection = select_frames(
                record,
                self.config.frames_per_state,
                self.config.strategy,
                self.config.allow_duplicates,
                self.config.seed,
            )?;

            let base = self.states.row(record.row).unwrap_or_default();
            for frame in selection.frames {
                let mut row = base.to_vec();
                row.resize(headers.len(), String::new());
                row[frame_col] = frame.to_string();
                row[image_col] = frame_file_name(&record.video, frame);
                entries.push((record.video.as_str(), frame, row));
            }
        }

        entries.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

        let mut labels = Table::new(headers);
        for (_, _, row) in entries {
            labels.push_row(row)?;
        }
        Ok(labels)
    }

    /// Runs the extraction into `output_dir`, created if needed.
    ///
    /// Writes the label table first, then every frame. Any frame that cannot
    /// be read aborts the run with `FrameRead`.
    pub fn run(&mut self, output_dir: &Path, decoder: &dyn VideoDecoder) -> CoreResult<&Table> {
        let labels = self.build_frame_labels()?;

        fs::create_dir_all(output_dir)?;
        let labels_path = self.labels_path(output_dir);
        info!("Writing frame labels to {}", labels_path.display());
        labels.write_to_path(&labels_path)?;

        info!(
            "Extracting {} frames per state ({} in total) to {}",
            self.config.frames_per_state,
            labels.len(),
            output_dir.display()
        );
        write_frames(&labels, &self.videos_dir, output_dir, decoder)?;

        Ok(self.labels.insert(labels))
    }
}

fn column_or_append(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h == name) {
        Some(index) => index,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}

/// Decodes the frames listed in `labels` and writes them into `output_dir`.
///
/// Each source video is opened once. Returns the number of frames written.
pub fn write_frames(
    labels: &Table,
    videos_dir: &Path,
    output_dir: &Path,
    decoder: &dyn VideoDecoder,
) -> CoreResult<usize> {
    fs::create_dir_all(output_dir)?;

    let video_col = labels.column_index(VIDEO_COLUMN)?;
    let frame_col = labels.column_index(FRAME_COLUMN)?;
    let image_col = labels.column_index(IMAGE_COLUMN)?;

    // Frames grouped per video, videos in first-appearance order
    let mut groups: Vec<(&str, Vec<(i64, &str)>)> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    for row in 0..labels.len() {
        let video = labels.cell(row, video_col);
        let frame = parse_frame_number(labels.cell(row, frame_col)).ok_or_else(|| {
            CoreError::InvalidRecord {
                row,
                reason: format!("frame '{}' is not a frame number", labels.cell(row, frame_col)),
            }
        })?;
        let index = *group_of.entry(video).or_insert_with(|| {
            groups.push((video, Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push((frame, labels.cell(row, image_col)));
    }

    let mut written = 0;
    for (video, mut frames) in groups {
        // Streams read forward, so take each video's frames in ascending order
        frames.sort_by_key(|(frame, _)| *frame);
        let requested: Vec<i64> = frames.iter().map(|(frame, _)| *frame).collect();

        debug!("Opening {} for {} frames", video, frames.len());
        let mut stream = match decoder.open(&videos_dir.join(video), &requested) {
            Ok(stream) => stream,
            Err(CoreError::InvalidPath(reason)) => {
                debug!("Opening {} failed: {}", video, reason);
                return Err(CoreError::FrameRead {
                    video: video.to_string(),
                    frame: requested.first().copied().unwrap_or_default(),
                });
            }
            Err(e) => return Err(e),
        };
        for (frame, image_file) in frames {
            let decoded = read_frame(stream.as_mut(), video, frame)?;
            decoded.save_png(&output_dir.join(image_file))?;
            written += 1;
        }
    }

    Ok(written)
}

fn read_frame(stream: &mut dyn VideoStream, video: &str, frame: i64) -> CoreResult<Frame> {
    let decoded = stream.seek(frame).and_then(|_| stream.decode());
    match decoded {
        Ok(Some(decoded)) => Ok(decoded),
        Ok(None) => Err(CoreError::FrameRead {
            video: video.to_string(),
            frame,
        }),
        Err(e) => {
            debug!("Decoding frame {} of {} failed: {}", frame, video, e);
            Err(CoreError::FrameRead {
                video: video.to_string(),
                frame,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfigBuilder;
    use crate::sampling::Strategy;
    use crate::video::mocks::MockVideoDecoder;
    use tempfile::tempdir;

    const STATES_CSV: &str = "fname,fBase,fire,stateStart,stateEnd\n\
                              1_seq5_20.mp4,1.mp4,1,5,20\n\
                              0_seq0_10.mp4,0.mp4,0,0,10\n\
                              0_seq30_40.mp4,0.mp4,1,30,40\n";

    fn extractor(strategy: Strategy, frames: usize) -> FrameExtractor {
        let config = ExtractionConfigBuilder::new()
            .strategy(strategy)
            .frames_per_state(frames)
            .seed(42)
            .build()
            .unwrap();
        let states = Table::from_reader(STATES_CSV.as_bytes()).unwrap();
        FrameExtractor::from_table("videos", states, "states", config).unwrap()
    }

    #[test]
    fn test_labels_are_sorted_by_video_then_frame() {
        let labels = extractor(Strategy::Evenly, 3).build_frame_labels().unwrap();
        assert_eq!(labels.len(), 9);
        assert_eq!(
            labels.headers(),
            ["fname", "fBase", "fire", "stateStart", "stateEnd", "frame", "imgFile"]
        );

        let keys: Vec<(String, i64)> = labels
            .rows()
            .iter()
            .map(|r| (r[1].clone(), r[5].parse().unwrap()))
            .collect();
        let expected: Vec<(String, i64)> = [
            ("0.mp4", 0), ("0.mp4", 5), ("0.mp4", 10),
            ("0.mp4", 30), ("0.mp4", 35), ("0.mp4", 40),
            ("1.mp4", 5), ("1.mp4", 13), ("1.mp4", 20),
        ]
        .iter()
        .map(|(v, f)| (v.to_string(), *f))
        .collect();
        assert_eq!(keys, expected);
        assert_eq!(labels.cell(0, 6), "0_frame0.png");
        // Metadata flows through
        assert_eq!(labels.cell(3, 2), "1");
    }

    #[test]
    fn test_run_writes_labels_and_frames() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("frames");
        let decoder = MockVideoDecoder::new();
        decoder.add_video("0.mp4", 100);
        decoder.add_video("1.mp4", 100);

        let mut extractor = extractor(Strategy::Random, 2);
        let count = extractor.run(&output, &decoder).unwrap().len();
        assert_eq!(count, 6);

        let labels = Table::from_path(&output.join("states.labels.csv")).unwrap();
        assert_eq!(labels.len(), 6);
        for row in labels.rows() {
            assert!(output.join(&row[6]).is_file());
        }
        // One open per video
        assert_eq!(decoder.opened_paths().len(), 2);
        assert_eq!(extractor.frame_labels(), Some(&labels));
    }

    #[test]
    fn test_unreadable_frame_aborts() {
        let dir = tempdir().unwrap();
        let decoder = MockVideoDecoder::new();
        decoder.add_video("0.mp4", 100);
        decoder.add_unreadable_video("1.mp4");

        let mut extractor = extractor(Strategy::Evenly, 2);
        let result = extractor.run(dir.path(), &decoder);
        assert!(matches!(
            result,
            Err(CoreError::FrameRead { ref video, frame: 5 }) if video == "1.mp4"
        ));
        assert!(extractor.frame_labels().is_none());
    }

    #[test]
    fn test_missing_video_is_a_frame_read_failure() {
        let dir = tempdir().unwrap();
        let decoder = MockVideoDecoder::new();
        decoder.add_video("0.mp4", 100);

        let mut extractor = extractor(Strategy::Evenly, 2);
        let result = extractor.run(dir.path(), &decoder);
        assert!(matches!(
            result,
            Err(CoreError::FrameRead { ref video, frame: 5 }) if video == "1.mp4"
        ));
    }

    #[test]
    fn test_each_video_is_opened_with_all_its_frames() {
        let dir = tempdir().unwrap();
        let decoder = MockVideoDecoder::new();
        decoder.add_video("0.mp4", 100);
        decoder.add_video("1.mp4", 100);

        extractor(Strategy::Evenly, 3).run(dir.path(), &decoder).unwrap();
        assert_eq!(
            decoder.opened_paths(),
            vec![Path::new("videos/0.mp4").to_path_buf(), Path::new("videos/1.mp4").to_path_buf()]
        );
        assert_eq!(
            decoder.requested_frames(Path::new("videos/0.mp4")),
            Some(vec![0, 5, 10, 30, 35, 40])
        );
        assert_eq!(
            decoder.requested_frames(Path::new("videos/1.mp4")),
            Some(vec![5, 13, 20])
        );
    }
}
