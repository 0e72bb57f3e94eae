// ============================================================================
// smokeset-core/src/sampling.rs
// ============================================================================
//
// FRAME SAMPLING: Selecting Frame Indices Inside a State
//
// Given a state's inclusive frame range, pick the frames to extract either
// uniformly at random or evenly spaced. Each call builds its own seeded
// random source, so results depend only on the inputs and the seed.
//
// KEY COMPONENTS:
// - Strategy: the frame selection policy
// - FrameSelection: picked indices plus whether the range was too short
// - select_frames: range validation and dispatch to the strategy

use crate::error::{CoreError, CoreResult};
use crate::states::StateRecord;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::fmt;
use std::str::FromStr;

/// Frame selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Frames drawn uniformly at random from the state range
    Random,
    /// Frames evenly spaced from the first to the last frame of the state
    Evenly,
}

impl Strategy {
    /// Every strategy the extractor accepts.
    pub const ALLOWED: [Strategy; 2] = [Strategy::Random, Strategy::Evenly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Evenly => "evenly",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALLOWED
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Strategy::ALLOWED.iter().map(Strategy::as_str).collect();
                CoreError::Configuration(format!(
                    "Strategy {} is unknown. Please choose from: {}",
                    s,
                    allowed.join(", ")
                ))
            })
    }
}

/// Frames picked for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSelection {
    /// Picked frame indices, in draw order
    pub frames: Vec<i64>,
    /// True when the state held fewer frames than requested and a warning was emitted
    pub short_range: bool,
}

/// Picks `frame_count` frames inside `state`.
///
/// A state shorter than `frame_count` is an `InsufficientRange` error unless
/// `allow_duplicates` is set, in which case a warning is logged and frames
/// repeat. With `allow_duplicates`, the random strategy always samples with
/// replacement.
pub fn select_frames(
    state: &StateRecord,
    frame_count: usize,
    strategy: Strategy,
    allow_duplicates: bool,
    seed: u64,
) -> CoreResult<FrameSelection> {
    if frame_count == 0 {
        return Err(CoreError::Configuration(
            "At least one frame per state must be requested".to_string(),
        ));
    }

    let available = state.range_len();
    let short_range = available < frame_count as u64;
    if short_range {
        if !allow_duplicates {
            return Err(CoreError::InsufficientRange {
                video: state.video.clone(),
                start: state.start,
                end: state.end,
                available,
                requested: frame_count,
            });
        }
        warn!(
            "Frames available ({}) in state [{}, {}] are fewer than the {} to extract from {}; \
             frame labels will contain duplicates",
            available, state.start, state.end, frame_count, state.video
        );
    }

    let frames = match strategy {
        Strategy::Random => pick_random(state, frame_count, allow_duplicates, seed),
        Strategy::Evenly => pick_evenly(state.start, state.end, frame_count),
    };
    debug!(
        "Selected frames {:?} from {} [{}, {}] ({})",
        frames, state.video, state.start, state.end, strategy
    );

    Ok(FrameSelection { frames, short_range })
}

fn pick_random(state: &StateRecord, count: usize, with_replacement: bool, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    if with_replacement {
        (0..count)
            .map(|_| rng.gen_range(state.start..=state.end))
            .collect()
    } else {
        rand::seq::index::sample(&mut rng, state.range_len() as usize, count)
            .into_iter()
            .map(|offset| (state.start as i128 + offset as i128) as i64)
            .collect()
    }
}

/// Linear interpolation from `start` to `end`, rounded to the nearest frame.
fn pick_evenly(start: i64, end: i64, count: usize) -> Vec<i64> {
    if count == 1 {
        return vec![start];
    }
    let span = end as f64 - start as f64;
    let steps = (count - 1) as f64;
    (0..count)
        .map(|i| {
            let offset = (span * i as f64 / steps).round() as i64;
            start.saturating_add(offset).min(end)
        })
        .collect()
}
