// smokeset-core/src/video/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::{Frame, VideoDecoder, VideoStream};
use crate::error::{CoreError, CoreResult};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Side length of the square frames produced by the mock decoder.
pub const MOCK_FRAME_SIZE: u32 = 8;

#[derive(Debug, Clone, Default)]
struct MockVideo {
    frame_count: i64,
    unreadable: HashSet<i64>,
    unreadable_all: bool,
}

/// Scripted `VideoDecoder` serving synthetic frames.
///
/// Every pixel of frame `n` has the value `n % 256`, so tests can check which
/// frame ended up in which file.
#[derive(Clone, Default)]
pub struct MockVideoDecoder {
    videos: Rc<RefCell<HashMap<String, MockVideo>>>,
    opened: Rc<RefCell<Vec<(PathBuf, Vec<i64>)>>>,
    decoded: Rc<RefCell<Vec<(String, i64)>>>,
}

impl MockVideoDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a readable video with frames `0..frame_count`.
    pub fn add_video(&self, name: &str, frame_count: i64) {
        self.videos.borrow_mut().insert(
            name.to_string(),
            MockVideo {
                frame_count,
                ..Default::default()
            },
        );
    }

    /// Registers a video whose every read fails.
    pub fn add_unreadable_video(&self, name: &str) {
        self.videos.borrow_mut().insert(
            name.to_string(),
            MockVideo {
                unreadable_all: true,
                ..Default::default()
            },
        );
    }

    /// Makes one frame of a registered video unreadable.
    pub fn fail_frame(&self, name: &str, frame: i64) {
        if let Some(video) = self.videos.borrow_mut().get_mut(name) {
            video.unreadable.insert(frame);
        }
    }

    /// Paths passed to `open`, in call order.
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.opened.borrow().iter().map(|(path, _)| path.clone()).collect()
    }

    /// Frames requested when `path` was last opened.
    pub fn requested_frames(&self, path: &Path) -> Option<Vec<i64>> {
        self.opened
            .borrow()
            .iter()
            .rev()
            .find(|(opened, _)| opened == path)
            .map(|(_, frames)| frames.clone())
    }

    /// (video, frame) pairs successfully decoded, in call order.
    pub fn decoded_frames(&self) -> Vec<(String, i64)> {
        self.decoded.borrow().clone()
    }
}

impl VideoDecoder for MockVideoDecoder {
    fn open(&self, path: &Path, frames: &[i64]) -> CoreResult<Box<dyn VideoStream>> {
        self.opened
            .borrow_mut()
            .push((path.to_path_buf(), frames.to_vec()));

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let video = self
            .videos
            .borrow()
            .get(&name)
            .cloned()
            .ok_or_else(|| CoreError::InvalidPath(format!("Video '{}' does not exist", path.display())))?;

        Ok(Box::new(MockStream {
            name,
            video,
            position: 0,
            decoded: Rc::clone(&self.decoded),
        }))
    }
}

struct MockStream {
    name: String,
    video: MockVideo,
    position: i64,
    decoded: Rc<RefCell<Vec<(String, i64)>>>,
}

impl VideoStream for MockStream {
    fn seek(&mut self, frame: i64) -> CoreResult<()> {
        self.position = frame;
        Ok(())
    }

    fn decode(&mut self) -> CoreResult<Option<Frame>> {
        let frame = self.position;
        if self.video.unreadable_all
            || self.video.unreadable.contains(&frame)
            || !(0..self.video.frame_count).contains(&frame)
        {
            return Ok(None);
        }

        self.decoded.borrow_mut().push((self.name.clone(), frame));
        let value = (frame % 256) as u8;
        let len = (MOCK_FRAME_SIZE * MOCK_FRAME_SIZE * 3) as usize;
        Ok(Some(Frame::new(MOCK_FRAME_SIZE, MOCK_FRAME_SIZE, vec![value; len])))
    }
}
