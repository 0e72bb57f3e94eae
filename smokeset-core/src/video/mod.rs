// ============================================================================
// smokeset-core/src/video/mod.rs
// ============================================================================
//
// VIDEO DECODING: Capability Interface for Frame Access
//
// Frame extraction needs three things from a video backend: open a file for
// a known set of frames, seek to a frame, decode the frame at the current
// position. This module
// defines those capabilities as traits so the extractor can run against the
// ffmpeg-backed implementation in production and a scripted decoder in tests.
//
// KEY COMPONENTS:
// - Frame: a decoded RGB24 image
// - VideoDecoder / VideoStream: the capability traits
// - SidecarDecoder: implementation driving the ffmpeg binary
// - MockVideoDecoder: scripted in-memory implementation (test-mocks feature)

use crate::error::{CoreError, CoreResult};

use image::{ImageFormat, RgbImage};

use std::path::Path;

pub mod sidecar;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use sidecar::{SidecarDecoder, check_ffmpeg};

/// A decoded video frame in packed RGB24 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Converts the frame into an image buffer, checking the buffer size.
    pub fn to_image(&self) -> CoreResult<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            CoreError::OperationFailed(format!(
                "Frame buffer of {} bytes does not match {}x{} RGB",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Writes the frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> CoreResult<()> {
        self.to_image()?.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// An open video positioned on one frame.
pub trait VideoStream {
    /// Positions the stream so the next decode returns `frame`.
    fn seek(&mut self, frame: i64) -> CoreResult<()>;

    /// Decodes the frame at the current position, `None` if nothing could be read.
    fn decode(&mut self) -> CoreResult<Option<Frame>>;
}

/// Something that can open videos for frame access.
pub trait VideoDecoder {
    /// Opens `path` for reading `frames`. Streams only guarantee reads of
    /// those frames, taken in ascending order.
    fn open(&self, path: &Path, frames: &[i64]) -> CoreResult<Box<dyn VideoStream>>;
}
