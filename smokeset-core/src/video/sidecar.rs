// ============================================================================
// smokeset-core/src/video/sidecar.rs
// ============================================================================
//
// FFMPEG DECODER: Frame Access Through the ffmpeg Binary
//
// Opening a video starts a single ffmpeg process that selects every requested
// frame by its decode-order number and streams them as raw RGB24 on stdout.
// Reads then walk forward through that output, so a video is decoded once no
// matter how many frames are taken from it.

use super::{Frame, VideoDecoder, VideoStream};
use crate::error::{CoreError, CoreResult};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Checks that the ffmpeg binary is available on PATH.
pub fn check_ffmpeg() -> CoreResult<()> {
    let cmd_name = "ffmpeg";
    match Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => Err(CoreError::CommandStart(cmd_name.to_string(), e)),
    }
}

/// `VideoDecoder` backed by `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarDecoder;

/// Builds the `select` filter keeping exactly `frames` (sorted, unique).
pub fn select_filter(frames: &[i64]) -> String {
    let terms: Vec<String> = frames.iter().map(|n| format!("eq(n,{})", n)).collect();
    format!("select='{}'", terms.join("+"))
}

impl VideoDecoder for SidecarDecoder {
    fn open(&self, path: &Path, frames: &[i64]) -> CoreResult<Box<dyn VideoStream>> {
        if !path.is_file() {
            return Err(CoreError::InvalidPath(format!(
                "Video '{}' does not exist",
                path.display()
            )));
        }

        let mut wanted = frames.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        if let Some(&first) = wanted.first() {
            if first < 0 {
                return Err(CoreError::OperationFailed(format!(
                    "Cannot decode negative frame {} of {}",
                    first,
                    path.display()
                )));
            }
        }

        let mut stream = SidecarStream {
            path: path.to_path_buf(),
            position: 0,
            wanted,
            next: 0,
            last: None,
            child: None,
            frames: None,
        };
        if !stream.wanted.is_empty() {
            stream.start()?;
        }
        Ok(Box::new(stream))
    }
}

/// Forward-only reader over the frames one ffmpeg process emits.
struct SidecarStream {
    path: PathBuf,
    position: i64,
    /// Requested frames, ascending, in the order ffmpeg emits them
    wanted: Vec<i64>,
    /// Index into `wanted` of the next frame ffmpeg will emit
    next: usize,
    /// Most recent frame, kept so repeated reads of it succeed
    last: Option<(i64, Frame)>,
    child: Option<FfmpegChild>,
    frames: Option<Box<dyn Iterator<Item = Frame>>>,
}

impl SidecarStream {
    fn start(&mut self) -> CoreResult<()> {
        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner();
        cmd.input(self.path.to_string_lossy().as_ref());
        cmd.arg("-vf");
        cmd.arg(select_filter(&self.wanted));
        cmd.arg("-fps_mode");
        cmd.arg("passthrough");
        cmd.frames(self.wanted.len() as u32);
        cmd.rawvideo();

        log::debug!("Running frame decode command: {:?}", cmd.as_inner());

        let mut child = cmd
            .spawn()
            .map_err(|e| CoreError::CommandStart("ffmpeg".to_string(), e))?;
        let events = child.iter().map_err(|e| {
            CoreError::OperationFailed(format!("Failed to read ffmpeg output: {}", e))
        })?;

        self.frames = Some(Box::new(
            events
                .filter_frames()
                .map(|f| Frame::new(f.width, f.height, f.data)),
        ));
        self.child = Some(child);
        Ok(())
    }
}

impl VideoStream for SidecarStream {
    fn seek(&mut self, frame: i64) -> CoreResult<()> {
        if frame < 0 {
            return Err(CoreError::OperationFailed(format!(
                "Cannot seek to negative frame {} in {}",
                frame,
                self.path.display()
            )));
        }
        self.position = frame;
        Ok(())
    }

    fn decode(&mut self) -> CoreResult<Option<Frame>> {
        let target = self.position;
        if let Some((n, frame)) = &self.last {
            if *n == target {
                return Ok(Some(frame.clone()));
            }
        }
        let Some(frames) = self.frames.as_mut() else {
            return Ok(None);
        };

        // Frames before the target were requested but are not read again
        while let Some(&n) = self.wanted.get(self.next) {
            if n > target {
                break;
            }
            self.next += 1;
            let Some(frame) = frames.next() else {
                log::debug!(
                    "ffmpeg stopped before frame {} of {}",
                    n,
                    self.path.display()
                );
                return Ok(None);
            };
            if n == target {
                self.last = Some((n, frame.clone()));
                return Ok(Some(frame));
            }
        }

        // Not requested at open, or already passed
        Ok(None)
    }
}

impl Drop for SidecarStream {
    fn drop(&mut self) {
        // Dropping the reader first lets a blocked ffmpeg see a closed pipe
        self.frames = None;
        if let Some(mut child) = self.child.take() {
            if self.next < self.wanted.len() {
                let _ = child.kill();
            }
            match child.wait() {
                Ok(status) if !status.success() => log::debug!(
                    "ffmpeg exited with {} decoding {}",
                    status,
                    self.path.display()
                ),
                Ok(_) => {}
                Err(e) => log::debug!("Failed to wait for ffmpeg on {}: {}", self.path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_stream(wanted: Vec<i64>) -> SidecarStream {
        SidecarStream {
            path: PathBuf::from("952.mp4"),
            position: 0,
            wanted,
            next: 0,
            last: None,
            child: None,
            frames: None,
        }
    }

    #[test]
    fn test_open_missing_video() {
        let result = SidecarDecoder.open(Path::new("surely/not/here/952.mp4"), &[4]);
        assert!(matches!(result, Err(CoreError::InvalidPath(_))));
    }

    #[test]
    fn test_negative_seek_is_rejected() {
        let mut stream = idle_stream(vec![12]);
        assert!(stream.seek(-1).is_err());
        assert!(stream.seek(12).is_ok());
        assert_eq!(stream.position, 12);
    }

    #[test]
    fn test_select_filter_lists_every_frame() {
        assert_eq!(select_filter(&[4]), "select='eq(n,4)'");
        assert_eq!(
            select_filter(&[4, 174, 344]),
            "select='eq(n,4)+eq(n,174)+eq(n,344)'"
        );
    }

    #[test]
    fn test_forward_reads_follow_requested_order() {
        let mut stream = idle_stream(vec![4, 10, 20]);
        let outputs = [4u8, 10, 20].map(|value| Frame::new(1, 1, vec![value; 3]));
        stream.frames = Some(Box::new(outputs.into_iter()));

        stream.seek(10).unwrap();
        assert_eq!(stream.decode().unwrap().unwrap().data, vec![10; 3]);
        // Same frame again, e.g. from overlapping states
        assert_eq!(stream.decode().unwrap().unwrap().data, vec![10; 3]);
        // Frame 4 was skipped over
        stream.seek(4).unwrap();
        assert!(stream.decode().unwrap().is_none());
        stream.seek(20).unwrap();
        assert_eq!(stream.decode().unwrap().unwrap().data, vec![20; 3]);
        stream.seek(30).unwrap();
        assert!(stream.decode().unwrap().is_none());
    }
}
