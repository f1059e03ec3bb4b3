use data_contracts::LandmarkSet;
use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A decoded RGB frame and where it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Image files use 0; video frames carry their 0-based stream position.
    pub id: u64,
    pub image: RgbImage,
    /// Source file, if the frame was loaded from disk.
    pub path: Option<PathBuf>,
}

impl Frame {
    pub fn new(id: u64, image: RgbImage) -> Self {
        Self {
            id,
            image,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Runs keypoint detection on a frame.
///
/// Implementations are usually heavy (model weights, internal buffers): build one
/// per extraction run and pass it by `&mut` through the pipeline.
pub trait HandDetector {
    /// Returns the first detected hand, or `None` when no hand is found.
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet>;
}

impl<D: HandDetector + ?Sized> HandDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet> {
        (**self).detect(frame)
    }
}

/// A video stream opened for sequential reading. Dropping the source releases the
/// underlying handle.
pub trait VideoSource {
    /// Total frame count as reported by the container; 0 when unknown or empty.
    fn frame_count(&self) -> usize;
    /// Advance past the next frame without decoding it. Returns `false` at end of stream.
    fn skip_frame(&mut self) -> bool;
    /// Decode the next frame. Returns `None` at end of stream or on decode failure.
    fn read_frame(&mut self) -> Option<Frame>;
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("no video backend compiled in (enable the video-opencv feature) for {0}")]
    BackendUnavailable(PathBuf),
    #[error("failed to open video {path}: {msg}")]
    Open { path: PathBuf, msg: String },
}

/// Opens video files as [`VideoSource`]s.
pub trait VideoOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError>;
}

/// Opener used when no video backend is available; every open fails, so videos are
/// skipped with a warning by the extraction stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVideoBackend;

impl VideoOpener for NoVideoBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        Err(VideoError::BackendUnavailable(path.to_path_buf()))
    }
}

/// In-memory video, mostly for tests and pre-decoded clips.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<RgbImage>,
    cursor: usize,
    reported_count: Option<usize>,
    decoded: usize,
}

impl FrameSequence {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    /// Override the container frame count (some containers misreport it).
    pub fn with_reported_count(mut self, count: usize) -> Self {
        self.reported_count = Some(count);
        self
    }

    /// Number of frames actually decoded so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl VideoSource for FrameSequence {
    fn frame_count(&self) -> usize {
        self.reported_count.unwrap_or(self.frames.len())
    }

    fn skip_frame(&mut self) -> bool {
        if self.cursor >= self.frames.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn read_frame(&mut self) -> Option<Frame> {
        let image = self.frames.get(self.cursor)?.clone();
        let frame = Frame::new(self.cursor as u64, image);
        self.cursor += 1;
        self.decoded += 1;
        Some(frame)
    }
}
