//! OpenCV-backed video decoding (feature `video-opencv`).

use crate::interfaces::{Frame, VideoError, VideoOpener, VideoSource};
use image::RgbImage;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{imgproc, videoio};
use std::path::{Path, PathBuf};

pub struct OpenCvVideo {
    cap: videoio::VideoCapture,
    path: PathBuf,
    total: usize,
    position: u64,
}

impl OpenCvVideo {
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let open_err = |msg: String| VideoError::Open {
            path: path.to_path_buf(),
            msg,
        };
        let path_str = path
            .to_str()
            .ok_or_else(|| open_err("path is not valid UTF-8".into()))?;
        let cap = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;
        if !cap.is_opened().map_err(|e| open_err(e.to_string()))? {
            return Err(open_err("stream could not be opened".into()));
        }
        let total = cap
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .map(|v| if v.is_finite() && v > 0.0 { v as usize } else { 0 })
            .unwrap_or(0);
        Ok(Self {
            cap,
            path: path.to_path_buf(),
            total,
            position: 0,
        })
    }

    fn to_rgb(bgr: &Mat) -> Option<RgbImage> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).ok()?;
        let width = u32::try_from(rgb.cols()).ok()?;
        let height = u32::try_from(rgb.rows()).ok()?;
        let bytes = rgb.data_bytes().ok()?.to_vec();
        RgbImage::from_raw(width, height, bytes)
    }
}

impl VideoSource for OpenCvVideo {
    fn frame_count(&self) -> usize {
        self.total
    }

    fn skip_frame(&mut self) -> bool {
        match self.cap.grab() {
            Ok(true) => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn read_frame(&mut self) -> Option<Frame> {
        let mut bgr = Mat::default();
        let ok = self.cap.read(&mut bgr).unwrap_or(false);
        if !ok || bgr.empty() {
            return None;
        }
        let id = self.position;
        self.position += 1;
        match Self::to_rgb(&bgr) {
            Some(image) => Some(Frame::new(id, image).with_path(&self.path)),
            None => {
                tracing::warn!(path = %self.path.display(), frame = id, "failed to convert frame to RGB");
                None
            }
        }
    }
}

impl Drop for OpenCvVideo {
    fn drop(&mut self) {
        if let Err(err) = self.cap.release() {
            tracing::debug!(path = %self.path.display(), "video release failed: {err}");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCvVideoOpener;

impl VideoOpener for OpenCvVideoOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        Ok(Box::new(OpenCvVideo::open(path)?))
    }
}
