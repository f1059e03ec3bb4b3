//! Evenly spaced frame sampling from videos of unknown length.

use crate::types::{DatasetError, DatasetResult};
use data_contracts::LandmarkSet;
use vision_core::{HandDetector, VideoSource};

/// Which frame positions get decoded for a video of `total` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    pub interval: usize,
    pub max_frames: usize,
}

impl SamplingPlan {
    pub fn new(total_frames: usize, max_frames: usize) -> DatasetResult<Self> {
        if max_frames == 0 {
            return Err(DatasetError::InvalidConfig(
                "max frames per video must be at least 1".into(),
            ));
        }
        Ok(Self {
            interval: (total_frames / max_frames).max(1),
            max_frames,
        })
    }

    /// 0-based stream positions that are decoded.
    pub fn should_process(&self, position: usize) -> bool {
        position % self.interval == 0
    }
}

/// Run the detector on evenly spaced frames until `max_frames` hands were found or the
/// stream ends. Frames without a detection are skipped and do not count toward the cap.
pub fn sample_video<V, D>(
    video: &mut V,
    detector: &mut D,
    max_frames: usize,
) -> DatasetResult<Vec<LandmarkSet>>
where
    V: VideoSource + ?Sized,
    D: HandDetector + ?Sized,
{
    let total = video.frame_count();
    let plan = SamplingPlan::new(total, max_frames)?;
    let mut found = Vec::new();
    if total == 0 {
        return Ok(found);
    }

    let mut position = 0usize;
    while found.len() < plan.max_frames {
        if plan.should_process(position) {
            let Some(frame) = video.read_frame() else {
                break;
            };
            if let Some(landmarks) = detector.detect(&frame) {
                found.push(landmarks);
            }
        } else if !video.skip_frame() {
            break;
        }
        position += 1;
    }
    tracing::debug!(
        total,
        interval = plan.interval,
        visited = position,
        detections = found.len(),
        "sampled video"
    );
    Ok(found)
}
