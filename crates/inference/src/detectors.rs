//! Hand-landmark detectors.
//!
//! The ONNX detector expects a MediaPipe-style hand landmark model: a single
//! 224×224 RGB image scaled to `[0, 1]`, producing 21×3 landmark coordinates in
//! input pixels and a hand presence score. The whole frame is fed to the model;
//! there is no palm-detection stage, so the hand should dominate the image.

use data_contracts::{LandmarkSet, FEATURE_DIM};
use image::imageops::FilterType;
use image::RgbImage;

/// Side length of the square detector input.
pub const INPUT_SIZE: u32 = 224;
/// Minimum presence score for a detection to count.
pub const PRESENCE_THRESHOLD: f32 = 0.5;

/// Memory order of the detector input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLayout {
    /// `[1, 224, 224, 3]`, as exported from TFLite.
    #[default]
    Nhwc,
    /// `[1, 3, 224, 224]`.
    Nchw,
}

impl InputLayout {
    pub fn shape(self) -> [usize; 4] {
        let s = INPUT_SIZE as usize;
        match self {
            InputLayout::Nhwc => [1, s, s, 3],
            InputLayout::Nchw => [1, 3, s, s],
        }
    }
}

/// Resize `image` to the detector input and flatten it in `layout` order, scaled to `[0, 1]`.
pub fn prepare_input(image: &RgbImage, layout: InputLayout) -> Vec<f32> {
    let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    let plane = (INPUT_SIZE * INPUT_SIZE) as usize;
    match layout {
        InputLayout::Nhwc => resized
            .as_raw()
            .iter()
            .map(|&v| v as f32 / 255.0)
            .collect(),
        InputLayout::Nchw => {
            let mut data = vec![0.0f32; plane * 3];
            for (i, pixel) in resized.pixels().enumerate() {
                for c in 0..3 {
                    data[c * plane + i] = pixel[c] as f32 / 255.0;
                }
            }
            data
        }
    }
}

/// Turn raw model outputs into a landmark set in normalized image coordinates.
///
/// Returns `None` when the presence score is below `threshold`, the landmark
/// output is too short, or any coordinate is non-finite.
pub fn decode_landmarks(raw: &[f32], presence: f32, threshold: f32) -> Option<LandmarkSet> {
    if presence.is_nan() || presence < threshold || raw.len() < FEATURE_DIM {
        return None;
    }
    let scale = INPUT_SIZE as f32;
    let scaled: Vec<f32> = raw[..FEATURE_DIM].iter().map(|v| v / scale).collect();
    let set = LandmarkSet::from_flat(&scaled).ok()?;
    set.is_finite().then_some(set)
}

#[cfg(feature = "detector-onnx")]
pub use onnx::OnnxHandDetector;

#[cfg(feature = "detector-onnx")]
mod onnx {
    use super::{decode_landmarks, prepare_input, InputLayout, PRESENCE_THRESHOLD};
    use crate::InferenceError;
    use data_contracts::LandmarkSet;
    use ort::session::{builder::GraphOptimizationLevel, Session};
    use std::path::Path;
    use vision_core::{Frame, HandDetector};

    fn onnx_error(path: &Path, err: impl std::fmt::Display) -> InferenceError {
        InferenceError::Onnx {
            path: path.to_path_buf(),
            msg: err.to_string(),
        }
    }

    pub struct OnnxHandDetector {
        session: Session,
        layout: InputLayout,
        threshold: f32,
    }

    impl OnnxHandDetector {
        pub fn new(path: &Path) -> Result<Self, InferenceError> {
            let session = Session::builder()
                .map_err(|e| onnx_error(path, e))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| onnx_error(path, e))?
                .commit_from_file(path)
                .map_err(|e| onnx_error(path, e))?;
            tracing::info!(path = %path.display(), "loaded ONNX hand landmark model");
            Ok(Self {
                session,
                layout: InputLayout::default(),
                threshold: PRESENCE_THRESHOLD,
            })
        }

        pub fn with_layout(mut self, layout: InputLayout) -> Self {
            self.layout = layout;
            self
        }

        pub fn with_threshold(mut self, threshold: f32) -> Self {
            self.threshold = threshold;
            self
        }

        fn run(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, ort::Error> {
            let data = prepare_input(&frame.image, self.layout);
            let input = ort::value::Tensor::from_array((self.layout.shape().to_vec(), data))?;
            let outputs = self.session.run(ort::inputs![input])?;
            if outputs.len() < 2 {
                tracing::warn!(outputs = outputs.len(), "hand model must output landmarks and presence");
                return Ok(None);
            }
            let (_, landmarks) = outputs[0].try_extract_tensor::<f32>()?;
            let (_, presence) = outputs[1].try_extract_tensor::<f32>()?;
            let score = presence.first().copied().unwrap_or(0.0);
            Ok(decode_landmarks(landmarks, score, self.threshold))
        }
    }

    impl HandDetector for OnnxHandDetector {
        fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet> {
            match self.run(frame) {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(frame = frame.id, error = %err, "hand detector failed on frame");
                    None
                }
            }
        }
    }
}
