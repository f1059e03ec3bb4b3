use std::path::Path;
use vision_core::HandDetector;

use crate::InferenceError;

/// Builds the hand detector used by landmark extraction.
///
/// There is no fallback detector: extraction without a real model would only
/// produce an empty table, so a missing backend or missing weights is an error.
pub struct DetectorFactory;

impl DetectorFactory {
    pub fn build(&self, weights: Option<&Path>) -> Result<Box<dyn HandDetector>, InferenceError> {
        let path = weights.ok_or(InferenceError::NoDetectorWeights)?;
        if !path.is_file() {
            return Err(InferenceError::DetectorWeightsNotFound(path.to_path_buf()));
        }
        self.load(path)
    }

    #[cfg(feature = "detector-onnx")]
    fn load(&self, path: &Path) -> Result<Box<dyn HandDetector>, InferenceError> {
        let detector = crate::detectors::OnnxHandDetector::new(path)?;
        Ok(Box::new(detector))
    }

    #[cfg(not(feature = "detector-onnx"))]
    fn load(&self, path: &Path) -> Result<Box<dyn HandDetector>, InferenceError> {
        Err(InferenceError::DetectorBackendUnavailable(
            path.to_path_buf(),
        ))
    }
}
