#![recursion_limit = "256"]

pub mod detectors;
pub mod error;
pub mod factory;
pub mod predictor;

#[cfg(feature = "backend-wgpu")]
pub type InferenceBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type InferenceBackend = burn_ndarray::NdArray<f32>;

pub use detectors::{InputLayout, INPUT_SIZE, PRESENCE_THRESHOLD};
#[cfg(feature = "detector-onnx")]
pub use detectors::OnnxHandDetector;
pub use error::InferenceError;
pub use factory::DetectorFactory;
pub use predictor::{Prediction, SignPredictor};

pub mod prelude {
    pub use crate::factory::DetectorFactory;
    pub use crate::predictor::{Prediction, SignPredictor};
    pub use crate::{InferenceBackend, InferenceError};
}
