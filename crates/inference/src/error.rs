use data_contracts::ContractError;
use models::ModelLoadError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("no hand detector weights configured (pass --detector-weights or set paths.detector_weights)")]
    NoDetectorWeights,
    #[error("hand detector weights not found: {0}")]
    DetectorWeightsNotFound(PathBuf),
    #[error("no hand detector backend compiled in (enable the detector-onnx feature) for {0}")]
    DetectorBackendUnavailable(PathBuf),
    #[error("failed to load ONNX model {path}: {msg}")]
    Onnx { path: PathBuf, msg: String },
    #[error("top-k must be at least 1")]
    InvalidTopK,
    #[error("could not read model output: {0}")]
    Output(String),
}
