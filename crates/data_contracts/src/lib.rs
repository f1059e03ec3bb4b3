//! Shared data contracts for landmarks, dataset manifests and trained-model artifacts.

pub mod landmarks;
pub mod manifest;
pub mod model;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use landmarks::{
    feature_columns, FeatureVector, LandmarkSet, AXES, FEATURE_DIM, NUM_LANDMARKS, WRIST,
};
pub use manifest::{default_alphabet, DatasetManifest, MANIFEST_FILE, TSL_ALPHABET};
pub use model::{
    AverageMetrics, ClassMetrics, ClassificationReport, EpochRecord, EvaluationReport,
    LabelEncoding, ModelLayout, TrainingHistory, TrainingMetadata,
};

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
    #[error("expected {expected} feature values, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },
    #[error("label '{0}' is not part of the alphabet")]
    UnknownLabel(String),
    #[error("inconsistent contract: {0}")]
    Inconsistent(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContractError> {
    let raw = fs::read(path).map_err(|e| ContractError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&raw).map_err(|e| ContractError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ContractError> {
    manifest::ensure_parent(path)?;
    let data = serde_json::to_vec_pretty(value).map_err(|e| ContractError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, data).map_err(|e| ContractError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
