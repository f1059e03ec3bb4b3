use data_contracts::ContractError;
use landmark_dataset::DatasetError;
use std::path::PathBuf;
use thiserror::Error;

pub type TrainingResult<T> = Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("invalid training config: {0}")]
    InvalidConfig(String),
    #[error("label '{0}' is not in the model's label mapping")]
    UnknownLabel(String),
    #[error("cannot collate an empty batch")]
    EmptyBatch,
    #[error("loss became non-finite at epoch {epoch}")]
    NonFiniteLoss { epoch: usize },
    #[error("failed to record model at {path}: {msg}")]
    Recorder { path: PathBuf, msg: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
