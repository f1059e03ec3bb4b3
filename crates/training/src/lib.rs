//! Training for the SignForge landmark classifier: label encoding, the Adam loop with
//! early stopping and plateau decay, evaluation, and model-directory artifacts.

pub mod artifacts;
pub mod callbacks;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod plot;
pub mod trainer;
pub mod util;

pub use artifacts::{save_artifacts, staging_dir};
pub use callbacks::{EarlyStopping, ReduceLrOnPlateau, StopDecision};
pub use dataset::{collate, Batch, EncodedSamples};
pub use error::{TrainingError, TrainingResult};
pub use metrics::{accuracy, classification_report};
pub use models::{ModelBundle, SignClassifier, SignClassifierConfig};
pub use plot::{render_history, save_history_plot};
pub use trainer::{evaluate, evaluate_dataset, fit, Evaluation, TrainerConfig, TrainingOutcome};
pub use util::{run_train, TrainArgs};

/// Backend alias for training/eval (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn_ndarray::NdArray<f32>;
