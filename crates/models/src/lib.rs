//! Burn models for hand-landmark sign classification in the SignForge stack.
//!
//! `SignClassifier` is a plain feed-forward network over the 63-value wrist-relative
//! feature vector. It is a pure Burn `Module` with no knowledge of labels or files; the
//! `training` and `inference` crates attach the label encoding and persistence.

use burn::module::Module;
use burn::nn;
use burn::record::{BinFileRecorder, FullPrecisionSettings, RecorderError};
use burn::tensor::activation::{relu, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use data_contracts::{ContractError, LabelEncoding, ModelLayout, TrainingMetadata};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SignClassifierConfig {
    pub input_dim: usize,
    /// Widths of the hidden blocks, in order.
    pub hidden: Vec<usize>,
    /// Dropout probability per hidden block; must match `hidden` in length.
    pub dropout: Vec<f64>,
    pub num_classes: usize,
}

impl Default for SignClassifierConfig {
    fn default() -> Self {
        Self {
            input_dim: data_contracts::FEATURE_DIM,
            hidden: vec![256, 128, 64],
            dropout: vec![0.3, 0.3, 0.2],
            num_classes: data_contracts::TSL_ALPHABET.len(),
        }
    }
}

impl SignClassifierConfig {
    pub fn with_classes(num_classes: usize) -> Self {
        Self {
            num_classes,
            ..Default::default()
        }
    }
}

/// Dense -> ReLU -> BatchNorm -> Dropout.
#[derive(Debug, Module)]
pub struct HiddenBlock<B: Backend> {
    linear: nn::Linear<B>,
    norm: nn::BatchNorm<B, 0>,
    dropout: nn::Dropout,
}

impl<B: Backend> HiddenBlock<B> {
    fn new(d_input: usize, d_output: usize, dropout: f64, device: &B::Device) -> Self {
        // Keras-equivalent BatchNormalization defaults (momentum 0.99, epsilon 1e-3).
        Self {
            linear: dense(d_input, d_output, device),
            norm: nn::BatchNormConfig::new(d_output)
                .with_epsilon(1e-3)
                .with_momentum(0.01)
                .init(device),
            dropout: nn::DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.linear.forward(input));
        let x = self.norm.forward(x);
        self.dropout.forward(x)
    }

    pub fn linear(&self) -> &nn::Linear<B> {
        &self.linear
    }

    pub fn norm(&self) -> &nn::BatchNorm<B, 0> {
        &self.norm
    }

    pub fn dropout_prob(&self) -> f64 {
        self.dropout.prob
    }
}

fn dense<B: Backend>(d_input: usize, d_output: usize, device: &B::Device) -> nn::Linear<B> {
    nn::LinearConfig::new(d_input, d_output)
        .with_initializer(nn::Initializer::XavierUniform { gain: 1.0 })
        .init(device)
}

#[derive(Debug, Module)]
pub struct SignClassifier<B: Backend> {
    blocks: Vec<HiddenBlock<B>>,
    head: nn::Linear<B>,
    input_dim: usize,
    num_classes: usize,
}

impl<B: Backend> SignClassifier<B> {
    pub fn new(cfg: SignClassifierConfig, device: &B::Device) -> Self {
        let mut blocks = Vec::with_capacity(cfg.hidden.len());
        let mut width = cfg.input_dim;
        for (i, &hidden) in cfg.hidden.iter().enumerate() {
            let p = cfg.dropout.get(i).copied().unwrap_or(0.0);
            blocks.push(HiddenBlock::new(width, hidden, p, device));
            width = hidden;
        }
        let num_classes = cfg.num_classes.max(1);
        Self {
            blocks,
            head: dense(width, num_classes, device),
            input_dim: cfg.input_dim,
            num_classes,
        }
    }

    /// Unnormalized class scores, shape `[batch, num_classes]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for block in &self.blocks {
            x = block.forward(x);
        }
        self.head.forward(x)
    }

    /// Class probabilities (softmax over the class axis).
    pub fn forward_probs(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(input), 1)
    }

    pub fn blocks(&self) -> &[HiddenBlock<B>] {
        &self.blocks
    }

    pub fn head(&self) -> &nn::Linear<B> {
        &self.head
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn save_checkpoint(&self, path: &Path) -> Result<(), RecorderError> {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        self.clone().save_file(path, &recorder)
    }
}

/// Load a classifier saved with [`SignClassifier::save_checkpoint`]. The config must
/// describe the same topology the checkpoint was trained with.
pub fn load_sign_classifier<B: Backend>(
    path: &Path,
    cfg: SignClassifierConfig,
    device: &B::Device,
) -> Result<SignClassifier<B>, RecorderError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    SignClassifier::<B>::new(cfg, device).load_file(path, &recorder, device)
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error("model weights not found: {0}")]
    MissingWeights(PathBuf),
    #[error("failed to load weights {path}: {msg}")]
    Recorder { path: PathBuf, msg: String },
    #[error("label mapping lists {mapping} classes but metadata expects {metadata}")]
    ClassMismatch { mapping: usize, metadata: usize },
}

/// A trained model directory loaded into memory: weights, label mapping and metadata.
#[derive(Debug)]
pub struct ModelBundle<B: Backend> {
    pub model: SignClassifier<B>,
    pub encoding: LabelEncoding,
    pub metadata: TrainingMetadata,
}

impl<B: Backend> ModelBundle<B> {
    pub fn load(dir: &Path, device: &B::Device) -> Result<Self, ModelLoadError> {
        let layout = ModelLayout::new(dir);
        let weights = layout.model();
        if !weights.is_file() {
            return Err(ModelLoadError::MissingWeights(weights));
        }
        let metadata = TrainingMetadata::load(&layout.metadata())?;
        let encoding = LabelEncoding::load(&layout.label_mapping())?;
        if encoding.len() != metadata.num_classes {
            return Err(ModelLoadError::ClassMismatch {
                mapping: encoding.len(),
                metadata: metadata.num_classes,
            });
        }
        let cfg = SignClassifierConfig {
            input_dim: metadata.input_shape,
            num_classes: metadata.num_classes,
            ..Default::default()
        };
        let model = load_sign_classifier::<B>(&weights, cfg, device).map_err(|e| {
            ModelLoadError::Recorder {
                path: weights.clone(),
                msg: e.to_string(),
            }
        })?;
        tracing::debug!(dir = %dir.display(), classes = encoding.len(), "loaded model bundle");
        Ok(Self {
            model,
            encoding,
            metadata,
        })
    }
}

pub mod prelude {
    pub use super::{
        load_sign_classifier, HiddenBlock, ModelBundle, ModelLoadError, SignClassifier,
        SignClassifierConfig,
    };
}
