use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use data_contracts::{LabelEncoding, LandmarkSet, TrainingMetadata, FEATURE_DIM};
use landmark_dataset::{normalize, normalize_flat};
use models::ModelBundle;
use std::path::Path;

use crate::{InferenceBackend, InferenceError};

/// One ranked class for a landmark set.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// A trained model directory ready to classify single hands.
pub struct SignPredictor {
    bundle: ModelBundle<InferenceBackend>,
    device: <InferenceBackend as Backend>::Device,
}

impl SignPredictor {
    pub fn load(dir: &Path) -> Result<Self, InferenceError> {
        let device = <InferenceBackend as Backend>::Device::default();
        let bundle = ModelBundle::<InferenceBackend>::load(dir, &device)?;
        tracing::info!(
            dir = %dir.display(),
            classes = bundle.encoding.len(),
            "loaded sign predictor"
        );
        Ok(Self { bundle, device })
    }

    pub fn encoding(&self) -> &LabelEncoding {
        &self.bundle.encoding
    }

    pub fn metadata(&self) -> &TrainingMetadata {
        &self.bundle.metadata
    }

    /// Classify raw detector output (`x0,y0,z0,...`, 63 values). The landmarks are
    /// made wrist-relative before they reach the model.
    pub fn predict(&self, raw: &[f32], top_k: usize) -> Result<Vec<Prediction>, InferenceError> {
        let features = normalize_flat(raw)?;
        self.rank(features.as_slice(), top_k)
    }

    pub fn predict_landmarks(
        &self,
        landmarks: &LandmarkSet,
        top_k: usize,
    ) -> Result<Vec<Prediction>, InferenceError> {
        self.rank(normalize(landmarks).as_slice(), top_k)
    }

    fn rank(&self, features: &[f32], top_k: usize) -> Result<Vec<Prediction>, InferenceError> {
        if top_k == 0 {
            return Err(InferenceError::InvalidTopK);
        }
        let input = Tensor::<InferenceBackend, 2>::from_data(
            TensorData::new(features.to_vec(), [1, FEATURE_DIM]),
            &self.device,
        );
        let probs = self
            .bundle
            .model
            .forward_probs(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| InferenceError::Output(format!("{e:?}")))?;

        let mut ranked: Vec<Prediction> = probs
            .into_iter()
            .enumerate()
            .filter_map(|(i, confidence)| {
                self.bundle.encoding.decode(i).map(|label| Prediction {
                    label: label.to_string(),
                    confidence,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranked.truncate(top_k);
        Ok(ranked)
    }
}
