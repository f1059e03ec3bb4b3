use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use data_contracts::{LabelEncoding, FEATURE_DIM};
use landmark_dataset::LandmarkDataset;

use crate::{TrainingError, TrainingResult};

/// Feature rows paired with encoded class indices, ready for batching.
#[derive(Debug, Clone, Default)]
pub struct EncodedSamples {
    features: Vec<f32>,
    targets: Vec<usize>,
}

impl EncodedSamples {
    /// Encode every sample with `encoding`. Labels missing from the encoding are an error.
    pub fn encode(dataset: &LandmarkDataset, encoding: &LabelEncoding) -> TrainingResult<Self> {
        let mut features = Vec::with_capacity(dataset.len() * FEATURE_DIM);
        let mut targets = Vec::with_capacity(dataset.len());
        for sample in dataset.samples() {
            let target = encoding
                .encode(&sample.label)
                .ok_or_else(|| TrainingError::UnknownLabel(sample.label.clone()))?;
            features.extend_from_slice(sample.features.as_slice());
            targets.push(target);
        }
        Ok(Self { features, targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.features[index * FEATURE_DIM..(index + 1) * FEATURE_DIM]
    }
}

#[derive(Debug, Clone)]
pub struct Batch<B: Backend> {
    /// Shape `[batch, 63]`.
    pub features: Tensor<B, 2>,
    /// Class indices, shape `[batch]`.
    pub targets: Tensor<B, 1, Int>,
}

/// Gather the rows at `indices` into tensors on `device`.
pub fn collate<B: Backend>(
    samples: &EncodedSamples,
    indices: &[usize],
    device: &B::Device,
) -> TrainingResult<Batch<B>> {
    if indices.is_empty() {
        return Err(TrainingError::EmptyBatch);
    }
    let mut features = Vec::with_capacity(indices.len() * FEATURE_DIM);
    let mut targets = Vec::with_capacity(indices.len());
    for &i in indices {
        features.extend_from_slice(samples.row(i));
        targets.push(samples.targets[i] as i64);
    }
    let n = indices.len();
    Ok(Batch {
        features: Tensor::from_data(TensorData::new(features, [n, FEATURE_DIM]), device),
        targets: Tensor::from_data(TensorData::new(targets, [n]), device),
    })
}
