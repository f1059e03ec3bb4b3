//! Core types, error definitions, and data structures for landmark_dataset.

use data_contracts::{ContractError, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("manifest not found: {path}")]
    ManifestMissing { path: PathBuf },
    #[error("invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ContractError,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no samples extracted from {files} files; nothing to train on")]
    EmptyDataset { files: usize },
    #[error("dataset needs at least 2 classes, found {found}")]
    TooFewClasses { found: usize },
    #[error("class '{label}' has {count} sample(s); at least 2 are needed to appear in both train and test splits")]
    InsufficientSamples { label: String, count: usize },
    #[error("no valid dataset found under {path}")]
    NoValidDataset { path: PathBuf },
    #[error("table error at {path}: {msg}")]
    Table { path: PathBuf, msg: String },
    #[error("csv error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One training row: normalized landmarks plus the class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: String,
    pub features: FeatureVector,
}

/// Ordered collection of samples. The column schema is fixed:
/// `label, x0, y0, z0, ..., x20, y20, z20`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkDataset {
    samples: Vec<Sample>,
}

impl LandmarkDataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|s| s.label.as_str())
    }

    /// Samples per label, in sorted label order.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Fail unless the dataset can be handed to training at all.
    pub fn ensure_non_empty(&self) -> DatasetResult<()> {
        if self.is_empty() {
            return Err(DatasetError::EmptyDataset { files: 0 });
        }
        Ok(())
    }
}

impl FromIterator<Sample> for LandmarkDataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub label: String,
    pub files: usize,
    pub samples: usize,
}

/// Diagnostics of one extraction run. Per-item failures never abort the run; they are
/// counted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub labels: Vec<LabelSummary>,
    pub files_seen: usize,
    pub images: usize,
    pub videos: usize,
    pub missing: usize,
    pub unsupported: usize,
    pub unreadable: usize,
    pub no_detection: usize,
    pub warnings: Vec<String>,
}

impl ExtractionSummary {
    pub fn total_samples(&self) -> usize {
        self.labels.iter().map(|l| l.samples).sum()
    }

    pub fn empty_labels(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(|l| l.samples == 0)
            .map(|l| l.label.as_str())
    }

    /// Persist the summary as pretty JSON next to the extracted table.
    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub(crate) fn warn(&mut self, msg: String) {
        tracing::warn!("{msg}");
        self.warnings.push(msg);
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub dataset: LandmarkDataset,
    pub summary: ExtractionSummary,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Cap on landmark sets collected per video (detections, not frames visited).
    pub max_frames_per_video: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_frames_per_video: 100,
        }
    }
}
