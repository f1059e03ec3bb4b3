//! Contracts for the trained-model directory: label encoding, training metadata,
//! evaluation report and per-epoch history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ContractError;

pub const MODEL_FILE: &str = "model.bin";
pub const LABEL_MAPPING_FILE: &str = "label_mapping.json";
pub const METADATA_FILE: &str = "model_metadata.json";
pub const REPORT_FILE: &str = "classification_report.json";
pub const HISTORY_FILE: &str = "training_history.json";
pub const HISTORY_PLOT_FILE: &str = "training_history.png";

/// File layout of a model directory. The model record, label mapping and metadata
/// form one deployable unit and always travel together.
#[derive(Debug, Clone)]
pub struct ModelLayout {
    pub root: PathBuf,
}

impl ModelLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn model(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    pub fn label_mapping(&self) -> PathBuf {
        self.root.join(LABEL_MAPPING_FILE)
    }

    pub fn metadata(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn report(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }

    pub fn history(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn history_plot(&self) -> PathBuf {
        self.root.join(HISTORY_PLOT_FILE)
    }

    /// Files that must be present for inference or export.
    pub fn required_files(&self) -> [PathBuf; 3] {
        [self.model(), self.label_mapping(), self.metadata()]
    }
}

/// Bijective label <-> class index mapping. Indices follow sorted label order.
///
/// Serialized as `{"0": "A", "1": "B", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<usize, String>",
    try_from = "BTreeMap<usize, String>"
)]
pub struct LabelEncoding {
    classes: Vec<String>,
}

impl LabelEncoding {
    /// Fit on observed labels: distinct values, sorted, mapped to `0..C`.
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn from_classes(classes: Vec<String>) -> Result<Self, ContractError> {
        let mut sorted = classes.clone();
        sorted.sort();
        sorted.dedup();
        if sorted != classes {
            return Err(ContractError::Inconsistent(
                "label encoding classes must be unique and sorted".into(),
            ));
        }
        Ok(Self { classes })
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn load(path: &Path) -> Result<Self, ContractError> {
        crate::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ContractError> {
        crate::write_json(path, self)
    }
}

impl From<LabelEncoding> for BTreeMap<usize, String> {
    fn from(enc: LabelEncoding) -> Self {
        enc.classes.into_iter().enumerate().collect()
    }
}

impl TryFrom<BTreeMap<usize, String>> for LabelEncoding {
    type Error = ContractError;

    fn try_from(map: BTreeMap<usize, String>) -> Result<Self, Self::Error> {
        if let Some((pos, (idx, _))) = map.iter().enumerate().find(|(pos, (idx, _))| pos != *idx) {
            return Err(ContractError::Inconsistent(format!(
                "label mapping index {idx} found where {pos} was expected"
            )));
        }
        Self::from_classes(map.into_values().collect())
    }
}

/// Summary written next to the model as `model_metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub num_classes: usize,
    pub classes: Vec<String>,
    pub input_shape: usize,
    pub test_accuracy: f32,
    pub test_loss: f32,
    pub epochs_trained: usize,
    /// 0-based epoch whose parameters were restored.
    pub best_epoch: usize,
    pub total_samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
}

impl TrainingMetadata {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.num_classes != self.classes.len() {
            return Err(ContractError::Inconsistent(format!(
                "num_classes {} but {} classes listed",
                self.num_classes,
                self.classes.len()
            )));
        }
        if self.train_samples + self.test_samples != self.total_samples {
            return Err(ContractError::Inconsistent(format!(
                "train {} + test {} != total {}",
                self.train_samples, self.test_samples, self.total_samples
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let meta: Self = crate::read_json(path)?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn save(&self, path: &Path) -> Result<(), ContractError> {
        crate::write_json(path, self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

/// Per-class precision/recall/F1 with macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f32,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    /// Render as a plain-text table for logs.
    pub fn to_table(&self) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);
        let mut out = format!(
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for c in &self.classes {
            out.push_str(&format!(
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                c.label, c.precision, c.recall, c.f1, c.support
            ));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        ));
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            out.push_str(&format!(
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                name, avg.precision, avg.recall, avg.f1, avg.support
            ));
        }
        out
    }
}

/// Test-split evaluation of the restored model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f32,
    pub loss: f32,
    pub report: ClassificationReport,
}

impl EvaluationReport {
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        crate::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ContractError> {
        crate::write_json(path, self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub val_loss: f32,
    pub val_accuracy: f32,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), ContractError> {
        crate::write_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_sorted_and_bijective() {
        let enc = LabelEncoding::fit(["Ş", "B", "A", "B", "Ç"]);
        assert_eq!(enc.classes(), &["A", "B", "Ç", "Ş"]);
        for (i, label) in enc.classes().iter().enumerate() {
            assert_eq!(enc.encode(label), Some(i));
            assert_eq!(enc.decode(i), Some(label.as_str()));
        }
        assert_eq!(enc.encode("Z"), None);
        assert_eq!(enc.decode(4), None);
    }

    #[test]
    fn encoding_serializes_index_to_label() {
        let enc = LabelEncoding::fit(["B", "A"]);
        let json = serde_json::to_value(&enc).unwrap();
        assert_eq!(json, serde_json::json!({"0": "A", "1": "B"}));
        let back: LabelEncoding = serde_json::from_value(json).unwrap();
        assert_eq!(back, enc);
    }

    #[test]
    fn encoding_rejects_gaps() {
        let json = serde_json::json!({"0": "A", "2": "B"});
        assert!(serde_json::from_value::<LabelEncoding>(json).is_err());
    }

    #[test]
    fn metadata_counts_must_add_up() {
        let meta = TrainingMetadata {
            num_classes: 2,
            classes: vec!["A".into(), "B".into()],
            input_shape: 63,
            test_accuracy: 1.0,
            test_loss: 0.1,
            epochs_trained: 3,
            best_epoch: 2,
            total_samples: 10,
            train_samples: 8,
            test_samples: 3,
        };
        assert!(meta.validate().is_err());
    }
}
