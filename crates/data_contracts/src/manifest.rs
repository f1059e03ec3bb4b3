use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::ContractError;

/// File name of the manifest written by the dataset organizer.
pub const MANIFEST_FILE: &str = "metadata.json";

/// Turkish Sign Language fingerspelling alphabet (29 letters).
pub const TSL_ALPHABET: [&str; 29] = [
    "A", "B", "C", "Ç", "D", "E", "F", "G", "Ğ", "H", "I", "İ", "J", "K", "L", "M", "N", "O", "Ö",
    "P", "R", "S", "Ş", "T", "U", "Ü", "V", "Y", "Z",
];

pub fn default_alphabet() -> Vec<String> {
    TSL_ALPHABET.iter().map(|s| s.to_string()).collect()
}

/// Label -> file list mapping describing an organized dataset.
///
/// Paths in `dataset` are relative to the directory holding the manifest. Labels
/// iterate in sorted order; file order within a label is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub alphabet: Vec<String>,
    pub num_classes: usize,
    pub dataset: BTreeMap<String, Vec<String>>,
    pub total_files: usize,
}

impl DatasetManifest {
    pub fn new(alphabet: Vec<String>, dataset: BTreeMap<String, Vec<String>>) -> Self {
        let total_files = dataset.values().map(Vec::len).sum();
        Self {
            alphabet,
            num_classes: dataset.len(),
            dataset,
            total_files,
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        if !self.alphabet.is_empty() {
            if let Some(label) = self
                .dataset
                .keys()
                .find(|label| !self.alphabet.iter().any(|a| a == *label))
            {
                return Err(ContractError::UnknownLabel(label.clone()));
            }
        }
        if self.num_classes != self.dataset.len() {
            return Err(ContractError::Inconsistent(format!(
                "num_classes {} but dataset lists {} labels",
                self.num_classes,
                self.dataset.len()
            )));
        }
        let listed: usize = self.dataset.values().map(Vec::len).sum();
        if self.total_files != listed {
            return Err(ContractError::Inconsistent(format!(
                "total_files {} but dataset lists {listed} files",
                self.total_files
            )));
        }
        if let Some((label, _)) = self
            .dataset
            .iter()
            .find(|(_, files)| files.iter().any(|f| f.trim().is_empty()))
        {
            return Err(ContractError::Inconsistent(format!(
                "label '{label}' has an empty file path"
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let manifest: Self = crate::read_json(path)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<(), ContractError> {
        crate::write_json(path, self)
    }

    /// Iterate `(label, relative path)` pairs in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dataset
            .iter()
            .flat_map(|(label, files)| files.iter().map(move |f| (label.as_str(), f.as_str())))
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), ContractError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).map_err(|e| ContractError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
