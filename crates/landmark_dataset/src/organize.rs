//! Raw dataset discovery and standardized copying.
//!
//! Accepted raw layouts (they may be mixed):
//! - `<input>/<LETTER>/*.{jpg,png,mp4,...}` folders named by an alphabet letter;
//! - `<input>/<letter>.mp4` top-level videos whose upper-cased stem is a letter.
//!
//! Output: `<out>/<LETTER>/<LETTER>_0000.<ext>` plus `<out>/metadata.json`.

use crate::types::{DatasetError, DatasetResult};
use data_contracts::{DatasetManifest, MANIFEST_FILE};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use vision_core::MediaKind;

/// Source files grouped by label, sorted by file name within each label.
pub type RawLayout = BTreeMap<String, Vec<PathBuf>>;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn sorted_entries(dir: &Path) -> DatasetResult<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(io_err(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err(dir))?;
    entries.sort();
    Ok(entries)
}

/// Scan `input` for labeled media. Labels outside `alphabet` and unsupported files are
/// ignored; labels with no usable files are dropped.
pub fn scan_raw_dataset(input: &Path, alphabet: &[String]) -> DatasetResult<RawLayout> {
    if !input.is_dir() {
        return Err(DatasetError::Io {
            path: input.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "input dataset directory does not exist",
            ),
        });
    }
    let known = |name: &str| alphabet.iter().any(|a| a == name);
    let mut layout = RawLayout::new();

    for item in sorted_entries(input)? {
        if item.is_dir() {
            let Some(label) = item.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !known(label) {
                tracing::debug!(dir = %item.display(), "skipping folder outside the alphabet");
                continue;
            }
            let files: Vec<PathBuf> = sorted_entries(&item)?
                .into_iter()
                .filter(|f| f.is_file() && MediaKind::from_path(f).is_supported())
                .collect();
            if !files.is_empty() {
                tracing::info!(label, files = files.len(), "found label folder");
                layout.entry(label.to_string()).or_default().extend(files);
            }
        } else if item.is_file() && MediaKind::from_path(&item) == MediaKind::Video {
            let Some(label) = item
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_uppercase)
            else {
                continue;
            };
            if known(&label) {
                tracing::info!(label = %label, file = %item.display(), "found letter video");
                layout.entry(label).or_default().push(item);
            }
        }
    }

    if layout.is_empty() {
        return Err(DatasetError::NoValidDataset {
            path: input.to_path_buf(),
        });
    }
    Ok(layout)
}

/// Standardized destination name for the `index`-th file of `label`.
pub fn organized_name(label: &str, index: usize, source: &Path) -> String {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{label}_{index:04}.{ext}"),
        None => format!("{label}_{index:04}"),
    }
}

/// Copy every discovered file into the standardized layout under `output` and write the
/// manifest. Returns the manifest that was written.
pub fn organize_dataset(
    input: &Path,
    output: &Path,
    alphabet: &[String],
) -> DatasetResult<DatasetManifest> {
    let layout = scan_raw_dataset(input, alphabet)?;
    fs::create_dir_all(output).map_err(io_err(output))?;

    let mut organized = BTreeMap::new();
    for (label, files) in &layout {
        let label_dir = output.join(label);
        fs::create_dir_all(&label_dir).map_err(io_err(&label_dir))?;
        let mut rel_paths = Vec::with_capacity(files.len());
        for (i, src) in files.iter().enumerate() {
            let name = organized_name(label, i, src);
            let dest = label_dir.join(&name);
            fs::copy(src, &dest).map_err(io_err(src))?;
            rel_paths.push(format!("{label}/{name}"));
        }
        tracing::info!(label = %label, files = rel_paths.len(), "organized label");
        organized.insert(label.clone(), rel_paths);
    }

    let manifest = DatasetManifest::new(alphabet.to_vec(), organized);
    let manifest_path = output.join(MANIFEST_FILE);
    manifest
        .save(&manifest_path)
        .map_err(|source| DatasetError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;
    tracing::info!(
        classes = manifest.num_classes,
        files = manifest.total_files,
        path = %manifest_path.display(),
        "wrote manifest"
    );
    Ok(manifest)
}
