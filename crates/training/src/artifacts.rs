//! Model directory emission.
//!
//! Files are written into a hidden sibling staging directory and only moved into the
//! final location once every required artifact exists.

use burn::tensor::backend::Backend;
use data_contracts::ModelLayout;
use std::fs;
use std::path::{Path, PathBuf};

use crate::plot::save_history_plot;
use crate::trainer::TrainingOutcome;
use crate::{TrainingError, TrainingResult};

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> TrainingError + '_ {
    move |source| TrainingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `<parent>/.<name>.staging` next to `out_dir`.
pub fn staging_dir(out_dir: &Path) -> PathBuf {
    let name = out_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    out_dir.with_file_name(format!(".{name}.staging"))
}

fn write_all<B: Backend>(outcome: &TrainingOutcome<B>, layout: &ModelLayout) -> TrainingResult<()> {
    let weights = layout.model();
    outcome
        .model
        .save_checkpoint(&weights)
        .map_err(|e| TrainingError::Recorder {
            path: weights.clone(),
            msg: e.to_string(),
        })?;
    outcome.encoding.save(&layout.label_mapping())?;
    outcome.metadata.save(&layout.metadata())?;
    outcome.evaluation.save(&layout.report())?;
    outcome.history.save(&layout.history())?;
    if let Err(e) = save_history_plot(&outcome.history, &layout.history_plot()) {
        tracing::warn!(error = %e, "could not draw training history plot");
    }
    Ok(())
}

fn promote(staging: &Path, out_dir: &Path) -> TrainingResult<()> {
    if !out_dir.exists() {
        return fs::rename(staging, out_dir).map_err(io_err(out_dir));
    }
    for entry in fs::read_dir(staging).map_err(io_err(staging))? {
        let src = entry.map_err(io_err(staging))?.path();
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = out_dir.join(name);
        fs::rename(&src, &dest).map_err(io_err(&dest))?;
    }
    fs::remove_dir(staging).map_err(io_err(staging))
}

/// Write every artifact of `outcome` into `out_dir` and return its layout. Nothing
/// appears in `out_dir` unless all required files were written.
pub fn save_artifacts<B: Backend>(
    outcome: &TrainingOutcome<B>,
    out_dir: &Path,
) -> TrainingResult<ModelLayout> {
    if let Some(parent) = out_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let staging = staging_dir(out_dir);
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(io_err(&staging))?;
    }
    fs::create_dir_all(&staging).map_err(io_err(&staging))?;

    let staged = ModelLayout::new(&staging);
    if let Err(e) = write_all(outcome, &staged) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }
    promote(&staging, out_dir)?;

    let layout = ModelLayout::new(out_dir);
    tracing::info!(dir = %out_dir.display(), "saved model artifacts");
    Ok(layout)
}
