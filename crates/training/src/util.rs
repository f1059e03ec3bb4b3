use anyhow::Context;
use burn::backend::Autodiff;
use clap::{Parser, ValueEnum};
use cli_support::{init_logging, LogArgs, ToolConfig};
use landmark_dataset::read_table;
use std::path::PathBuf;

use crate::{fit, save_artifacts, TrainBackend, TrainerConfig};

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BackendKind {
    NdArray,
    Wgpu,
}

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Train the hand-sign classifier on an extracted landmark table"
)]
pub struct TrainArgs {
    /// Landmark CSV written by extract_landmarks (defaults to paths.landmarks_csv).
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Model output directory (defaults to paths.model_dir).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Maximum number of epochs.
    #[arg(long)]
    pub epochs: Option<usize>,
    /// Batch size.
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Initial learning rate.
    #[arg(long)]
    pub lr: Option<f64>,
    /// Seed for the split, shuffling and weight init.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
    #[command(flatten)]
    pub log: LogArgs,
}

impl TrainArgs {
    /// Flags win over the config file; unset knobs keep the trainer defaults.
    pub fn trainer_config(&self, cfg: &ToolConfig) -> TrainerConfig {
        TrainerConfig {
            epochs: self.epochs.unwrap_or(cfg.epochs),
            batch_size: self.batch_size.unwrap_or(cfg.batch_size),
            learning_rate: self.lr.unwrap_or(cfg.learning_rate),
            seed: self.seed.unwrap_or(cfg.seed),
            ..TrainerConfig::default()
        }
    }
}

pub fn run_train(args: TrainArgs) -> anyhow::Result<()> {
    let cfg = ToolConfig::load();
    init_logging(&args.log.resolve(&cfg));
    cfg.report();
    validate_backend_choice(args.backend)?;

    let input = args.input.clone().unwrap_or_else(|| cfg.landmarks_csv.clone());
    let output = args.output.clone().unwrap_or_else(|| cfg.model_dir.clone());
    if !input.is_file() {
        anyhow::bail!("landmark table not found: {}", input.display());
    }
    let trainer_cfg = args.trainer_config(&cfg);
    trainer_cfg.validate()?;

    let dataset = read_table(&input)
        .with_context(|| format!("failed to read landmark table {}", input.display()))?;
    tracing::info!(
        rows = dataset.len(),
        classes = dataset.label_counts().len(),
        epochs = trainer_cfg.epochs,
        batch_size = trainer_cfg.batch_size,
        "starting training"
    );

    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    let outcome = fit::<Autodiff<TrainBackend>>(&dataset, &trainer_cfg, &device)
        .context("training failed; no model directory was written")?;
    save_artifacts(&outcome, &output)
        .with_context(|| format!("failed to write model to {}", output.display()))?;

    println!("{}", outcome.evaluation.report.to_table());
    println!(
        "test accuracy {:.4}, test loss {:.4}, {} epochs (best {})",
        outcome.evaluation.accuracy,
        outcome.evaluation.loss,
        outcome.metadata.epochs_trained,
        outcome.metadata.best_epoch + 1
    );
    println!("Saved model to {}", output.display());
    Ok(())
}

pub fn validate_backend_choice(kind: BackendKind) -> anyhow::Result<()> {
    let built_wgpu = cfg!(feature = "backend-wgpu");
    match (kind, built_wgpu) {
        (BackendKind::Wgpu, false) => {
            anyhow::bail!("backend-wgpu feature not enabled; rebuild with --features backend-wgpu or choose ndarray backend")
        }
        (BackendKind::NdArray, true) => {
            tracing::warn!("built with backend-wgpu; training will still use the WGPU backend despite --backend nd-array");
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_knobs() {
        let args = TrainArgs::parse_from(["train", "--epochs", "3", "--lr", "0.01"]);
        let mut cfg = ToolConfig::default();
        cfg.batch_size = 4;
        let tc = args.trainer_config(&cfg);
        assert_eq!(tc.epochs, 3);
        assert_eq!(tc.batch_size, 4);
        assert_eq!(tc.learning_rate, 0.01);
        assert_eq!(tc.early_stopping_patience, 15);
    }

    #[test]
    fn wgpu_requires_feature() {
        if !cfg!(feature = "backend-wgpu") {
            assert!(validate_backend_choice(BackendKind::Wgpu).is_err());
        }
        assert!(validate_backend_choice(BackendKind::NdArray).is_ok());
    }
}
