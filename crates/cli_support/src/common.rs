use clap::Args;
use std::path::PathBuf;

use crate::config::ToolConfig;
use crate::logging::LoggingConfig;

/// Logging flags shared by every binary.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Log filter (e.g. `info`, `debug`, `landmark_dataset=trace`); `RUST_LOG` wins if set.
    #[arg(long)]
    pub log_level: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}

impl LogArgs {
    /// Merge with the config file: flags win, then `[logging]`, then defaults.
    pub fn resolve(&self, cfg: &ToolConfig) -> LoggingConfig {
        LoggingConfig {
            level: self
                .log_level
                .clone()
                .unwrap_or_else(|| cfg.logging.level.clone()),
            json: self.log_json || cfg.logging.json,
        }
    }
}

/// Keypoint detector selection.
#[derive(Debug, Clone, Default, Args)]
pub struct DetectorArgs {
    /// Hand-landmark ONNX model (requires the `detector-onnx` feature).
    #[arg(long)]
    pub detector_weights: Option<PathBuf>,
}

/// Optional detector weights path, resolved against the config file.
#[derive(Debug, Clone)]
pub struct WeightsOpts {
    pub detector_weights: Option<PathBuf>,
}

impl WeightsOpts {
    pub fn new(detector_weights: Option<PathBuf>) -> Self {
        Self { detector_weights }
    }

    pub fn resolve(args: &DetectorArgs, cfg: &ToolConfig) -> Self {
        Self::new(
            args.detector_weights
                .clone()
                .or_else(|| cfg.detector_weights.clone()),
        )
    }
}
