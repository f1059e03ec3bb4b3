use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::LoggingConfig;

pub const DEFAULT_CONFIG_NAME: &str = "signforge.toml";
pub const CONFIG_ENV: &str = "SIGNFORGE_CONFIG";

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Defaults,
    File(PathBuf),
    /// The file existed but could not be read or parsed; defaults are in effect.
    Invalid { path: PathBuf, error: String },
}

/// Default paths and knobs for every SignForge binary. CLI flags override these.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub processed_root: PathBuf,
    pub landmarks_csv: PathBuf,
    pub model_dir: PathBuf,
    pub export_dir: PathBuf,
    pub detector_weights: Option<PathBuf>,
    pub max_frames_per_video: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
    pub logging: LoggingConfig,
    pub source: ConfigSource,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            processed_root: PathBuf::from("processed_data"),
            landmarks_csv: PathBuf::from("landmarks.csv"),
            model_dir: PathBuf::from("model"),
            export_dir: PathBuf::from("public/model"),
            detector_weights: None,
            max_frames_per_video: 100,
            epochs: 100,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: 42,
            logging: LoggingConfig::default(),
            source: ConfigSource::Defaults,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ToolConfigFile {
    paths: Option<PathsSection>,
    extraction: Option<ExtractionSection>,
    training: Option<TrainingSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PathsSection {
    processed_root: Option<String>,
    landmarks_csv: Option<String>,
    model_dir: Option<String>,
    export_dir: Option<String>,
    detector_weights: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ExtractionSection {
    max_frames_per_video: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TrainingSection {
    epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
    json: Option<bool>,
}

impl ToolConfig {
    /// Load `$SIGNFORGE_CONFIG`, else `./signforge.toml`, else defaults. Never fails; see
    /// [`ToolConfig::source`] and [`ToolConfig::report`].
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .map(|p| expand_path(&p))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME));
        Self::load_or_default(&path)
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::parse_file(path) {
            Ok(cfg) => cfg,
            Err(error) => Self {
                source: ConfigSource::Invalid {
                    path: path.to_path_buf(),
                    error,
                },
                ..Self::default()
            },
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        Self::parse_file(path).ok()
    }

    fn parse_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let file: ToolConfigFile = toml::from_str(&raw).map_err(|e| e.to_string())?;
        let mut cfg = Self::from_file(file);
        cfg.source = ConfigSource::File(path.to_path_buf());
        Ok(cfg)
    }

    fn from_file(file: ToolConfigFile) -> Self {
        let defaults = Self::default();
        let paths = file.paths.unwrap_or_default();
        let extraction = file.extraction.unwrap_or_default();
        let training = file.training.unwrap_or_default();
        let logging = file.logging.unwrap_or_default();

        ToolConfig {
            processed_root: paths
                .processed_root
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.processed_root),
            landmarks_csv: paths
                .landmarks_csv
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.landmarks_csv),
            model_dir: paths
                .model_dir
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.model_dir),
            export_dir: paths
                .export_dir
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.export_dir),
            detector_weights: paths
                .detector_weights
                .filter(|v| !v.trim().is_empty())
                .map(|v| expand_path(&v)),
            max_frames_per_video: extraction
                .max_frames_per_video
                .unwrap_or(defaults.max_frames_per_video),
            epochs: training.epochs.unwrap_or(defaults.epochs),
            batch_size: training.batch_size.unwrap_or(defaults.batch_size),
            learning_rate: training.learning_rate.unwrap_or(defaults.learning_rate),
            seed: training.seed.unwrap_or(defaults.seed),
            logging: LoggingConfig {
                level: logging
                    .level
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or(defaults.logging.level),
                json: logging.json.unwrap_or(defaults.logging.json),
            },
            source: ConfigSource::Defaults,
        }
    }

    /// Log where the configuration came from and any suspicious values. Call after the
    /// subscriber is installed.
    pub fn report(&self) {
        match &self.source {
            ConfigSource::Defaults => tracing::debug!("no config file; using defaults"),
            ConfigSource::File(path) => {
                tracing::info!(path = %path.display(), "loaded config")
            }
            ConfigSource::Invalid { path, error } => tracing::warn!(
                path = %path.display(),
                %error,
                "ignoring invalid config file; using defaults"
            ),
        }
        if self.max_frames_per_video == 0 {
            tracing::warn!("extraction.max_frames_per_video is 0; extraction will be rejected");
        }
        if self.batch_size == 0 || self.epochs == 0 {
            tracing::warn!("training.epochs and training.batch_size must be at least 1");
        }
        if let Some(weights) = &self.detector_weights {
            if !weights.exists() {
                tracing::warn!(path = %weights.display(), "configured detector weights not found");
            }
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

/// Replace `${VAR}` with its value; unknown variables are left as written.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => out.push_str(&rest[start..start + 3 + end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
