//! Shared CLI helpers for SignForge binaries.

pub mod common;
pub mod config;
pub mod logging;

pub use common::{DetectorArgs, LogArgs, WeightsOpts};
pub use config::{ConfigSource, ToolConfig, CONFIG_ENV, DEFAULT_CONFIG_NAME};
pub use logging::{init_logging, LoggingConfig};
