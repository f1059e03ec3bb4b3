pub mod export;
pub mod landmarks_arg;

pub use cli_support::ToolConfig;
pub use export::{export_model, ExportError, ExportSummary, MODEL_JSON, WEIGHTS_SHARD};
