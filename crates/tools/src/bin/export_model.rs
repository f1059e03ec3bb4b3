use anyhow::Context;
use clap::Parser;
use cli_support::{init_logging, LogArgs, ToolConfig};
use signforge_tools::export_model;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "export_model",
    about = "Convert a trained model directory into a TensorFlow.js layers bundle"
)]
struct Args {
    /// Model directory written by train (defaults to paths.model_dir).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Bundle output directory (defaults to paths.export_dir).
    #[arg(long)]
    output: Option<PathBuf>,
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = ToolConfig::load();
    init_logging(&args.log.resolve(&cfg));
    cfg.report();

    let input = args.input.unwrap_or_else(|| cfg.model_dir.clone());
    let output = args.output.unwrap_or_else(|| cfg.export_dir.clone());
    let summary = export_model(&input, &output)
        .with_context(|| format!("failed to export {}", input.display()))?;
    println!(
        "Exported {} layer(s), {} weight tensor(s), {} byte(s) to {}",
        summary.layers,
        summary.weights.len(),
        summary.shard_bytes,
        summary.out_dir.display()
    );
    Ok(())
}
