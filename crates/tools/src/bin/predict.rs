use anyhow::Context;
use clap::Parser;
use cli_support::{init_logging, LogArgs, ToolConfig};
use inference::SignPredictor;
use signforge_tools::landmarks_arg::read_landmarks;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "predict",
    about = "Classify one hand from 63 raw landmark values (x0,y0,z0,...)"
)]
struct Args {
    /// Model directory written by train (defaults to paths.model_dir).
    #[arg(long)]
    model_dir: Option<PathBuf>,
    /// A file holding the values, or an inline comma-separated list.
    #[arg(long)]
    landmarks: String,
    /// Number of ranked classes to print.
    #[arg(long, default_value_t = 3)]
    top_k: usize,
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = ToolConfig::load();
    init_logging(&args.log.resolve(&cfg));
    cfg.report();

    let model_dir = args.model_dir.unwrap_or_else(|| cfg.model_dir.clone());
    let values = read_landmarks(&args.landmarks)?;
    let predictor = SignPredictor::load(&model_dir)
        .with_context(|| format!("failed to load model from {}", model_dir.display()))?;
    let ranked = predictor.predict(&values, args.top_k)?;
    for (rank, p) in ranked.iter().enumerate() {
        println!("{}. {} ({:.2}%)", rank + 1, p.label, p.confidence * 100.0);
    }
    Ok(())
}
