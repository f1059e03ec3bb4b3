use anyhow::Context;
use clap::Parser;
use cli_support::{init_logging, LogArgs, ToolConfig};
use landmark_dataset::read_table;
use std::path::PathBuf;
use training::util::{validate_backend_choice, BackendKind};
use training::{evaluate_dataset, ModelBundle, TrainBackend};

#[derive(Parser, Debug)]
#[command(
    name = "eval",
    about = "Evaluate a trained model directory on a landmark table (accuracy, loss, per-class report)"
)]
struct Args {
    /// Model directory written by train (defaults to paths.model_dir).
    #[arg(long)]
    model_dir: Option<PathBuf>,
    /// Landmark CSV to score (defaults to paths.landmarks_csv).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Evaluation batch size.
    #[arg(long, default_value_t = 256)]
    batch_size: usize,
    /// Also write the report as JSON.
    #[arg(long)]
    report_out: Option<PathBuf>,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    backend: BackendKind,
    #[command(flatten)]
    log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = ToolConfig::load();
    init_logging(&args.log.resolve(&cfg));
    cfg.report();
    validate_backend_choice(args.backend)?;

    let model_dir = args.model_dir.unwrap_or_else(|| cfg.model_dir.clone());
    let input = args.input.unwrap_or_else(|| cfg.landmarks_csv.clone());
    if !input.is_file() {
        anyhow::bail!("landmark table not found: {}", input.display());
    }

    let device = <TrainBackend as burn::tensor::backend::Backend>::Device::default();
    let bundle = ModelBundle::<TrainBackend>::load(&model_dir, &device)
        .with_context(|| format!("failed to load model from {}", model_dir.display()))?;
    let dataset = read_table(&input)
        .with_context(|| format!("failed to read landmark table {}", input.display()))?;

    let report = evaluate_dataset(
        &bundle.model,
        &bundle.encoding,
        &dataset,
        args.batch_size,
        &device,
    )?;
    println!("{}", report.report.to_table());
    println!(
        "accuracy {:.4}, loss {:.4} over {} rows",
        report.accuracy,
        report.loss,
        dataset.len()
    );
    if let Some(path) = args.report_out {
        report
            .save(&path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}
