use anyhow::Context;
use clap::Parser;
use cli_support::{init_logging, LogArgs, ToolConfig};
use data_contracts::default_alphabet;
use landmark_dataset::organize_dataset;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "prepare_dataset",
    about = "Organize raw sign images and videos into <label>/<label>_NNNN files plus metadata.json"
)]
struct Args {
    /// Raw dataset root: one folder per letter, or videos named after the letter.
    #[arg(long)]
    input: PathBuf,
    /// Output root (defaults to paths.processed_root).
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

    if !args.input.is_dir() {
        anyhow::bail!("input directory not found: {}", args.input.display());
    }
    let output = args.output.unwrap_or_else(|| cfg.processed_root.clone());
    let manifest = organize_dataset(&args.input, &output, &default_alphabet())
        .with_context(|| format!("failed to organize {}", args.input.display()))?;

    for (label, files) in &manifest.dataset {
        println!("{label}: {} file(s)", files.len());
    }
    println!(
        "Organized {} file(s) across {} label(s) into {}",
        manifest.total_files,
        manifest.num_classes,
        output.display()
    );
    Ok(())
}
