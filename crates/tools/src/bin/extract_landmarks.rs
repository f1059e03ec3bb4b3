use anyhow::Context;
use clap::Parser;
use cli_support::{init_logging, DetectorArgs, LogArgs, ToolConfig, WeightsOpts};
use inference::DetectorFactory;
use landmark_dataset::{extract_dataset, write_table, ExtractionConfig};
use std::path::{Path, PathBuf};
use vision_core::default_video_opener;

#[derive(Parser, Debug)]
#[command(
    name = "extract_landmarks",
    about = "Detect hand landmarks in an organized dataset and write the feature table"
)]
struct Args {
    /// Organized dataset root holding metadata.json (defaults to paths.processed_root).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Landmark CSV to write (defaults to paths.landmarks_csv).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Cap on samples collected per video (defaults to extraction.max_frames_per_video).
    #[arg(long)]
    max_frames: Option<usize>,
    /// Where to write the extraction summary JSON (defaults to <output>.summary.json).
    #[arg(long)]
    summary: Option<PathBuf>,
    #[command(flatten)]
    detector: DetectorArgs,
    #[command(flatten)]
    log: LogArgs,
}

fn summary_path(output: &Path) -> PathBuf {
    output.with_extension("summary.json")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = ToolConfig::load();
    init_logging(&args.log.resolve(&cfg));
    cfg.report();

    let input = args.input.unwrap_or_else(|| cfg.processed_root.clone());
    let output = args.output.unwrap_or_else(|| cfg.landmarks_csv.clone());
    let extraction = ExtractionConfig {
        max_frames_per_video: args.max_frames.unwrap_or(cfg.max_frames_per_video),
    };
    if !input.is_dir() {
        anyhow::bail!("dataset directory not found: {}", input.display());
    }

    let weights = WeightsOpts::resolve(&args.detector, &cfg);
    let mut detector = DetectorFactory
        .build(weights.detector_weights.as_deref())
        .context("cannot build hand detector")?;
    let videos = default_video_opener();

    let result = extract_dataset(&input, detector.as_mut(), videos.as_ref(), extraction)
        .with_context(|| format!("landmark extraction failed for {}", input.display()))?;
    drop(detector);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_table(&output, &result.dataset)
        .with_context(|| format!("failed to write {}", output.display()))?;
    let summary_out = args.summary.unwrap_or_else(|| summary_path(&output));
    result
        .summary
        .save(&summary_out)
        .with_context(|| format!("failed to write {}", summary_out.display()))?;

    let summary = &result.summary;
    for label in &summary.labels {
        println!("{}: {} sample(s) from {} file(s)", label.label, label.samples, label.files);
    }
    for label in summary.empty_labels() {
        tracing::warn!(label, "no samples extracted for label");
    }
    println!(
        "Extracted {} sample(s) from {} file(s) ({} image(s), {} video(s)); skipped: {} missing, {} unsupported, {} unreadable, {} without a hand",
        summary.total_samples(),
        summary.files_seen,
        summary.images,
        summary.videos,
        summary.missing,
        summary.unsupported,
        summary.unreadable,
        summary.no_detection
    );
    println!("Saved landmarks to {}", output.display());
    Ok(())
}
