use data_contracts::{default_alphabet, DatasetManifest, LandmarkSet, MANIFEST_FILE, NUM_LANDMARKS};
use image::{Rgb, RgbImage};
use landmark_dataset::{
    extract_dataset, organize_dataset, read_table, stratified_split, write_table, DatasetError,
    ExtractionConfig,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use vision_core::{
    Frame, FrameSequence, HandDetector, NoVideoBackend, VideoError, VideoOpener, VideoSource,
};

/// Finds a hand whenever the top-left pixel is bright red; the landmarks encode the
/// green channel so different files give different features.
struct RedHandDetector {
    calls: usize,
}

impl HandDetector for RedHandDetector {
    fn detect(&mut self, frame: &Frame) -> Option<LandmarkSet> {
        self.calls += 1;
        let Rgb([r, g, _]) = *frame.image.get_pixel(0, 0);
        if r < 128 {
            return None;
        }
        let base = g as f32 / 255.0;
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        for (i, p) in points.iter_mut().enumerate() {
            *p = [0.3 + base + i as f32 * 0.01, 0.5 - i as f32 * 0.005, 0.0];
        }
        Some(LandmarkSet::new(points))
    }
}

/// Opens every path as a 10-frame in-memory clip of red frames.
struct RedClips;

impl VideoOpener for RedClips {
    fn open(&self, _path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        let frames = (0..10)
            .map(|i| RgbImage::from_pixel(4, 4, Rgb([255, i * 20, 0])))
            .collect();
        Ok(Box::new(FrameSequence::new(frames)))
    }
}

fn write_png(path: &Path, color: [u8; 3]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_pixel(8, 8, Rgb(color)).save(path).unwrap();
}

fn write_manifest(root: &Path, entries: &[(&str, &[&str])]) -> DatasetManifest {
    let dataset: BTreeMap<String, Vec<String>> = entries
        .iter()
        .map(|(label, files)| {
            (
                label.to_string(),
                files.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect();
    let manifest = DatasetManifest::new(default_alphabet(), dataset);
    manifest.save(&root.join(MANIFEST_FILE)).unwrap();
    manifest
}

#[test]
fn single_image_yields_one_wrist_relative_sample() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write_png(&root.join("A/A_0000.png"), [255, 10, 0]);
    write_manifest(root, &[("A", &["A/A_0000.png"])]);

    let mut detector = RedHandDetector { calls: 0 };
    let out = extract_dataset(root, &mut detector, &NoVideoBackend, ExtractionConfig::default())?;
    assert_eq!(out.dataset.len(), 1);
    let sample = &out.dataset.samples()[0];
    assert_eq!(sample.label, "A");
    assert_eq!(&sample.features.as_slice()[0..3], &[0.0, 0.0, 0.0]);
    assert_eq!(out.summary.total_samples(), 1);
    assert_eq!(detector.calls, 1);
    Ok(())
}

#[test]
fn unreadable_files_end_in_empty_dataset() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    fs::create_dir_all(root.join("B"))?;
    fs::write(root.join("B/B_0000.png"), b"not an image")?;
    fs::write(root.join("B/B_0001.gif"), b"GIF89a")?;
    write_manifest(
        root,
        &[("B", &["B/B_0000.png", "B/B_0001.gif", "B/B_0002.jpg"])],
    );

    let mut detector = RedHandDetector { calls: 0 };
    match extract_dataset(root, &mut detector, &NoVideoBackend, ExtractionConfig::default()) {
        Err(DatasetError::EmptyDataset { files }) => assert_eq!(files, 3),
        other => panic!("expected EmptyDataset, got {other:?}"),
    }
    assert_eq!(detector.calls, 0);
    Ok(())
}

#[test]
fn missing_manifest_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut detector = RedHandDetector { calls: 0 };
    let err = extract_dataset(
        tmp.path(),
        &mut detector,
        &NoVideoBackend,
        ExtractionConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DatasetError::ManifestMissing { .. }));
}

#[test]
fn videos_are_sampled_and_skips_are_counted() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    fs::create_dir_all(root.join("C"))?;
    fs::write(root.join("C/C_0000.mp4"), b"fake container")?;
    write_png(&root.join("D/D_0000.png"), [0, 0, 0]);
    write_png(&root.join("D/D_0001.png"), [200, 50, 0]);
    write_manifest(
        root,
        &[
            ("C", &["C/C_0000.mp4", "C/C_0001.mp4"]),
            ("D", &["D/D_0000.png", "D/D_0001.png"]),
        ],
    );

    let mut detector = RedHandDetector { calls: 0 };
    let cfg = ExtractionConfig {
        max_frames_per_video: 4,
    };
    let out = extract_dataset(root, &mut detector, &RedClips, cfg)?;

    // interval floor(10 / 4) = 2 visits 0,2,4,6 before the cap.
    let counts = out.dataset.label_counts();
    assert_eq!(counts["C"], 4);
    assert_eq!(counts["D"], 1);
    assert_eq!(out.summary.missing, 1);
    assert_eq!(out.summary.no_detection, 1);
    let labels: Vec<&str> = out.dataset.labels().collect();
    assert_eq!(labels, vec!["C", "C", "C", "C", "D"]);
    Ok(())
}

#[test]
fn videos_without_backend_warn_but_images_survive() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    fs::create_dir_all(root.join("E"))?;
    fs::write(root.join("E/E_0000.mp4"), b"fake container")?;
    write_png(&root.join("F/F_0000.png"), [255, 0, 0]);
    write_manifest(root, &[("E", &["E/E_0000.mp4"]), ("F", &["F/F_0000.png"])]);

    let mut detector = RedHandDetector { calls: 0 };
    let out = extract_dataset(root, &mut detector, &NoVideoBackend, ExtractionConfig::default())?;
    assert_eq!(out.dataset.len(), 1);
    assert_eq!(out.summary.unreadable, 1);
    assert_eq!(out.summary.empty_labels().collect::<Vec<_>>(), vec!["E"]);
    assert!(out.summary.warnings.iter().any(|w| w.contains("E_0000.mp4")));
    Ok(())
}

#[test]
fn organize_extract_store_and_split() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let raw = tmp.path().join("raw");
    let processed = tmp.path().join("processed");
    for (i, label) in ["A", "B"].iter().enumerate() {
        for j in 0..5u8 {
            write_png(
                &raw.join(label).join(format!("{j}.png")),
                [255, 40 * i as u8 + j, 0],
            );
        }
    }
    organize_dataset(&raw, &processed, &default_alphabet())?;

    let mut detector = RedHandDetector { calls: 0 };
    let out = extract_dataset(
        &processed,
        &mut detector,
        &NoVideoBackend,
        ExtractionConfig::default(),
    )?;
    let csv_path = tmp.path().join("landmarks.csv");
    write_table(&csv_path, &out.dataset)?;
    let table = read_table(&csv_path)?;
    assert_eq!(table, out.dataset);

    let labels: Vec<&str> = table.labels().collect();
    let split = stratified_split(&labels, 0.2, 42)?;
    assert_eq!(split.test.len(), 2);
    assert_eq!(split.train.len(), 8);
    Ok(())
}

#[test]
fn two_image_pipeline_reports_stratification_failure() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write_png(&root.join("A/A_0000.png"), [255, 0, 0]);
    write_png(&root.join("B/B_0000.png"), [255, 90, 0]);
    write_manifest(root, &[("A", &["A/A_0000.png"]), ("B", &["B/B_0000.png"])]);

    let mut detector = RedHandDetector { calls: 0 };
    let out = extract_dataset(root, &mut detector, &NoVideoBackend, ExtractionConfig::default())?;
    assert_eq!(out.dataset.len(), 2);

    let labels: Vec<&str> = out.dataset.labels().collect();
    let err = stratified_split(&labels, 0.2, 42).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::InsufficientSamples { count: 1, .. }
    ));
    Ok(())
}
