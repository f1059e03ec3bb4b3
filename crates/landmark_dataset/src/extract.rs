//! Manifest-driven landmark extraction into a [`LandmarkDataset`].

use crate::normalize::normalize;
use crate::sampler::sample_video;
use crate::types::{
    DatasetError, DatasetResult, ExtractionConfig, ExtractionOutput, ExtractionSummary,
    LabelSummary, LandmarkDataset, Sample,
};
use data_contracts::{DatasetManifest, MANIFEST_FILE};
use std::path::Path;
use vision_core::{Frame, HandDetector, MediaKind, VideoOpener};

/// Load and validate `<root>/metadata.json`. A missing manifest is fatal.
pub fn load_manifest(root: &Path) -> DatasetResult<DatasetManifest> {
    let path = root.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(DatasetError::ManifestMissing { path });
    }
    DatasetManifest::load(&path).map_err(|source| DatasetError::Manifest { path, source })
}

/// Walks the manifest and turns every detectable hand into a sample.
///
/// The detector is borrowed for the whole run so its model stays warm across files.
pub struct LandmarkExtractor<'a> {
    detector: &'a mut dyn HandDetector,
    videos: &'a dyn VideoOpener,
    cfg: ExtractionConfig,
}

impl<'a> LandmarkExtractor<'a> {
    pub fn new(
        detector: &'a mut dyn HandDetector,
        videos: &'a dyn VideoOpener,
        cfg: ExtractionConfig,
    ) -> DatasetResult<Self> {
        if cfg.max_frames_per_video == 0 {
            return Err(DatasetError::InvalidConfig(
                "max frames per video must be at least 1".into(),
            ));
        }
        Ok(Self {
            detector,
            videos,
            cfg,
        })
    }

    /// Extract samples in manifest order (label, file, frame). Fails only when the
    /// result is empty.
    pub fn extract(
        &mut self,
        root: &Path,
        manifest: &DatasetManifest,
    ) -> DatasetResult<ExtractionOutput> {
        let mut dataset = LandmarkDataset::default();
        let mut summary = ExtractionSummary::default();

        for (label, files) in &manifest.dataset {
            let before = dataset.len();
            for rel in files {
                summary.files_seen += 1;
                let path = root.join(rel);
                for features in self.extract_file(&path, &mut summary) {
                    dataset.push(Sample {
                        label: label.clone(),
                        features,
                    });
                }
            }
            let samples = dataset.len() - before;
            tracing::info!(label = %label, files = files.len(), samples, "extracted label");
            if samples == 0 {
                summary.warn(format!("label '{label}' produced no samples"));
            }
            summary.labels.push(LabelSummary {
                label: label.clone(),
                files: files.len(),
                samples,
            });
        }

        if dataset.is_empty() {
            return Err(DatasetError::EmptyDataset {
                files: summary.files_seen,
            });
        }
        Ok(ExtractionOutput { dataset, summary })
    }

    fn extract_file(
        &mut self,
        path: &Path,
        summary: &mut ExtractionSummary,
    ) -> Vec<data_contracts::FeatureVector> {
        if !path.exists() {
            summary.missing += 1;
            summary.warn(format!("file not found: {}", path.display()));
            return Vec::new();
        }
        match MediaKind::from_path(path) {
            MediaKind::Image => {
                summary.images += 1;
                let image = match image::open(path) {
                    Ok(img) => img.to_rgb8(),
                    Err(e) => {
                        summary.unreadable += 1;
                        summary.warn(format!("could not read image {}: {e}", path.display()));
                        return Vec::new();
                    }
                };
                let frame = Frame::new(0, image).with_path(path);
                match self.detector.detect(&frame) {
                    Some(landmarks) => vec![normalize(&landmarks)],
                    None => {
                        summary.no_detection += 1;
                        Vec::new()
                    }
                }
            }
            MediaKind::Video => {
                summary.videos += 1;
                let mut video = match self.videos.open(path) {
                    Ok(v) => v,
                    Err(e) => {
                        summary.unreadable += 1;
                        summary.warn(e.to_string());
                        return Vec::new();
                    }
                };
                // `video` is dropped at the end of this arm on every path.
                match sample_video(
                    video.as_mut(),
                    &mut *self.detector,
                    self.cfg.max_frames_per_video,
                ) {
                    Ok(found) => {
                        if found.is_empty() {
                            summary.no_detection += 1;
                        }
                        found.iter().map(normalize).collect()
                    }
                    Err(e) => {
                        summary.unreadable += 1;
                        summary.warn(format!("sampling failed for {}: {e}", path.display()));
                        Vec::new()
                    }
                }
            }
            MediaKind::Unsupported => {
                summary.unsupported += 1;
                summary.warn(format!("unsupported file type: {}", path.display()));
                Vec::new()
            }
        }
    }
}

/// Load the manifest under `root` and extract every file it lists.
pub fn extract_dataset(
    root: &Path,
    detector: &mut dyn HandDetector,
    videos: &dyn VideoOpener,
    cfg: ExtractionConfig,
) -> DatasetResult<ExtractionOutput> {
    let manifest = load_manifest(root)?;
    tracing::info!(
        root = %root.display(),
        labels = manifest.dataset.len(),
        files = manifest.total_files,
        "loaded manifest"
    );
    LandmarkExtractor::new(detector, videos, cfg)?.extract(root, &manifest)
}
