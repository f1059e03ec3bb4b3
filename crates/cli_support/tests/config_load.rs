use std::fs;
use std::path::{Path, PathBuf};

use cli_support::{ConfigSource, ToolConfig};

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("signforge.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn loads_minimal_config() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(tmp.path(), "[paths]\nmodel_dir = \"runs/model\"\n");
    let cfg = ToolConfig::from_path(&path).expect("load config");
    assert_eq!(cfg.model_dir, PathBuf::from("runs/model"));
    assert_eq!(cfg.landmarks_csv, PathBuf::from("landmarks.csv"));
    assert_eq!(cfg.epochs, 100);
    assert_eq!(cfg.source, ConfigSource::File(path));
}

#[test]
fn loads_every_section() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
[paths]
processed_root = "data/processed"
landmarks_csv = "data/landmarks.csv"
export_dir = "web/model"
detector_weights = "weights/hand.onnx"

[extraction]
max_frames_per_video = 40

[training]
epochs = 12
batch_size = 8
learning_rate = 0.0005
seed = 7

[logging]
level = "debug"
json = true
"#,
    );
    let cfg = ToolConfig::from_path(&path).expect("load config");
    assert_eq!(cfg.processed_root, PathBuf::from("data/processed"));
    assert_eq!(cfg.export_dir, PathBuf::from("web/model"));
    assert_eq!(cfg.detector_weights, Some(PathBuf::from("weights/hand.onnx")));
    assert_eq!(cfg.max_frames_per_video, 40);
    assert_eq!((cfg.epochs, cfg.batch_size, cfg.seed), (12, 8, 7));
    assert!((cfg.learning_rate - 5e-4).abs() < 1e-12);
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
}

#[test]
fn invalid_file_falls_back_to_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(tmp.path(), "[training]\nepochs = \"many\"\n");
    assert!(ToolConfig::from_path(&path).is_none());
    let cfg = ToolConfig::load_or_default(&path);
    assert_eq!(cfg.epochs, 100);
    assert!(matches!(cfg.source, ConfigSource::Invalid { .. }));
}

#[test]
fn missing_file_means_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = ToolConfig::load_or_default(&tmp.path().join("absent.toml"));
    assert_eq!(cfg.source, ConfigSource::Defaults);
    assert_eq!(cfg.model_dir, PathBuf::from("model"));
}
