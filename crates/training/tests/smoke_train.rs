use burn::backend::Autodiff;
use burn::tensor::{Tensor, TensorData};
use data_contracts::{FeatureVector, ModelLayout, FEATURE_DIM};
use landmark_dataset::{DatasetError, LandmarkDataset, Sample};
use training::{
    evaluate_dataset, fit, save_artifacts, ModelBundle, TrainerConfig, TrainingError,
};

type B = burn_ndarray::NdArray<f32>;
type AD = Autodiff<B>;

/// `per_class` rows per label; each label sits around its own offset.
fn clustered(labels: &[&str], per_class: usize) -> LandmarkDataset {
    let mut rows = Vec::new();
    for (c, label) in labels.iter().enumerate() {
        for i in 0..per_class {
            let mut values = [0.0f32; FEATURE_DIM];
            for (j, v) in values.iter_mut().enumerate().skip(3) {
                let jitter = ((i * 31 + j * 7) % 13) as f32 * 0.01;
                let sign = if (j + c) % 2 == 0 { 1.0 } else { -1.0 };
                *v = sign * (c as f32 + 1.0) * 0.3 + jitter;
            }
            rows.push(Sample {
                label: label.to_string(),
                features: FeatureVector::new(values),
            });
        }
    }
    rows.into_iter().collect()
}

fn quick_config() -> TrainerConfig {
    TrainerConfig {
        epochs: 25,
        batch_size: 4,
        learning_rate: 1e-2,
        ..TrainerConfig::default()
    }
}

#[test]
fn trains_and_reports_consistent_metadata() {
    let dataset = clustered(&["A", "B", "Ç"], 20);
    let device = Default::default();
    let outcome = fit::<AD>(&dataset, &quick_config(), &device).unwrap();

    let meta = &outcome.metadata;
    assert_eq!(meta.num_classes, 3);
    assert_eq!(meta.classes, vec!["A", "B", "Ç"]);
    assert_eq!(meta.input_shape, FEATURE_DIM);
    assert_eq!(meta.total_samples, 60);
    assert_eq!(meta.test_samples, 12);
    assert_eq!(meta.train_samples, 48);
    assert!(meta.epochs_trained >= 1 && meta.epochs_trained <= 25);
    assert!(meta.best_epoch < meta.epochs_trained);
    assert_eq!(outcome.history.len(), meta.epochs_trained);
    assert!(meta.validate().is_ok());

    assert_eq!(outcome.evaluation.report.classes.len(), 3);
    assert_eq!(outcome.evaluation.report.weighted_avg.support, 12);
    assert!(outcome.evaluation.accuracy > 0.5, "separable clusters should train");
    assert!(outcome.evaluation.loss.is_finite());

    let best = &outcome.history.epochs[meta.best_epoch];
    assert!(outcome
        .history
        .epochs
        .iter()
        .all(|r| r.val_loss >= best.val_loss));
}

#[test]
fn artifacts_round_trip_through_model_directory() {
    let dataset = clustered(&["A", "B"], 10);
    let device = Default::default();
    let cfg = TrainerConfig {
        epochs: 3,
        ..quick_config()
    };
    let outcome = fit::<AD>(&dataset, &cfg, &device).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("model");
    let layout = save_artifacts(&outcome, &out).unwrap();
    for path in layout.required_files() {
        assert!(path.is_file(), "{} missing", path.display());
    }
    assert!(layout.report().is_file());
    assert!(layout.history().is_file());
    assert!(layout.history_plot().is_file());
    assert!(!training::staging_dir(&out).exists());

    let bundle = ModelBundle::<B>::load(&out, &device).unwrap();
    assert_eq!(bundle.encoding, outcome.encoding);
    assert_eq!(bundle.metadata, outcome.metadata);

    let probe = Tensor::<B, 2>::from_data(
        TensorData::new(
            dataset.samples()[0].features.as_slice().to_vec(),
            [1, FEATURE_DIM],
        ),
        &device,
    );
    let a = outcome.model.forward(probe.clone()).into_data().to_vec::<f32>().unwrap();
    let b = bundle.model.forward(probe).into_data().to_vec::<f32>().unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-5);
    }

    let report = evaluate_dataset(&bundle.model, &bundle.encoding, &dataset, 8, &device).unwrap();
    assert_eq!(report.report.weighted_avg.support, 20);
}

#[test]
fn retraining_into_existing_directory_replaces_files() {
    let dataset = clustered(&["A", "B"], 6);
    let device = Default::default();
    let cfg = TrainerConfig {
        epochs: 2,
        ..quick_config()
    };
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("model");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("notes.txt"), "keep me").unwrap();

    let outcome = fit::<AD>(&dataset, &cfg, &device).unwrap();
    save_artifacts(&outcome, &out).unwrap();
    assert!(ModelLayout::new(&out).model().is_file());
    assert!(out.join("notes.txt").is_file());
}

#[test]
fn empty_dataset_is_rejected_before_training() {
    let device = Default::default();
    let err = fit::<AD>(&LandmarkDataset::default(), &quick_config(), &device).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Dataset(DatasetError::EmptyDataset { .. })
    ));
}

#[test]
fn singleton_classes_fail_stratification() {
    let device = Default::default();
    let err = fit::<AD>(&clustered(&["A", "B"], 1), &quick_config(), &device).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Dataset(DatasetError::InsufficientSamples { count: 1, .. })
    ));
}

#[test]
fn single_class_is_rejected() {
    let device = Default::default();
    let err = fit::<AD>(&clustered(&["A"], 10), &quick_config(), &device).unwrap_err();
    assert!(matches!(
        err,
        TrainingError::Dataset(DatasetError::TooFewClasses { found: 1 })
    ));
}

#[test]
fn zero_epochs_is_invalid() {
    let device = Default::default();
    let cfg = TrainerConfig {
        epochs: 0,
        ..quick_config()
    };
    assert!(matches!(
        fit::<AD>(&clustered(&["A", "B"], 5), &cfg, &device),
        Err(TrainingError::InvalidConfig(_))
    ));
}
