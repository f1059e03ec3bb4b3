use data_contracts::{ContractError, LabelEncoding, ModelLayout, TrainingMetadata, FEATURE_DIM};
use inference::prelude::{InferenceBackend, InferenceError, SignPredictor};
use models::{ModelLoadError, SignClassifier, SignClassifierConfig};
use std::path::Path;

fn classes() -> Vec<String> {
    ["A", "B", "C"].iter().map(|s| s.to_string()).collect()
}

fn write_model_dir(dir: &Path) {
    let device = Default::default();
    let model = SignClassifier::<InferenceBackend>::new(SignClassifierConfig::with_classes(3), &device);
    let layout = ModelLayout::new(dir);
    model.save_checkpoint(&layout.model()).unwrap();
    LabelEncoding::from_classes(classes())
        .unwrap()
        .save(&layout.label_mapping())
        .unwrap();
    TrainingMetadata {
        num_classes: 3,
        classes: classes(),
        input_shape: FEATURE_DIM,
        test_accuracy: 0.0,
        test_loss: 0.0,
        epochs_trained: 1,
        best_epoch: 0,
        total_samples: 10,
        train_samples: 8,
        test_samples: 2,
    }
    .save(&layout.metadata())
    .unwrap();
}

fn hand(offset: f32) -> Vec<f32> {
    (0..FEATURE_DIM)
        .map(|i| offset + (i as f32 * 0.37).sin() * 0.2)
        .collect()
}

#[test]
fn predictions_are_ranked_probabilities() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let predictor = SignPredictor::load(dir.path()).unwrap();
    assert_eq!(predictor.encoding().classes(), classes().as_slice());

    let ranked = predictor.predict(&hand(0.0), 5).unwrap();
    assert_eq!(ranked.len(), 3);
    assert!(ranked.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    let total: f32 = ranked.iter().map(|p| p.confidence).sum();
    assert!((total - 1.0).abs() < 1e-4);

    let top = predictor.predict(&hand(0.0), 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].label, ranked[0].label);
}

#[test]
fn translated_hands_get_the_same_prediction() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let predictor = SignPredictor::load(dir.path()).unwrap();

    let base = predictor.predict(&hand(0.0), 3).unwrap();
    let shifted = predictor.predict(&hand(0.25), 3).unwrap();
    for (a, b) in base.iter().zip(&shifted) {
        assert_eq!(a.label, b.label);
        assert!((a.confidence - b.confidence).abs() < 1e-4);
    }
}

#[test]
fn wrong_input_length_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_model_dir(dir.path());
    let predictor = SignPredictor::load(dir.path()).unwrap();

    let err = predictor.predict(&[0.0; 42], 3).unwrap_err();
    assert!(matches!(
        err,
        InferenceError::Contract(ContractError::FeatureWidth { actual: 42, .. })
    ));
    assert!(matches!(
        predictor.predict(&hand(0.0), 0).unwrap_err(),
        InferenceError::InvalidTopK
    ));
}

#[test]
fn missing_weights_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = SignPredictor::load(dir.path()).err().unwrap();
    assert!(matches!(
        err,
        InferenceError::Model(ModelLoadError::MissingWeights(_))
    ));
}
