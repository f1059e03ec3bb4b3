use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{Int, Tensor};
use data_contracts::{
    EpochRecord, EvaluationReport, LabelEncoding, TrainingHistory, TrainingMetadata, FEATURE_DIM,
};
use landmark_dataset::{stratified_split, LandmarkDataset, DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO};
use models::{SignClassifier, SignClassifierConfig};
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::callbacks::{EarlyStopping, ReduceLrOnPlateau};
use crate::dataset::{collate, EncodedSamples};
use crate::metrics::{accuracy, classification_report};
use crate::{TrainingError, TrainingResult};

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub test_ratio: f32,
    pub seed: u64,
    pub early_stopping_patience: usize,
    pub lr_patience: usize,
    pub lr_factor: f64,
    pub min_lr: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: 32,
            learning_rate: 1e-3,
            test_ratio: DEFAULT_TEST_RATIO,
            seed: DEFAULT_SPLIT_SEED,
            early_stopping_patience: 15,
            lr_patience: 5,
            lr_factor: 0.5,
            min_lr: 1e-6,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "batch size must be at least 1".into(),
            ));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TrainingError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.lr_factor > 0.0 && self.lr_factor < 1.0) {
            return Err(TrainingError::InvalidConfig(format!(
                "lr factor must be in (0, 1), got {}",
                self.lr_factor
            )));
        }
        Ok(())
    }
}

/// Everything a finished run produced. The model holds the restored best parameters.
#[derive(Debug)]
pub struct TrainingOutcome<B: Backend> {
    pub model: SignClassifier<B>,
    pub encoding: LabelEncoding,
    pub evaluation: EvaluationReport,
    pub history: TrainingHistory,
    pub metadata: TrainingMetadata,
}

/// Loss, accuracy and per-row predictions over a set of rows.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
    pub predictions: Vec<usize>,
    pub targets: Vec<usize>,
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f32 {
    t.into_data()
        .to_vec::<f32>()
        .unwrap_or_default()
        .first()
        .copied()
        .unwrap_or(f32::NAN)
}

fn class_indices<B: Backend>(logits: Tensor<B, 2>) -> Vec<usize> {
    let predicted: Tensor<B, 2, Int> = logits.argmax(1);
    predicted
        .into_data()
        .iter::<i64>()
        .map(|v| v as usize)
        .collect()
}

/// Mean cross-entropy and accuracy of `model` on the rows at `indices`, in inference mode.
pub fn evaluate<B: Backend>(
    model: &SignClassifier<B>,
    samples: &EncodedSamples,
    indices: &[usize],
    batch_size: usize,
    device: &B::Device,
) -> TrainingResult<Evaluation> {
    let loss_fn = CrossEntropyLossConfig::new().init(device);
    let mut loss_sum = 0.0f32;
    let mut predictions = Vec::with_capacity(indices.len());
    let mut targets = Vec::with_capacity(indices.len());
    for chunk in indices.chunks(batch_size.max(1)) {
        let batch = collate::<B>(samples, chunk, device)?;
        let logits = model.forward(batch.features);
        let loss = loss_fn.forward(logits.clone(), batch.targets);
        loss_sum += scalar(loss) * chunk.len() as f32;
        predictions.extend(class_indices(logits));
        targets.extend(chunk.iter().map(|&i| samples.targets()[i]));
    }
    let n = indices.len().max(1) as f32;
    Ok(Evaluation {
        loss: loss_sum / n,
        accuracy: accuracy(&predictions, &targets),
        predictions,
        targets,
    })
}

/// Train a classifier on `dataset`.
///
/// Labels are encoded in sorted order, the rows are split 80/20 per class, and the
/// held-out split drives early stopping and learning-rate decay. The returned model is
/// the epoch with the lowest validation loss, evaluated once more on the held-out split.
pub fn fit<B: AutodiffBackend>(
    dataset: &LandmarkDataset,
    cfg: &TrainerConfig,
    device: &B::Device,
) -> TrainingResult<TrainingOutcome<B::InnerBackend>> {
    cfg.validate()?;
    dataset.ensure_non_empty()?;

    let encoding = LabelEncoding::fit(dataset.labels());
    let labels: Vec<&str> = dataset.labels().collect();
    let split = stratified_split(&labels, cfg.test_ratio, cfg.seed)?;
    let samples = EncodedSamples::encode(dataset, &encoding)?;
    tracing::info!(
        classes = encoding.len(),
        train = split.train.len(),
        test = split.test.len(),
        "prepared stratified split"
    );

    B::seed(cfg.seed);
    let mut rng = rand::rngs::StdRng::seed_from_u64(cfg.seed);
    let mut model =
        SignClassifier::<B>::new(SignClassifierConfig::with_classes(encoding.len()), device);
    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);

    let mut early = EarlyStopping::new(cfg.early_stopping_patience);
    let mut plateau = ReduceLrOnPlateau::new(
        cfg.learning_rate,
        cfg.lr_factor,
        cfg.lr_patience,
        cfg.min_lr,
    );
    let mut history = TrainingHistory::default();
    let mut best: Option<SignClassifier<B::InnerBackend>> = None;
    let mut order = split.train.clone();

    for epoch in 0..cfg.epochs {
        let lr = plateau.lr();
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0f32;
        let mut correct = 0usize;
        for chunk in order.chunks(cfg.batch_size) {
            let batch = collate::<B>(&samples, chunk, device)?;
            let logits = model.forward(batch.features);
            let loss = loss_fn.forward(logits.clone(), batch.targets);
            loss_sum += scalar(loss.clone().detach()) * chunk.len() as f32;
            correct += class_indices(logits.detach())
                .into_iter()
                .zip(chunk)
                .filter(|(p, i)| *p == samples.targets()[**i])
                .count();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(lr, model, grads);
        }
        let train_loss = loss_sum / order.len() as f32;
        if !train_loss.is_finite() {
            return Err(TrainingError::NonFiniteLoss { epoch });
        }
        let train_accuracy = correct as f32 / order.len() as f32;

        let snapshot = model.valid();
        let val = evaluate(&snapshot, &samples, &split.test, cfg.batch_size, device)?;
        let decision = early.update(epoch, val.loss);
        if decision.improved {
            best = Some(snapshot);
        }
        plateau.update(val.loss);

        tracing::info!(
            epoch = epoch + 1,
            train_loss,
            train_accuracy,
            val_loss = val.loss,
            val_accuracy = val.accuracy,
            lr,
            "epoch finished"
        );
        history.push(EpochRecord {
            epoch,
            train_loss,
            train_accuracy,
            val_loss: val.loss,
            val_accuracy: val.accuracy,
            learning_rate: lr,
        });
        if decision.stop {
            tracing::info!(
                epoch = epoch + 1,
                best_epoch = early.best_epoch().map(|e| e + 1),
                "early stopping"
            );
            break;
        }
    }

    let epochs_trained = history.len();
    let (model, best_epoch) = match (best, early.best_epoch()) {
        (Some(model), Some(epoch)) => (model, epoch),
        _ => {
            return Err(TrainingError::NonFiniteLoss {
                epoch: epochs_trained.saturating_sub(1),
            })
        }
    };

    let test = evaluate(&model, &samples, &split.test, cfg.batch_size, device)?;
    let report = classification_report(&test.predictions, &test.targets, encoding.classes());
    tracing::info!(
        accuracy = test.accuracy,
        loss = test.loss,
        best_epoch = best_epoch + 1,
        "evaluated restored model on held-out split"
    );

    let metadata = TrainingMetadata {
        num_classes: encoding.len(),
        classes: encoding.classes().to_vec(),
        input_shape: FEATURE_DIM,
        test_accuracy: test.accuracy,
        test_loss: test.loss,
        epochs_trained,
        best_epoch,
        total_samples: dataset.len(),
        train_samples: split.train.len(),
        test_samples: split.test.len(),
    };
    Ok(TrainingOutcome {
        model,
        encoding,
        evaluation: EvaluationReport {
            accuracy: test.accuracy,
            loss: test.loss,
            report,
        },
        history,
        metadata,
    })
}

/// Score a trained model on a whole table (every row, no split).
pub fn evaluate_dataset<B: Backend>(
    model: &SignClassifier<B>,
    encoding: &LabelEncoding,
    dataset: &LandmarkDataset,
    batch_size: usize,
    device: &B::Device,
) -> TrainingResult<EvaluationReport> {
    dataset.ensure_non_empty()?;
    let samples = EncodedSamples::encode(dataset, encoding)?;
    let indices: Vec<usize> = (0..samples.len()).collect();
    let eval = evaluate(model, &samples, &indices, batch_size, device)?;
    Ok(EvaluationReport {
        accuracy: eval.accuracy,
        loss: eval.loss,
        report: classification_report(&eval.predictions, &eval.targets, encoding.classes()),
    })
}
