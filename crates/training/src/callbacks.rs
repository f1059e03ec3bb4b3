//! Validation-loss driven training control: early stopping and step-size decay.
//!
//! Both monitors only ever see the validation loss of each finished epoch and are
//! independent of each other. A non-finite loss never counts as an improvement.

/// Outcome of feeding one epoch's validation loss to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopDecision {
    /// This epoch is the new best; its parameters should be kept.
    pub improved: bool,
    /// Training should halt after this epoch.
    pub stop: bool,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f32,
    best: f32,
    best_epoch: Option<usize>,
    wait: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            min_delta: 0.0,
            best: f32::INFINITY,
            best_epoch: None,
            wait: 0,
        }
    }

    pub fn update(&mut self, epoch: usize, val_loss: f32) -> StopDecision {
        let improved = val_loss < self.best - self.min_delta;
        if improved {
            self.best = val_loss;
            self.best_epoch = Some(epoch);
            self.wait = 0;
        } else {
            self.wait += 1;
        }
        StopDecision {
            improved,
            stop: self.wait >= self.patience && self.best_epoch.is_some(),
        }
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn best_loss(&self) -> f32 {
        self.best
    }
}

/// Multiplies the learning rate by `factor` after `patience` epochs without a
/// validation-loss improvement larger than `min_delta`, never going below `min_lr`.
#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    factor: f64,
    patience: usize,
    min_lr: f64,
    min_delta: f32,
    best: f32,
    wait: usize,
    lr: f64,
}

impl ReduceLrOnPlateau {
    pub fn new(initial_lr: f64, factor: f64, patience: usize, min_lr: f64) -> Self {
        Self {
            factor,
            patience,
            min_lr,
            min_delta: 1e-4,
            best: f32::INFINITY,
            wait: 0,
            lr: initial_lr,
        }
    }

    pub fn with_min_delta(mut self, min_delta: f32) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Current learning rate.
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Record an epoch's validation loss and return the learning rate for the next epoch.
    pub fn update(&mut self, val_loss: f32) -> f64 {
        if val_loss < self.best - self.min_delta {
            self.best = val_loss;
            self.wait = 0;
            return self.lr;
        }
        self.wait += 1;
        if self.wait >= self.patience && self.lr > self.min_lr {
            let next = (self.lr * self.factor).max(self.min_lr);
            tracing::info!(
                from = self.lr,
                to = next,
                "validation loss plateaued; reducing learning rate"
            );
            self.lr = next;
            self.wait = 0;
        }
        self.lr
    }
}
