use log::info;

use super::Optimizer;
use crate::{AdapterErr, Result};

/// Reduces the learning rate by a factor once a monitored value has stopped decreasing for
/// more than `patience` consecutive evaluations.
///
/// Improvement is relative: a value counts as better only when it is below
/// `best * (1 - threshold)`.
#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    factor: f32,
    patience: usize,
    min_lr: f32,
    threshold: f32,
    cooldown: usize,
    eps: f32,

    best: f32,
    num_bad_epochs: usize,
    cooldown_counter: usize,
    last_epoch: usize,
}

impl ReduceLrOnPlateau {
    pub const THRESHOLD: f32 = 1e-4;
    pub const EPS: f32 = 1e-8;

    /// Creates a new `ReduceLrOnPlateau` with no cooldown and the default threshold.
    ///
    /// # Arguments
    /// * `factor` - The multiplier applied to the learning rate on a plateau, in `(0, 1)`.
    /// * `patience` - How many evaluations without improvement are tolerated.
    /// * `min_lr` - The learning rate is never reduced below this value.
    ///
    /// # Errors
    /// Returns `AdapterErr::InvalidConfig` if `factor` is not in `(0, 1)` or
    /// `min_lr` is negative.
    pub fn new(factor: f32, patience: usize, min_lr: f32) -> Result<Self> {
        Self::with_cooldown(factor, patience, min_lr, 0)
    }

    /// Same as `new`, waiting `cooldown` evaluations after every reduction
    /// before counting bad epochs again.
    pub fn with_cooldown(
        factor: f32,
        patience: usize,
        min_lr: f32,
        cooldown: usize,
    ) -> Result<Self> {
        if !(factor > 0.0 && factor < 1.0) {
            return Err(AdapterErr::InvalidConfig(format!(
                "plateau factor ({factor}) must be in (0, 1)"
            )));
        }

        if !(min_lr >= 0.0) {
            return Err(AdapterErr::InvalidConfig(format!(
                "plateau min_lr ({min_lr}) must be non-negative"
            )));
        }

        Ok(Self {
            factor,
            patience,
            min_lr,
            threshold: Self::THRESHOLD,
            cooldown,
            eps: Self::EPS,
            best: f32::INFINITY,
            num_bad_epochs: 0,
            cooldown_counter: 0,
            last_epoch: 0,
        })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    pub fn min_lr(&self) -> f32 {
        self.min_lr
    }

    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn num_bad_epochs(&self) -> usize {
        self.num_bad_epochs
    }

    pub fn name(&self) -> &'static str {
        "ReduceLROnPlateau"
    }

    /// Feeds one evaluation of the monitored value.
    ///
    /// # Arguments
    /// * `metric` - The monitored value, lower is better.
    /// * `optimizer` - The optimizer whose learning rate is adjusted.
    ///
    /// # Returns
    /// The new learning rate if it was reduced.
    pub fn step<O: Optimizer + ?Sized>(&mut self, metric: f32, optimizer: &mut O) -> Option<f32> {
        self.last_epoch += 1;

        if self.is_better(metric) {
            self.best = metric;
            self.num_bad_epochs = 0;
        } else {
            self.num_bad_epochs += 1;
        }

        if self.cooldown_counter > 0 {
            self.cooldown_counter -= 1;
            self.num_bad_epochs = 0;
        }

        if self.num_bad_epochs <= self.patience {
            return None;
        }

        self.cooldown_counter = self.cooldown;
        self.num_bad_epochs = 0;
        self.reduce_lr(optimizer)
    }

    fn is_better(&self, metric: f32) -> bool {
        metric < self.best * (1.0 - self.threshold)
    }

    fn reduce_lr<O: Optimizer + ?Sized>(&self, optimizer: &mut O) -> Option<f32> {
        let old_lr = optimizer.learning_rate();
        let new_lr = (old_lr * self.factor).max(self.min_lr);

        if old_lr - new_lr <= self.eps {
            return None;
        }

        optimizer.set_learning_rate(new_lr);
        info!(
            epoch = self.last_epoch, old_lr = old_lr, new_lr = new_lr;
            "reducing learning rate on plateau"
        );

        Some(new_lr)
    }
}
