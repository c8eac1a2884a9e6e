use std::num::NonZeroUsize;

use log::info;
use rand::{rngs::StdRng, SeedableRng};

use super::{Dataset, Phase, StepOutput, TrainingAdapter};
use crate::{
    config::TrainingConfig,
    metrics::Metrics,
    optimization::{Interval, Optimizer, OptimizerSchedule},
    reporting::Sink,
    AdapterErr, Result,
};

/// What one epoch of `Trainer::fit` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    pub epoch: usize,
    /// The epoch means reported by the sink, losses included.
    pub logged: Metrics,
    /// The training metrics accumulated over the epoch.
    pub train: Metrics,
    /// The validation metrics accumulated over the epoch.
    pub validation: Metrics,
    /// The learning rate after the scheduler saw this epoch.
    pub learning_rate: f32,
}

/// Drives a `TrainingAdapter` through its epochs, one batch at a time.
pub struct Trainer {
    max_epochs: usize,
    batch_size: NonZeroUsize,
    rng: StdRng,
}

impl Trainer {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `max_epochs` - The amount of epochs `fit` runs.
    /// * `batch_size` - The amount of samples per step.
    /// * `seed` - Seeds the training set shuffling, random if absent.
    pub fn new(max_epochs: usize, batch_size: NonZeroUsize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            max_epochs,
            batch_size,
            rng,
        }
    }

    /// Creates a `Trainer` from the training section of a configuration.
    ///
    /// # Errors
    /// Returns `AdapterErr::InvalidConfig` if the batch size is 0.
    pub fn from_config(config: &TrainingConfig) -> Result<Self> {
        let batch_size = NonZeroUsize::new(config.batch_size).ok_or_else(|| {
            AdapterErr::InvalidConfig("training.batch_size must be greater than 0".into())
        })?;

        Ok(Self::new(config.max_epochs, batch_size, config.seed))
    }

    /// Trains the adapter's model for `max_epochs` epochs with the optimizer
    /// and schedule the adapter configures, after recording its hyperparameters.
    ///
    /// # Errors
    /// Same as `fit_with_schedule`.
    pub fn fit(
        &mut self,
        adapter: &mut TrainingAdapter,
        train: &Dataset,
        val: &Dataset,
        sink: &mut dyn Sink,
    ) -> Result<Vec<EpochSummary>> {
        adapter.log_hyperparameters(sink)?;
        let mut schedule = adapter.configure_optimizers(sink)?;
        self.fit_with_schedule(adapter, &mut schedule, train, val, sink)
    }

    /// Trains the adapter's model for `max_epochs` epochs with `schedule`.
    ///
    /// Every epoch shuffles `train`, runs a training step and an optimizer step
    /// per batch, then a validation step per batch of `val`, and finally resets
    /// both metric accumulators.
    ///
    /// The scheduler follows `schedule.lr_scheduler`. With `Interval::Step` it
    /// sees the monitored value of every due training step. With
    /// `Interval::Epoch` it sees the epoch mean of the monitored value, once
    /// the sink has closed a due epoch.
    ///
    /// # Errors
    /// Returns `AdapterErr::MissingMonitor` if the monitored value is not
    /// reported at the scheduler's interval, e.g. because `val` is empty, and
    /// any error raised by a step.
    pub fn fit_with_schedule(
        &mut self,
        adapter: &mut TrainingAdapter,
        schedule: &mut OptimizerSchedule,
        train: &Dataset,
        val: &Dataset,
        sink: &mut dyn Sink,
    ) -> Result<Vec<EpochSummary>> {
        let mut summaries = Vec::with_capacity(self.max_epochs);
        let mut global_step = 0;

        for epoch in 0..self.max_epochs {
            let shuffled = train.shuffled(&mut self.rng);
            for (i, batch) in shuffled.batches(self.batch_size).enumerate() {
                let output = adapter.training_step(batch, i, sink)?;
                adapter.optimizer_step(&mut schedule.optimizer)?;
                global_step += 1;

                let scheduler = &schedule.lr_scheduler;
                if scheduler.interval == Interval::Step && scheduler.is_due(global_step) {
                    let monitored = step_value(&output, &scheduler.monitor)?;
                    schedule.step_scheduler(monitored);
                }
            }

            for (i, batch) in val.batches(self.batch_size).enumerate() {
                adapter.validation_step(batch, i, sink)?;
            }

            let logged = sink.end_epoch(epoch);
            match schedule.lr_scheduler.interval {
                Interval::Epoch => {
                    let monitored = logged_value(&logged, &schedule.lr_scheduler.monitor)?;
                    if schedule.lr_scheduler.is_due(epoch + 1) {
                        schedule.step_scheduler(monitored);
                    }
                }
                Interval::Step => {}
            }

            let summary = EpochSummary {
                epoch,
                logged,
                train: adapter.compute_metrics(Phase::Train),
                validation: adapter.compute_metrics(Phase::Validation),
                learning_rate: schedule.optimizer.learning_rate(),
            };
            adapter.reset_metrics(Phase::Train);
            adapter.reset_metrics(Phase::Validation);

            info!(
                epoch = epoch,
                steps = global_step,
                lr = summary.learning_rate;
                "epoch finished"
            );
            summaries.push(summary);
        }

        Ok(summaries)
    }

    /// Runs a test step per batch of `test` and returns the epoch means the sink reported.
    pub fn test(
        &mut self,
        adapter: &mut TrainingAdapter,
        test: &Dataset,
        sink: &mut dyn Sink,
    ) -> Result<Metrics> {
        for (i, batch) in test.batches(self.batch_size).enumerate() {
            adapter.test_step(batch, i, sink)?;
        }

        let logged = sink.end_epoch(self.max_epochs);
        adapter.reset_metrics(Phase::Test);

        for (name, value) in &logged {
            info!(name = name.as_str(), value = *value; "test value");
        }
        Ok(logged)
    }
}

fn logged_value(values: &Metrics, key: &str) -> Result<f32> {
    values
        .get(key)
        .copied()
        .ok_or_else(|| AdapterErr::MissingMonitor(key.to_string()))
}

/// The monitored value of a training step: its loss or one of its metrics.
fn step_value(output: &StepOutput, key: &str) -> Result<f32> {
    if key == Phase::Train.loss_key() {
        return Ok(output.loss);
    }

    logged_value(&output.metrics, key)
}
