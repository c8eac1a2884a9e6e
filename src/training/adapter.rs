use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;

use super::{Batch, Phase, StepOutput};
use crate::{
    arch::{
        loss::{CrossEntropy, LossFn},
        Model, Network,
    },
    config::Config,
    metrics::{MetricCollection, Metrics},
    optimization::{Optimizer, OptimizerSchedule},
    reporting::Sink,
    Result,
};

/// Binds a classifier to the steps a training loop drives: it owns the model,
/// the cross-entropy objective and one metric accumulator per phase, and it
/// knows which optimizer and schedule the model is trained with.
///
/// Accumulators are never reset here; that happens at epoch boundaries, on
/// the loop's side.
#[derive(Debug, Clone)]
pub struct TrainingAdapter {
    config: Config,
    model: Network,
    loss_fn: CrossEntropy,

    train_metrics: MetricCollection,
    val_metrics: MetricCollection,
    test_metrics: MetricCollection,
}

impl TrainingAdapter {
    /// Creates a new `TrainingAdapter`.
    ///
    /// # Arguments
    /// * `config` - The validated model and training configuration.
    ///
    /// # Errors
    /// Returns `AdapterErr::InvalidConfig` if `config` fails validation and
    /// `AdapterErr::UnimplementedArchitecture` if it selects `cnn2d`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut rng = generate_rng(config.training.seed);
        let model = Network::build(config.training.model_architecture, &config.model, &mut rng)?;

        let metrics = MetricCollection::classification(config.model.output_size);
        let train_metrics = metrics.clone_with_prefix(Phase::Train.prefix());
        let val_metrics = metrics.clone_with_prefix(Phase::Validation.prefix());
        let test_metrics = metrics.clone_with_prefix(Phase::Test.prefix());

        info!(
            architecture = config.training.model_architecture.as_str(),
            params = model.size(),
            classes = config.model.output_size;
            "built classifier"
        );

        Ok(Self {
            config,
            model,
            loss_fn: CrossEntropy::new(),
            train_metrics,
            val_metrics,
            test_metrics,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &Network {
        &self.model
    }

    /// Returns the model's logits for `x`, with no other effect.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.model.forward(x)
    }

    /// Runs a training step: forward, loss, back-propagation into the model's
    /// gradient buffer and a training metrics update.
    ///
    /// # Arguments
    /// * `batch` - The samples and labels of this step.
    /// * `batch_idx` - The index of the batch within the epoch.
    /// * `sink` - Where the loss and metrics are reported.
    ///
    /// # Errors
    /// Returns an error if the batch does not fit the model or holds invalid
    /// labels. Nothing is reported or accumulated in that case.
    pub fn training_step(
        &mut self,
        batch: Batch<'_>,
        batch_idx: usize,
        sink: &mut dyn Sink,
    ) -> Result<StepOutput> {
        let y_pred = self.model.forward_cached(batch.x)?;
        let loss = self.loss_fn.loss(y_pred.view(), batch.y)?;
        let d = self.loss_fn.loss_prime(y_pred.view(), batch.y)?;
        let metrics = self.train_metrics.forward(y_pred.view(), batch.y)?;
        self.model.backward(d)?;

        Ok(report(Phase::Train, batch_idx, batch.len(), loss, metrics, sink))
    }

    /// Runs a validation step, same as `training_step` without back-propagation.
    pub fn validation_step(
        &mut self,
        batch: Batch<'_>,
        batch_idx: usize,
        sink: &mut dyn Sink,
    ) -> Result<StepOutput> {
        let y_pred = self.model.forward(batch.x)?;
        let loss = self.loss_fn.loss(y_pred.view(), batch.y)?;
        let metrics = self.val_metrics.forward(y_pred.view(), batch.y)?;

        Ok(report(Phase::Validation, batch_idx, batch.len(), loss, metrics, sink))
    }

    /// Runs a test step, same as `validation_step` but reported per epoch only.
    pub fn test_step(
        &mut self,
        batch: Batch<'_>,
        batch_idx: usize,
        sink: &mut dyn Sink,
    ) -> Result<StepOutput> {
        let y_pred = self.model.forward(batch.x)?;
        let loss = self.loss_fn.loss(y_pred.view(), batch.y)?;
        let metrics = self.test_metrics.forward(y_pred.view(), batch.y)?;

        Ok(report(Phase::Test, batch_idx, batch.len(), loss, metrics, sink))
    }

    /// Creates the optimizer and learning rate schedule the model is trained
    /// with, recording their names as run metadata.
    ///
    /// AdamW over every model parameter at the configured learning rate, paired
    /// with a plateau scheduler on the epoch `val_loss`.
    pub fn configure_optimizers(&self, sink: &mut dyn Sink) -> Result<OptimizerSchedule> {
        let training = &self.config.training;
        let schedule =
            OptimizerSchedule::new(self.model.size(), training.lr, training.scheduler_patience)?;

        sink.record_config("optimizer", schedule.optimizer_name());
        sink.record_config("scheduler", schedule.scheduler_name());

        info!(
            optimizer = schedule.optimizer_name(),
            scheduler = schedule.scheduler_name(),
            lr = training.lr,
            patience = training.scheduler_patience,
            monitor = schedule.lr_scheduler.monitor.as_str();
            "configured optimizers"
        );

        Ok(schedule)
    }

    /// Applies the gradient accumulated since the last call and clears it.
    pub fn optimizer_step<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<()> {
        let (params, grad) = self.model.params_and_grad();
        optimizer.update_params(params, grad)?;
        self.model.zero_grad();
        Ok(())
    }

    /// Records the whole configuration as run metadata, one dotted key per leaf
    /// (`model.input_size`, `training.lr`, ...).
    pub fn log_hyperparameters(&self, sink: &mut dyn Sink) -> Result<()> {
        let value = serde_json::to_value(&self.config)?;

        let mut entries = Vec::new();
        flatten("", &value, &mut entries);
        for (key, value) in entries {
            sink.record_config(&key, &value);
        }

        Ok(())
    }

    pub fn metrics(&self, phase: Phase) -> &MetricCollection {
        match phase {
            Phase::Train => &self.train_metrics,
            Phase::Validation => &self.val_metrics,
            Phase::Test => &self.test_metrics,
        }
    }

    /// Returns the values accumulated by `phase` since its last reset.
    pub fn compute_metrics(&self, phase: Phase) -> Metrics {
        self.metrics(phase).compute()
    }

    pub fn reset_metrics(&mut self, phase: Phase) {
        match phase {
            Phase::Train => self.train_metrics.reset(),
            Phase::Validation => self.val_metrics.reset(),
            Phase::Test => self.test_metrics.reset(),
        }
    }
}

fn report(
    phase: Phase,
    batch_idx: usize,
    batch_size: usize,
    loss: f32,
    metrics: Metrics,
    sink: &mut dyn Sink,
) -> StepOutput {
    debug!(phase = phase.prefix(), batch = batch_idx, loss = loss; "step");

    sink.log(phase.loss_key(), loss, phase.loss_options(batch_size));
    sink.log_dict(&metrics, phase.metric_options(batch_size));

    StepOutput { loss, metrics }
}

fn flatten(prefix: &str, value: &Value, entries: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, value, entries);
            }
        }
        Value::String(s) => entries.push((prefix.to_string(), s.clone())),
        other => entries.push((prefix.to_string(), other.to_string())),
    }
}

fn generate_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::reporting::MemorySink;

    fn adapter() -> TrainingAdapter {
        let config = Config::from_json_str(
            r#"{
                "model": { "input_size": 2, "hidden_sizes": [4], "output_size": 2 },
                "training": {
                    "model_architecture": "mlp",
                    "lr": 0.01,
                    "scheduler_patience": 1,
                    "seed": 3
                }
            }"#,
        )
        .unwrap();
        TrainingAdapter::new(config).unwrap()
    }

    #[test]
    fn steps_report_with_the_phase_options() {
        let mut adapter = adapter();
        let mut sink = MemorySink::new();
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![0, 1];
        let batch = Batch::new(x.view(), y.view()).unwrap();

        adapter.training_step(batch, 0, &mut sink).unwrap();
        adapter.validation_step(batch, 0, &mut sink).unwrap();
        adapter.test_step(batch, 0, &mut sink).unwrap();

        assert_eq!(sink.step_values("train_loss").len(), 1);
        assert_eq!(sink.step_values("train_Accuracy").len(), 1);
        assert_eq!(sink.step_values("val_Accuracy").len(), 1);
        assert!(sink.step_values("val_loss").is_empty());
        assert!(sink.step_values("test_loss").is_empty());
        assert!(sink.step_values("test_Accuracy").is_empty());

        let epoch = sink.end_epoch(0);
        assert!(!epoch.contains_key("train_loss"));
        for key in ["train_F1Score", "val_loss", "val_Recall", "test_loss", "test_Precision"] {
            assert!(epoch.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn invalid_labels_leave_everything_untouched() {
        let mut adapter = adapter();
        let mut sink = MemorySink::new();
        let x = array![[1.0, 0.0]];
        let y = array![5];
        let batch = Batch::new(x.view(), y.view()).unwrap();

        assert!(adapter.training_step(batch, 0, &mut sink).is_err());
        assert!(sink.steps().is_empty());
        assert!(adapter.model().grad().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn optimizer_step_clears_the_gradient() {
        let mut adapter = adapter();
        let mut sink = MemorySink::new();
        let mut schedule = adapter.configure_optimizers(&mut sink).unwrap();
        let x = array![[1.0, 0.0], [0.0, 1.0]];
        let y = array![0, 1];
        let before = adapter.forward(x.view()).unwrap();

        adapter
            .training_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink)
            .unwrap();
        assert!(adapter.model().grad().iter().any(|&g| g != 0.0));

        adapter.optimizer_step(&mut schedule.optimizer).unwrap();
        assert!(adapter.model().grad().iter().all(|&g| g == 0.0));
        assert_ne!(adapter.forward(x.view()).unwrap(), before);
    }

    #[test]
    fn hyperparameters_are_flattened_to_dotted_keys() {
        let adapter = adapter();
        let mut sink = MemorySink::new();
        adapter.log_hyperparameters(&mut sink).unwrap();

        let config = sink.config();
        assert_eq!(config["training.model_architecture"], "mlp");
        assert_eq!(config["model.input_size"], "2");
        assert_eq!(config["model.hidden_sizes"], "[4]");
        assert_eq!(config["training.seed"], "3");
    }
}
