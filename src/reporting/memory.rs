use std::collections::BTreeMap;

use super::{EpochAggregator, LogOptions, Sink};
use crate::metrics::Metrics;

/// A `Sink` that keeps everything it is given in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    aggregator: EpochAggregator,
    steps: Vec<(String, f32)>,
    epochs: Vec<(usize, Metrics)>,
    config: BTreeMap<String, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every value logged with `on_step`, in order.
    pub fn steps(&self) -> &[(String, f32)] {
        &self.steps
    }

    /// The step values logged under `name`, in order.
    pub fn step_values(&self, name: &str) -> Vec<f32> {
        self.steps
            .iter()
            .filter(|(n, _)| n == name)
            .map(|&(_, v)| v)
            .collect()
    }

    /// The epoch means reported so far, with their epoch index.
    pub fn epochs(&self) -> &[(usize, Metrics)] {
        &self.epochs
    }

    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    /// The means of the epoch still open.
    pub fn pending(&self) -> Metrics {
        self.aggregator.clone().take()
    }
}

impl Sink for MemorySink {
    fn log(&mut self, name: &str, value: f32, options: LogOptions) {
        if options.on_step {
            self.steps.push((name.to_string(), value));
        }

        if options.on_epoch {
            self.aggregator.add(name, value, options.batch_size);
        }
    }

    fn record_config(&mut self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    fn end_epoch(&mut self, epoch: usize) -> Metrics {
        let means = self.aggregator.take();
        self.epochs.push((epoch, means.clone()));
        means
    }
}
