use std::collections::BTreeMap;

use ndarray::{ArrayView1, ArrayView2};

use super::Metric;
use crate::Result;

/// Metric values keyed by their reported name.
pub type Metrics = BTreeMap<String, f32>;

/// A group of metrics updated together and reported under a common prefix.
#[derive(Debug, Clone)]
pub struct MetricCollection {
    prefix: String,
    metrics: Vec<Metric>,
}

impl MetricCollection {
    pub fn new<I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = Metric>,
    {
        Self {
            prefix: String::new(),
            metrics: metrics.into_iter().collect(),
        }
    }

    /// Accuracy plus macro-averaged precision, recall and F1 over `num_classes` classes.
    pub fn classification(num_classes: usize) -> Self {
        Self::new([
            Metric::accuracy(),
            Metric::precision(num_classes),
            Metric::recall(num_classes),
            Metric::f1_score(num_classes),
        ])
    }

    /// Returns an independent copy with fresh state, reporting under `prefix`.
    pub fn clone_with_prefix(&self, prefix: &str) -> Self {
        let mut collection = self.clone();
        collection.prefix = prefix.to_string();
        collection.reset();
        collection
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the prefixed keys of every metric, in order.
    pub fn keys(&self) -> Vec<String> {
        self.metrics.iter().map(|m| self.key(m)).collect()
    }

    /// Accumulates a batch into every metric and returns each metric's value on that batch.
    ///
    /// # Errors
    /// Fails without touching any metric if the batch is invalid.
    pub fn forward(
        &mut self,
        y_pred: ArrayView2<f32>,
        target: ArrayView1<usize>,
    ) -> Result<Metrics> {
        let mut staged = self.metrics.clone();
        let mut values = Metrics::new();

        for metric in &mut staged {
            let value = metric.forward(y_pred, target)?;
            values.insert(self.key(metric), value);
        }

        self.metrics = staged;
        Ok(values)
    }

    /// Returns each metric's value over everything accumulated since the last reset.
    pub fn compute(&self) -> Metrics {
        self.metrics
            .iter()
            .map(|m| (self.key(m), m.compute()))
            .collect()
    }

    pub fn reset(&mut self) {
        self.metrics.iter_mut().for_each(Metric::reset);
    }

    fn key(&self, metric: &Metric) -> String {
        format!("{}{}", self.prefix, metric.name())
    }
}
