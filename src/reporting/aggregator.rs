use std::collections::BTreeMap;

use crate::metrics::Metrics;

/// Batch-size-weighted running means of the values logged during an epoch.
#[derive(Debug, Clone, Default)]
pub struct EpochAggregator {
    sums: BTreeMap<String, (f64, usize)>,
}

impl EpochAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `value`, computed over `weight` samples, into the mean of `name`.
    ///
    /// A zero weight still counts as one sample.
    pub fn add(&mut self, name: &str, value: f32, weight: usize) {
        let weight = weight.max(1);
        let (sum, total) = self.sums.entry(name.to_string()).or_insert((0.0, 0));
        *sum += value as f64 * weight as f64;
        *total += weight;
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Returns the means accumulated so far and starts over.
    pub fn take(&mut self) -> Metrics {
        std::mem::take(&mut self.sums)
            .into_iter()
            .map(|(name, (sum, total))| (name, (sum / total as f64) as f32))
            .collect()
    }
}
