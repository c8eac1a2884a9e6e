use log::{debug, info};

use super::{EpochAggregator, LogOptions, Sink};
use crate::metrics::Metrics;

/// A `Sink` that reports through the `log` facade.
///
/// Step values go out at `debug`, epoch means and metadata at `info`.
#[derive(Debug, Default)]
pub struct LogSink {
    aggregator: EpochAggregator,
    step: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for LogSink {
    fn log(&mut self, name: &str, value: f32, options: LogOptions) {
        if options.on_step {
            self.step += 1;
            debug!(step = self.step, name = name, value = value; "step value");
        }

        if options.on_epoch {
            self.aggregator.add(name, value, options.batch_size);
        }
    }

    fn record_config(&mut self, key: &str, value: &str) {
        info!(key = key, value = value; "config");
    }

    fn end_epoch(&mut self, epoch: usize) -> Metrics {
        let means = self.aggregator.take();
        for (name, value) in &means {
            info!(epoch = epoch, name = name.as_str(), value = *value; "epoch value");
        }
        means
    }
}
