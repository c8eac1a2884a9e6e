use crate::metrics::Metrics;

/// When a logged value is reported and how much it weighs in the epoch mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Report the value as soon as it is logged.
    pub on_step: bool,
    /// Fold the value into the epoch mean reported by `Sink::end_epoch`.
    pub on_epoch: bool,
    /// The amount of samples the value was computed on.
    pub batch_size: usize,
}

impl LogOptions {
    pub fn new(on_step: bool, on_epoch: bool, batch_size: usize) -> Self {
        Self {
            on_step,
            on_epoch,
            batch_size,
        }
    }
}

/// The destination of everything a training run reports.
pub trait Sink {
    /// Logs a scalar value.
    fn log(&mut self, name: &str, value: f32, options: LogOptions);

    /// Logs every entry of `values` with the same options.
    fn log_dict(&mut self, values: &Metrics, options: LogOptions) {
        for (name, &value) in values {
            self.log(name, value, options);
        }
    }

    /// Records a run metadata entry.
    fn record_config(&mut self, key: &str, value: &str);

    /// Closes the epoch, reporting and returning the epoch means of every
    /// value logged with `on_epoch` since the previous call.
    fn end_epoch(&mut self, epoch: usize) -> Metrics;
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn log(&mut self, name: &str, value: f32, options: LogOptions) {
        (**self).log(name, value, options)
    }

    fn log_dict(&mut self, values: &Metrics, options: LogOptions) {
        (**self).log_dict(values, options)
    }

    fn record_config(&mut self, key: &str, value: &str) {
        (**self).record_config(key, value)
    }

    fn end_epoch(&mut self, epoch: usize) -> Metrics {
        (**self).end_epoch(epoch)
    }
}
