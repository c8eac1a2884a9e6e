use super::{AdamW, Optimizer, ReduceLrOnPlateau};
use crate::Result;

/// How often the learning rate scheduler is stepped: after every epoch, on the
/// epoch mean of the monitored value, or after every training step, on that
/// step's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Epoch,
    Step,
}

/// The scheduler half of an `OptimizerSchedule`, with the bookkeeping the
/// training loop needs to drive it.
#[derive(Debug, Clone)]
pub struct LrSchedulerConfig {
    pub scheduler: ReduceLrOnPlateau,
    /// The reported value fed to the scheduler.
    pub monitor: String,
    pub interval: Interval,
    /// Step the scheduler every `frequency` intervals.
    pub frequency: usize,
}

impl LrSchedulerConfig {
    /// Whether the scheduler is due after `count` completed intervals.
    pub fn is_due(&self, count: usize) -> bool {
        self.frequency > 0 && count % self.frequency == 0
    }
}

/// The optimizer and learning rate schedule a training loop consumes.
#[derive(Debug, Clone)]
pub struct OptimizerSchedule {
    pub optimizer: AdamW,
    pub lr_scheduler: LrSchedulerConfig,
}

impl OptimizerSchedule {
    pub const MONITOR: &'static str = "val_loss";
    pub const FACTOR: f32 = 0.9;
    pub const MIN_LR: f32 = 1.0e-6;

    /// Creates the AdamW over `len` parameters paired with a plateau scheduler
    /// monitoring the epoch validation loss.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters to optimize.
    /// * `learning_rate` - The initial learning rate.
    /// * `patience` - Epochs without improvement tolerated before decaying.
    pub fn new(len: usize, learning_rate: f32, patience: usize) -> Result<Self> {
        let scheduler = ReduceLrOnPlateau::new(Self::FACTOR, patience, Self::MIN_LR)?;

        Ok(Self {
            optimizer: AdamW::new(len, learning_rate),
            lr_scheduler: LrSchedulerConfig {
                scheduler,
                monitor: Self::MONITOR.to_string(),
                interval: Interval::Epoch,
                frequency: 1,
            },
        })
    }

    pub fn optimizer_name(&self) -> &'static str {
        self.optimizer.name()
    }

    pub fn scheduler_name(&self) -> &'static str {
        self.lr_scheduler.scheduler.name()
    }

    /// Feeds the monitored value to the scheduler, adjusting the optimizer's learning rate.
    pub fn step_scheduler(&mut self, monitored: f32) -> Option<f32> {
        self.lr_scheduler.scheduler.step(monitored, &mut self.optimizer)
    }
}
