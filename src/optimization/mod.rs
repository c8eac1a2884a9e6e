mod adamw;
mod optimizer;
mod plateau;
mod schedule;

pub use adamw::AdamW;
pub use optimizer::Optimizer;
pub use plateau::ReduceLrOnPlateau;
pub use schedule::{Interval, LrSchedulerConfig, OptimizerSchedule};
