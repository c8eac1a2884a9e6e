mod adapter;
mod batch;
mod dataset;
mod phase;
mod trainer;

pub use adapter::TrainingAdapter;
pub use batch::{Batch, StepOutput};
pub use dataset::Dataset;
pub use phase::Phase;
pub use trainer::{EpochSummary, Trainer};
