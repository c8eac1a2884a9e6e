//! Binds a neural network classifier to a training loop: model selection from
//! configuration, a cross-entropy objective, per-phase classification metrics
//! and an AdamW optimizer with a plateau learning rate schedule.

pub mod arch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod optimization;
pub mod reporting;
pub mod training;

pub use error::{AdapterErr, Result};
