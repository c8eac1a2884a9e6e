mod aggregator;
mod log_sink;
mod memory;
mod sink;

pub use aggregator::EpochAggregator;
pub use log_sink::LogSink;
pub use memory::MemorySink;
pub use sink::{LogOptions, Sink};
