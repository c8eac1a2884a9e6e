mod conv1d;
mod dense;
mod layer;
mod relu;

pub use conv1d::Conv1d;
pub use dense::Dense;
pub use layer::Layer;
pub use relu::Relu;
