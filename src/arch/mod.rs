pub mod layers;
pub mod loss;
mod model;
mod network;
mod sequential;

pub use model::Model;
pub use network::Network;
pub use sequential::Sequential;
