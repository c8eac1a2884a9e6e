use serde::{Deserialize, Serialize};

/// The closed set of model architectures a configuration may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Mlp,
    Cnn1d,
    /// Recognized but not implemented, building it fails.
    Cnn2d,
}

impl Architecture {
    /// Returns the selector string this architecture is configured with.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Mlp => "mlp",
            Architecture::Cnn1d => "cnn1d",
            Architecture::Cnn2d => "cnn2d",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub model_architecture: Architecture,
    pub lr: f32,
    pub scheduler_patience: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_max_epochs() -> usize {
    20
}

fn default_batch_size() -> usize {
    32
}
