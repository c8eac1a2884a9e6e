use serde::{Deserialize, Serialize};

/// Construction parameters shared by every model variant.
///
/// The same structure is handed to whichever variant is selected, so fields
/// that only matter to one of them carry defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The amount of input features per sample.
    pub input_size: usize,
    /// Widths of the hidden dense layers, in order.
    #[serde(default)]
    pub hidden_sizes: Vec<usize>,
    /// The amount of classes.
    pub output_size: usize,
    /// Convolution output channels (cnn1d).
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Convolution kernel width (cnn1d).
    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,
}

fn default_channels() -> usize {
    8
}

fn default_kernel_size() -> usize {
    3
}
