use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{
    layers::{Conv1d, Layer},
    Model, Sequential,
};
use crate::{
    config::{Architecture, ModelConfig},
    AdapterErr, Result,
};

/// The model variants a `TrainingAdapter` can own.
#[derive(Debug, Clone)]
pub enum Network {
    /// Dense layers with ReLU activations in between.
    Mlp(Sequential),
    /// A single-channel 1D convolution with ReLU, followed by a dense head.
    Cnn1d(Sequential),
}

impl Network {
    /// Builds the variant selected by `architecture`.
    ///
    /// # Arguments
    /// * `architecture` - The variant to build.
    /// * `config` - The construction parameters.
    /// * `rng` - The random number generator used to initialize parameters.
    ///
    /// # Errors
    /// Returns `AdapterErr::UnimplementedArchitecture` for `Architecture::Cnn2d`.
    pub fn build<R: Rng>(
        architecture: Architecture,
        config: &ModelConfig,
        rng: &mut R,
    ) -> Result<Self> {
        match architecture {
            Architecture::Mlp => Self::mlp(config, rng).map(Self::Mlp),
            Architecture::Cnn1d => Self::cnn1d(config, rng).map(Self::Cnn1d),
            Architecture::Cnn2d => Err(AdapterErr::UnimplementedArchitecture(architecture)),
        }
    }

    pub fn architecture(&self) -> Architecture {
        match self {
            Self::Mlp(_) => Architecture::Mlp,
            Self::Cnn1d(_) => Architecture::Cnn1d,
        }
    }

    fn mlp<R: Rng>(config: &ModelConfig, rng: &mut R) -> Result<Sequential> {
        let layers = dense_stack(config.input_size, &config.hidden_sizes, config.output_size);
        Sequential::new(config.input_size, layers, rng)
    }

    fn cnn1d<R: Rng>(config: &ModelConfig, rng: &mut R) -> Result<Sequential> {
        let conv = Conv1d::new(1, config.channels, config.kernel_size, config.input_size)?;
        let features = conv.output_size();

        let mut layers = vec![Layer::Conv1d(conv), Layer::relu()];
        layers.extend(dense_stack(features, &config.hidden_sizes, config.output_size));

        Sequential::new(config.input_size, layers, rng)
    }

    pub fn params(&self) -> &[f32] {
        self.inner().params()
    }

    /// The gradient accumulated since the last `zero_grad`.
    pub fn grad(&self) -> &[f32] {
        self.inner().grad()
    }

    fn inner(&self) -> &Sequential {
        match self {
            Self::Mlp(model) | Self::Cnn1d(model) => model,
        }
    }

    fn inner_mut(&mut self) -> &mut Sequential {
        match self {
            Self::Mlp(model) | Self::Cnn1d(model) => model,
        }
    }
}

/// Dense layers from `input` through every hidden width to `output`, ReLU between each pair.
fn dense_stack(input: usize, hidden: &[usize], output: usize) -> Vec<Layer> {
    let mut dims = Vec::with_capacity(hidden.len() + 2);
    dims.push(input);
    dims.extend_from_slice(hidden);
    dims.push(output);

    let nlayers = dims.len() - 1;
    let mut layers = Vec::with_capacity(2 * nlayers);

    for (i, pair) in dims.windows(2).enumerate() {
        layers.push(Layer::dense((pair[0], pair[1])));
        if i + 1 < nlayers {
            layers.push(Layer::relu());
        }
    }

    layers
}

impl Model for Network {
    fn size(&self) -> usize {
        self.inner().size()
    }

    fn output_size(&self) -> usize {
        self.inner().output_size()
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.inner().forward(x)
    }

    fn forward_cached(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.inner_mut().forward_cached(x)
    }

    fn backward(&mut self, d: Array2<f32>) -> Result<()> {
        self.inner_mut().backward(d)
    }

    fn params_and_grad(&mut self) -> (&mut [f32], &[f32]) {
        self.inner_mut().params_and_grad()
    }

    fn zero_grad(&mut self) {
        self.inner_mut().zero_grad()
    }
}
