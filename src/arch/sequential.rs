use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{layers::Layer, Model};
use crate::{AdapterErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// All layer parameters live in one flat buffer, in layer order, mirrored by a gradient
/// buffer of the same length.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
    offsets: Vec<usize>,
    params: Vec<f32>,
    grad: Vec<f32>,
    output_size: usize,

    // Inputs seen by each layer on the last cached forward pass.
    cache: Vec<Array2<f32>>,
}

impl Sequential {
    /// Creates a new `Sequential` with randomly initialized parameters.
    ///
    /// # Arguments
    /// * `input_size` - The width of the input rows.
    /// * `layers` - The layers the sequential is composed of.
    /// * `rng` - The random number generator used to initialize parameters.
    ///
    /// # Returns
    /// A new `Sequential` instance or an error if a layer cannot be initialized.
    pub fn new<I, R>(input_size: usize, layers: I, rng: &mut R) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
        R: Rng,
    {
        let layers: Vec<Layer> = layers.into_iter().collect();

        let mut offsets = Vec::with_capacity(layers.len() + 1);
        let mut total = 0;
        for layer in &layers {
            offsets.push(total);
            total += layer.size();
        }
        offsets.push(total);

        let output_size = layers
            .iter()
            .rev()
            .find_map(Layer::output_size)
            .unwrap_or(input_size);

        let mut params = vec![0.0; total];
        for (i, layer) in layers.iter().enumerate() {
            layer.init(&mut params[offsets[i]..offsets[i + 1]], rng)?;
        }

        Ok(Self {
            layers,
            offsets,
            params,
            grad: vec![0.0; total],
            output_size,
            cache: Vec::new(),
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    fn layer_params(&self, i: usize) -> &[f32] {
        &self.params[self.offsets[i]..self.offsets[i + 1]]
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.params.len()
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let mut out = x.to_owned();

        for (i, layer) in self.layers.iter().enumerate() {
            out = layer.forward(self.layer_params(i), out.view())?;
        }

        Ok(out)
    }

    fn forward_cached(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.cache.clear();
        let mut out = x.to_owned();

        for i in 0..self.layers.len() {
            let next = self.layers[i].forward(self.layer_params(i), out.view())?;
            self.cache.push(out);
            out = next;
        }

        Ok(out)
    }

    fn backward(&mut self, mut d: Array2<f32>) -> Result<()> {
        if self.cache.len() != self.layers.len() {
            return Err(AdapterErr::MissingForwardPass);
        }

        let cache = std::mem::take(&mut self.cache);

        for (i, (layer, x)) in self.layers.iter().zip(&cache).enumerate().rev() {
            let range = self.offsets[i]..self.offsets[i + 1];
            d = layer.backward(
                &self.params[range.clone()],
                &mut self.grad[range],
                x.view(),
                d.view(),
            )?;
        }

        Ok(())
    }

    fn params_and_grad(&mut self) -> (&mut [f32], &[f32]) {
        (&mut self.params, &self.grad)
    }

    fn zero_grad(&mut self) {
        self.grad.iter_mut().for_each(|g| *g = 0.0);
    }
}
