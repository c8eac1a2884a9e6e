use ndarray::{Array2, ArrayView2};

use crate::Result;

/// A differentiable model that owns its parameters and their gradient.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Returns the width of the model's output rows.
    fn output_size(&self) -> usize;

    /// Computes the model output without keeping anything for a backward pass.
    ///
    /// # Errors
    /// Returns an error if `x` does not fit the model's input.
    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Computes the model output, caching every layer input for `backward`.
    fn forward_cached(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Back-propagates `d`, the loss gradient with respect to the last output of
    /// `forward_cached`, adding the result to the gradient buffer.
    ///
    /// # Errors
    /// Returns `AdapterErr::MissingForwardPass` if there is no cached forward pass.
    fn backward(&mut self, d: Array2<f32>) -> Result<()>;

    /// Returns the parameters mutably along with the gradient accumulated for them.
    fn params_and_grad(&mut self) -> (&mut [f32], &[f32]);

    fn zero_grad(&mut self);
}
