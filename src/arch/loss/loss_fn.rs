use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::Result;

/// A loss over class logits and integer class labels.
pub trait LossFn {
    /// Returns the scalar loss of a batch.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32>;

    /// Returns the gradient of `loss` with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>>;
}
