use ndarray::{linalg, prelude::*};

use crate::{AdapterErr, Result};

/// A fully connected layer: `y = x·W + b`.
///
/// Parameters are laid out as the row-major `(n_in, n_out)` weight matrix
/// followed by the `n_out` biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    size: usize,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(inputs, outputs)` dimension of the layer.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fan_in(&self) -> usize {
        self.dim.0
    }

    pub fn output_size(&self) -> usize {
        self.dim.1
    }

    /// Makes a forward pass through the layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `x` - The `(batch, n_in)` input.
    ///
    /// # Returns
    /// The `(batch, n_out)` output or an error if `x` has the wrong width.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;

        let (w, b) = self.view_params(params)?;
        let mut z = Array2::<f32>::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        Ok(z)
    }

    /// Accumulates this layer's gradient and returns the delta for the previous layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's gradient slice, added to rather than overwritten.
    /// * `x` - The input the layer saw on the forward pass.
    /// * `d` - The delta with respect to this layer's output.
    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        x: ArrayView2<f32>,
        d: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        self.check_input(x)?;

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn check_input(&self, x: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.dim.0 {
            return Err(AdapterErr::SizeMismatch {
                what: "dense input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        Ok(())
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let weights = ArrayView2::from_shape(self.dim, w_raw)?;
        let biases = ArrayView1::from_shape(self.dim.1, b_raw)?;
        Ok((weights, biases))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw)?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)?;
        Ok((dw, db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_is_an_affine_map() {
        let layer = Dense::new((2, 1));
        // w = [[2], [3]], b = [1]
        let params = [2.0, 3.0, 1.0];
        let x = array![[1.0, 1.0], [0.0, 2.0]];

        let y = layer.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[6.0], [7.0]]);
    }

    #[test]
    fn backward_accumulates_the_gradient() {
        let layer = Dense::new((2, 1));
        let params = [2.0, 3.0, 1.0];
        let x = array![[1.0, 2.0]];
        let d = array![[1.0]];
        let mut grad = [0.0; 3];

        let dx = layer
            .backward(&params, &mut grad, x.view(), d.view())
            .unwrap();
        assert_eq!(grad, [1.0, 2.0, 1.0]);
        assert_eq!(dx, array![[2.0, 3.0]]);

        layer
            .backward(&params, &mut grad, x.view(), d.view())
            .unwrap();
        assert_eq!(grad, [2.0, 4.0, 2.0]);
    }

    #[test]
    fn wrong_input_width_fails() {
        let layer = Dense::new((3, 1));
        let params = [0.0; 4];
        let x = Array2::zeros((1, 2));

        assert!(matches!(
            layer.forward(&params, x.view()),
            Err(AdapterErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }
}
