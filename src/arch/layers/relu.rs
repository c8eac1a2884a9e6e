use ndarray::{Array2, ArrayView2, Zip};

/// Rectified linear unit, applied element-wise. Has no parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

impl Relu {
    pub fn new() -> Self {
        Self
    }

    pub fn forward(&self, x: ArrayView2<f32>) -> Array2<f32> {
        x.mapv(|v| v.max(0.0))
    }

    /// Masks the delta with the sign of the input seen on the forward pass.
    pub fn backward(&self, x: ArrayView2<f32>, d: ArrayView2<f32>) -> Array2<f32> {
        Zip::from(&d)
            .and(&x)
            .map_collect(|&d, &x| if x > 0.0 { d } else { 0.0 })
    }
}
