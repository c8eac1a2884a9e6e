use ndarray::{prelude::*, s};

use crate::{AdapterErr, Result};

/// A valid (no padding), unit-stride 1D convolution.
///
/// Each input row holds `in_channels` signals of `length` samples, channel
/// major; each output row holds `out_channels` signals of
/// `length - kernel_size + 1` samples in the same layout.
///
/// Parameters are the `(out_channels, in_channels, kernel_size)` kernels
/// followed by the `out_channels` biases.
#[derive(Debug, Clone)]
pub struct Conv1d {
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    length: usize,
    size: usize,
}

impl Conv1d {
    /// Creates a new `Conv1d`.
    ///
    /// # Arguments
    /// * `in_channels` - Channels of each input row.
    /// * `out_channels` - Channels of each output row.
    /// * `kernel_size` - Width of the kernels.
    /// * `length` - Samples per input channel.
    ///
    /// # Returns
    /// A new `Conv1d` or an error if the kernel does not fit in the signal.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        length: usize,
    ) -> Result<Self> {
        if kernel_size == 0 || kernel_size > length {
            return Err(AdapterErr::InvalidConfig(format!(
                "kernel size {kernel_size} does not fit a signal of length {length}"
            )));
        }

        Ok(Self {
            in_channels,
            out_channels,
            kernel_size,
            length,
            size: out_channels * (in_channels * kernel_size + 1),
        })
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fan_in(&self) -> usize {
        self.in_channels * self.kernel_size
    }

    pub fn output_length(&self) -> usize {
        self.length - self.kernel_size + 1
    }

    pub fn output_size(&self) -> usize {
        self.out_channels * self.output_length()
    }

    /// Makes a forward pass through the layer.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `x` - The `(batch, in_channels * length)` input.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let x = self.view_input(&x)?;
        let (w, b) = self.view_params(params)?;

        let batch = x.len_of(Axis(0));
        let (k, out_len) = (self.kernel_size, self.output_length());
        let mut out = Array3::<f32>::zeros((batch, self.out_channels, out_len));

        for (mut out_b, x_b) in out.outer_iter_mut().zip(x.outer_iter()) {
            for (o, (mut out_o, w_o)) in out_b.outer_iter_mut().zip(w.outer_iter()).enumerate() {
                for t in 0..out_len {
                    let window = x_b.slice(s![.., t..t + k]);
                    out_o[t] = (&window * &w_o).sum() + b[o];
                }
            }
        }

        Ok(out.into_shape_with_order((batch, self.output_size()))?)
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
        let x = self.view_input(&x)?;
        let batch = x.len_of(Axis(0));
        let (k, out_len) = (self.kernel_size, self.output_length());
        let d = d.to_shape((batch, self.out_channels, out_len))?;

        let (w, _) = self.view_params(params)?;
        let (mut dw, mut db) = self.view_grad(grad)?;
        let mut dx = Array3::<f32>::zeros((batch, self.in_channels, self.length));

        for bi in 0..batch {
            for o in 0..self.out_channels {
                for t in 0..out_len {
                    let g = d[[bi, o, t]];
                    db[o] += g;
                    dw.slice_mut(s![o, .., ..])
                        .scaled_add(g, &x.slice(s![bi, .., t..t + k]));
                    dx.slice_mut(s![bi, .., t..t + k])
                        .scaled_add(g, &w.slice(s![o, .., ..]));
                }
            }
        }

        Ok(dx.into_shape_with_order((batch, self.in_channels * self.length))?)
    }

    fn view_input<'a>(&self, x: &'a ArrayView2<f32>) -> Result<CowArray<'a, f32, Ix3>> {
        let expected = self.in_channels * self.length;
        if x.ncols() != expected {
            return Err(AdapterErr::SizeMismatch {
                what: "conv1d input",
                got: x.ncols(),
                expected,
            });
        }

        Ok(x.to_shape((x.nrows(), self.in_channels, self.length))?)
    }

    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView3<'a, f32>, ArrayView1<'a, f32>)> {
        let w_size = self.size - self.out_channels;
        let (w_raw, b_raw) = params.split_at(w_size);
        let kernels = ArrayView3::from_shape(
            (self.out_channels, self.in_channels, self.kernel_size),
            w_raw,
        )?;
        let biases = ArrayView1::from_shape(self.out_channels, b_raw)?;
        Ok((kernels, biases))
    }

    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut3<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let w_size = self.size - self.out_channels;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut3::from_shape(
            (self.out_channels, self.in_channels, self.kernel_size),
            dw_raw,
        )?;
        let db = ArrayViewMut1::from_shape(self.out_channels, db_raw)?;
        Ok((dw, db))
    }
}
