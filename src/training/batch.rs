use ndarray::{ArrayView1, ArrayView2};

use crate::{metrics::Metrics, AdapterErr, Result};

/// Borrowed batch of samples and their class labels.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub x: ArrayView2<'a, f32>,
    pub y: ArrayView1<'a, usize>,
}

impl<'a> Batch<'a> {
    /// Creates a new `Batch`.
    ///
    /// # Errors
    /// Returns `AdapterErr::SizeMismatch` if there is not one label per row of `x`.
    pub fn new(x: ArrayView2<'a, f32>, y: ArrayView1<'a, usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(AdapterErr::SizeMismatch {
                what: "batch labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// What a training, validation or test step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub loss: f32,
    /// The prefixed metric values on this batch.
    pub metrics: Metrics,
}
