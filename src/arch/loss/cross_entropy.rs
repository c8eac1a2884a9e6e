use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::LossFn;
use crate::{AdapterErr, Result};

/// Cross-entropy between softmax-normalized logits and class labels, averaged over the batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    /// Row-wise softmax, shifted by each row's max for stability.
    fn softmax(y_pred: ArrayView2<f32>) -> Array2<f32> {
        let mut probs = y_pred.to_owned();

        for mut row in probs.axis_iter_mut(Axis(0)) {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }

        probs
    }

    fn check(y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<()> {
        if y_pred.nrows() == 0 {
            return Err(AdapterErr::EmptyBatch);
        }

        if y.len() != y_pred.nrows() {
            return Err(AdapterErr::SizeMismatch {
                what: "labels",
                got: y.len(),
                expected: y_pred.nrows(),
            });
        }

        let num_classes = y_pred.ncols();
        if let Some(&label) = y.iter().find(|&&label| label >= num_classes) {
            return Err(AdapterErr::LabelOutOfRange { label, num_classes });
        }

        Ok(())
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        Self::check(y_pred, y)?;

        let total: f32 = y_pred
            .axis_iter(Axis(0))
            .zip(y)
            .map(|(row, &label)| {
                let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
                let log_sum_exp = row.mapv(|v| (v - max).exp()).sum().ln() + max;
                log_sum_exp - row[label]
            })
            .sum();

        Ok(total / y_pred.nrows() as f32)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>> {
        Self::check(y_pred, y)?;

        let n = y_pred.nrows() as f32;
        let mut d = Self::softmax(y_pred);

        for (mut row, &label) in d.axis_iter_mut(Axis(0)).zip(y) {
            row[label] -= 1.0;
            row.mapv_inplace(|v| v / n);
        }

        Ok(d)
    }
}
