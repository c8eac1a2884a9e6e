use ndarray::ArrayView1;

use super::{safe_ratio, StatScores};

/// Macro-averaged F1 score: `2tp / (2tp + fp + fn)` per class.
#[derive(Debug, Clone)]
pub struct F1Score {
    scores: StatScores,
}

impl F1Score {
    pub fn new(num_classes: usize) -> Self {
        Self {
            scores: StatScores::new(num_classes),
        }
    }

    pub fn num_classes(&self) -> usize {
        self.scores.num_classes()
    }

    pub fn update(&mut self, preds: &[usize], target: ArrayView1<usize>) {
        self.scores.update(preds, target);
    }

    pub fn compute(&self) -> f32 {
        self.scores.macro_average(|tp, fp, fn_| safe_ratio(2 * tp, 2 * tp + fp + fn_))
    }

    pub fn reset(&mut self) {
        self.scores.reset();
    }
}
