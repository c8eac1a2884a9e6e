use ndarray::ArrayView1;

use super::{safe_ratio, StatScores};

/// Macro-averaged precision: `tp / (tp + fp)` per class.
#[derive(Debug, Clone)]
pub struct Precision {
    scores: StatScores,
}

impl Precision {
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
        self.scores.macro_average(|tp, fp, _| safe_ratio(tp, tp + fp))
    }

    pub fn reset(&mut self) {
        self.scores.reset();
    }
}
