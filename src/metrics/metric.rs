use ndarray::{ArrayView1, ArrayView2};

use super::{argmax_rows, Accuracy, F1Score, Precision, Recall};
use crate::{AdapterErr, Result};

/// A stateful classification metric.
///
/// `update` accumulates a batch into the running state, `compute` reads the
/// value over everything accumulated since the last `reset`.
#[derive(Debug, Clone)]
pub enum Metric {
    Accuracy(Accuracy),
    Precision(Precision),
    Recall(Recall),
    F1Score(F1Score),
}

impl Metric {
    pub fn accuracy() -> Self {
        Self::Accuracy(Accuracy::new())
    }

    pub fn precision(num_classes: usize) -> Self {
        Self::Precision(Precision::new(num_classes))
    }

    pub fn recall(num_classes: usize) -> Self {
        Self::Recall(Recall::new(num_classes))
    }

    pub fn f1_score(num_classes: usize) -> Self {
        Self::F1Score(F1Score::new(num_classes))
    }

    /// The key this metric is reported under, before any prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accuracy(_) => "Accuracy",
            Self::Precision(_) => "Precision",
            Self::Recall(_) => "Recall",
            Self::F1Score(_) => "F1Score",
        }
    }

    /// Accumulates a batch of logits against its labels.
    ///
    /// # Errors
    /// Returns an error if the batch is empty, if the label count differs from
    /// the row count, if the logits width differs from the metric's class
    /// count, or if a label is not a valid class.
    pub fn update(
        &mut self,
        y_pred: ArrayView2<f32>,
        target: ArrayView1<usize>,
    ) -> Result<()> {
        let num_classes = self.num_classes().unwrap_or(y_pred.ncols());
        check(y_pred, target, num_classes)?;

        let preds = argmax_rows(y_pred);
        match self {
            Self::Accuracy(m) => m.update(&preds, target),
            Self::Precision(m) => m.update(&preds, target),
            Self::Recall(m) => m.update(&preds, target),
            Self::F1Score(m) => m.update(&preds, target),
        }

        Ok(())
    }

    pub fn compute(&self) -> f32 {
        match self {
            Self::Accuracy(m) => m.compute(),
            Self::Precision(m) => m.compute(),
            Self::Recall(m) => m.compute(),
            Self::F1Score(m) => m.compute(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Accuracy(m) => m.reset(),
            Self::Precision(m) => m.reset(),
            Self::Recall(m) => m.reset(),
            Self::F1Score(m) => m.reset(),
        }
    }

    /// Accumulates a batch and returns the metric computed on that batch alone.
    pub fn forward(
        &mut self,
        y_pred: ArrayView2<f32>,
        target: ArrayView1<usize>,
    ) -> Result<f32> {
        let mut batch = self.clone();
        batch.reset();
        batch.update(y_pred, target)?;

        self.update(y_pred, target)?;
        Ok(batch.compute())
    }

    fn num_classes(&self) -> Option<usize> {
        match self {
            Self::Accuracy(_) => None,
            Self::Precision(m) => Some(m.num_classes()),
            Self::Recall(m) => Some(m.num_classes()),
            Self::F1Score(m) => Some(m.num_classes()),
        }
    }
}

fn check(y_pred: ArrayView2<f32>, target: ArrayView1<usize>, num_classes: usize) -> Result<()> {
    if y_pred.nrows() == 0 {
        return Err(AdapterErr::EmptyBatch);
    }

    if target.len() != y_pred.nrows() {
        return Err(AdapterErr::SizeMismatch {
            what: "metric targets",
            got: target.len(),
            expected: y_pred.nrows(),
        });
    }

    if y_pred.ncols() != num_classes {
        return Err(AdapterErr::SizeMismatch {
            what: "metric classes",
            got: y_pred.ncols(),
            expected: num_classes,
        });
    }

    if let Some(&label) = target.iter().find(|&&label| label >= num_classes) {
        return Err(AdapterErr::LabelOutOfRange { label, num_classes });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    // argmax: [0, 1, 1, 2], target: [0, 1, 2, 1]
    fn batch() -> (ndarray::Array2<f32>, ndarray::Array1<usize>) {
        let y_pred = array![
            [0.9, 0.1, 0.0],
            [0.1, 0.8, 0.1],
            [0.0, 0.6, 0.4],
            [0.2, 0.1, 0.7],
        ];
        (y_pred, array![0, 1, 2, 1])
    }

    #[test]
    fn hand_computed_values() {
        let (y_pred, y) = batch();
        let mut metrics = [
            Metric::accuracy(),
            Metric::precision(3),
            Metric::recall(3),
            Metric::f1_score(3),
        ];

        for m in &mut metrics {
            m.update(y_pred.view(), y.view()).unwrap();
        }

        // tp = [1, 1, 0], fp = [0, 1, 1], fn = [0, 1, 1]
        let values: Vec<f32> = metrics.iter().map(Metric::compute).collect();
        let expected = [0.5, 0.5, 0.5, 0.5];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-6, "{values:?}");
        }
    }

    #[test]
    fn forward_returns_the_batch_value_and_accumulates() {
        let (y_pred, y) = batch();
        let mut accuracy = Metric::accuracy();

        let perfect = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(accuracy.forward(perfect.view(), array![0, 1].view()).unwrap(), 1.0);
        assert_eq!(accuracy.forward(y_pred.view(), y.view()).unwrap(), 0.5);

        // 2 + 2 correct out of 6
        assert!((accuracy.compute() - 4.0 / 6.0).abs() < 1e-6);

        accuracy.reset();
        assert_eq!(accuracy.compute(), 0.0);
    }

    #[test]
    fn mismatched_class_count_fails() {
        let mut precision = Metric::precision(4);
        let (y_pred, y) = batch();

        assert!(matches!(
            precision.update(y_pred.view(), y.view()),
            Err(AdapterErr::SizeMismatch { what: "metric classes", .. })
        ));
    }

    #[test]
    fn failed_updates_leave_the_state_untouched() {
        let mut recall = Metric::recall(3);
        let (y_pred, y) = batch();
        recall.update(y_pred.view(), y.view()).unwrap();
        let before = recall.compute();

        assert!(recall
            .forward(y_pred.view(), array![0, 1, 5, 1].view())
            .is_err());
        assert_eq!(recall.compute(), before);
    }
}
