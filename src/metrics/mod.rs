mod accuracy;
mod collection;
mod f1;
mod metric;
mod precision;
mod recall;
mod stat_scores;

use ndarray::{ArrayView2, Axis};

pub use accuracy::Accuracy;
pub use collection::{MetricCollection, Metrics};
pub use f1::F1Score;
pub use metric::Metric;
pub use precision::Precision;
pub use recall::Recall;
pub use stat_scores::StatScores;

use stat_scores::safe_ratio;

/// Returns the index of the largest logit of every row, the first one on ties.
pub fn argmax_rows(y_pred: ArrayView2<f32>) -> Vec<usize> {
    y_pred
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
                    if v > max {
                        (i, v)
                    } else {
                        (best, max)
                    }
                })
                .0
        })
        .collect()
}
