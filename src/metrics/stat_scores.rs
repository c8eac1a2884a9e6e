use ndarray::ArrayView1;

/// Per-class true positive, false positive and false negative counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatScores {
    tp: Vec<u64>,
    fp: Vec<u64>,
    fn_: Vec<u64>,
}

impl StatScores {
    pub fn new(num_classes: usize) -> Self {
        Self {
            tp: vec![0; num_classes],
            fp: vec![0; num_classes],
            fn_: vec![0; num_classes],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.tp.len()
    }

    /// Counts predicted classes against target classes. Both must be valid class indices.
    pub fn update(&mut self, preds: &[usize], target: ArrayView1<usize>) {
        for (&p, &t) in preds.iter().zip(target) {
            if p == t {
                self.tp[t] += 1;
            } else {
                self.fp[p] += 1;
                self.fn_[t] += 1;
            }
        }
    }

    pub fn reset(&mut self) {
        for counts in [&mut self.tp, &mut self.fp, &mut self.fn_] {
            counts.iter_mut().for_each(|c| *c = 0);
        }
    }

    /// Averages `score(tp, fp, fn)` over the classes that appear in either the
    /// predictions or the targets. Returns 0 when no class does.
    pub fn macro_average<F>(&self, score: F) -> f32
    where
        F: Fn(u64, u64, u64) -> f32,
    {
        let (sum, supported) = (0..self.num_classes())
            .map(|c| (self.tp[c], self.fp[c], self.fn_[c]))
            .filter(|&(tp, fp, fn_)| tp + fp + fn_ > 0)
            .fold((0.0, 0usize), |(sum, n), (tp, fp, fn_)| {
                (sum + score(tp, fp, fn_), n + 1)
            });

        if supported == 0 {
            return 0.0;
        }

        sum / supported as f32
    }
}

/// `num / den`, or 0 if `den` is 0.
pub fn safe_ratio(num: u64, den: u64) -> f32 {
    if den == 0 {
        return 0.0;
    }

    num as f32 / den as f32
}
