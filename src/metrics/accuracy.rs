use ndarray::ArrayView1;

/// Fraction of samples whose predicted class equals the target.
#[derive(Debug, Clone, Default)]
pub struct Accuracy {
    correct: u64,
    total: u64,
}

impl Accuracy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, preds: &[usize], target: ArrayView1<usize>) {
        self.correct += preds.iter().zip(target).filter(|(p, t)| p == t).count() as u64;
        self.total += target.len() as u64;
    }

    pub fn compute(&self) -> f32 {
        super::safe_ratio(self.correct, self.total)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
