use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use super::{Conv1d, Dense, Relu};
use crate::{AdapterErr, Result};

/// A layer of a `Sequential` model.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    Conv1d(Conv1d),
    Relu(Relu),
}

impl Layer {
    pub fn dense(dim: (usize, usize)) -> Self {
        Self::Dense(Dense::new(dim))
    }

    pub fn relu() -> Self {
        Self::Relu(Relu::new())
    }

    /// Returns the amount of parameters of this layer.
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(l) => l.size(),
            Self::Conv1d(l) => l.size(),
            Self::Relu(_) => 0,
        }
    }

    /// Returns the width of this layer's output rows, `None` if it preserves its input's width.
    pub fn output_size(&self) -> Option<usize> {
        match self {
            Self::Dense(l) => Some(l.output_size()),
            Self::Conv1d(l) => Some(l.output_size()),
            Self::Relu(_) => None,
        }
    }

    /// Fills `params` uniformly in `[-1/sqrt(fan_in), 1/sqrt(fan_in))`.
    pub fn init<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        let fan_in = match self {
            Self::Dense(l) => l.fan_in(),
            Self::Conv1d(l) => l.fan_in(),
            Self::Relu(_) => return Ok(()),
        };

        let bound = 1.0 / (fan_in as f32).sqrt();
        let distribution = Uniform::new(-bound, bound)
            .map_err(|e| AdapterErr::InvalidConfig(format!("cannot initialize layer: {e}")))?;

        for (p, v) in params.iter_mut().zip(distribution.sample_iter(rng)) {
            *p = v;
        }

        Ok(())
    }

    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.forward(params, x),
            Self::Conv1d(l) => l.forward(params, x),
            Self::Relu(l) => Ok(l.forward(x)),
        }
    }

    pub fn backward(
        &self,
        params: &[f32],
        grad: &mut [f32],
        x: ArrayView2<f32>,
        d: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.backward(params, grad, x, d),
            Self::Conv1d(l) => l.backward(params, grad, x, d),
            Self::Relu(l) => Ok(l.backward(x, d)),
        }
    }
}
