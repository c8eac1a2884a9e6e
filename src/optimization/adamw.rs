use super::Optimizer;
use crate::{AdapterErr, Result};

/// Adam with decoupled weight decay.
#[derive(Debug, Clone)]
pub struct AdamW {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    epsilon: f32,
    weight_decay: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
}

impl AdamW {
    pub const BETA1: f32 = 0.9;
    pub const BETA2: f32 = 0.999;
    pub const EPSILON: f32 = 1e-8;
    pub const WEIGHT_DECAY: f32 = 0.01;

    /// Creates a new `AdamW` optimizer with the default hyperparameters.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    pub fn new(len: usize, learning_rate: f32) -> Self {
        Self::with_hyperparameters(
            len,
            learning_rate,
            Self::BETA1,
            Self::BETA2,
            Self::EPSILON,
            Self::WEIGHT_DECAY,
        )
    }

    /// Creates a new `AdamW` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    /// * `weight_decay` - The fraction of every parameter removed per update, scaled by the
    ///   learning rate.
    pub fn with_hyperparameters(
        len: usize,
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        weight_decay: f32,
    ) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            epsilon,
            weight_decay,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
        }
    }

    pub fn weight_decay(&self) -> f32 {
        self.weight_decay
    }
}

impl Optimizer for AdamW {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        if grad.len() != params.len() {
            return Err(AdapterErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: params.len(),
            });
        }

        if params.len() != self.v.len() {
            return Err(AdapterErr::SizeMismatch {
                what: "optimizer state",
                got: params.len(),
                expected: self.v.len(),
            });
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            weight_decay: wd,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2_sqrt = (1. - self.beta2_t).sqrt();
        let step_size = lr / bc1;
        let decay = 1. - lr * wd;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                *p *= decay;
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *p -= step_size * *v / (s.sqrt() / bc2_sqrt + eps);
            });

        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    fn name(&self) -> &'static str {
        "AdamW"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_each_param_by_the_learning_rate() {
        let mut adamw = AdamW::with_hyperparameters(2, 0.1, 0.9, 0.999, 1e-8, 0.0);
        let mut params = [1.0, -1.0];

        adamw.update_params(&mut params, &[0.5, -2.0]).unwrap();

        // bias-corrected m / sqrt(v) is sign(g) on the first step
        assert!((params[0] - 0.9).abs() < 1e-5);
        assert!((params[1] + 0.9).abs() < 1e-5);
    }

    #[test]
    fn weight_decay_is_decoupled_from_the_gradient() {
        let mut adamw = AdamW::with_hyperparameters(1, 0.1, 0.9, 0.999, 1e-8, 0.5);
        let mut params = [2.0];

        adamw.update_params(&mut params, &[0.0]).unwrap();

        // zero gradient: only the decay term applies
        assert!((params[0] - 2.0 * (1.0 - 0.1 * 0.5)).abs() < 1e-6);
    }

    #[test]
    fn length_mismatches_fail() {
        let mut adamw = AdamW::new(2, 0.1);

        assert!(adamw.update_params(&mut [0.0; 2], &[0.0; 3]).is_err());
        assert!(adamw.update_params(&mut [0.0; 3], &[0.0; 3]).is_err());
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adamw = AdamW::with_hyperparameters(1, 0.05, 0.9, 0.999, 1e-8, 0.0);
        let mut params = [3.0];

        for _ in 0..500 {
            let grad = [2.0 * (params[0] - 1.0)];
            adamw.update_params(&mut params, &grad).unwrap();
        }

        assert!((params[0] - 1.0).abs() < 1e-2);
    }
}
