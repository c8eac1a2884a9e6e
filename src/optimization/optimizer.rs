use crate::Result;

pub trait Optimizer {
    /// Updates `params` in place following the algorithm's learning rule.
    ///
    /// # Errors
    /// Returns `AdapterErr::SizeMismatch` if the slices have different lengths
    /// or do not match the optimizer's state.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, learning_rate: f32);

    /// The algorithm's name, as recorded in experiment metadata.
    fn name(&self) -> &'static str;
}

impl<T: Optimizer + ?Sized> Optimizer for Box<T> {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        (**self).update_params(params, grad)
    }

    fn learning_rate(&self) -> f32 {
        (**self).learning_rate()
    }

    fn set_learning_rate(&mut self, learning_rate: f32) {
        (**self).set_learning_rate(learning_rate)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
