mod json;
mod model;
mod training;

use serde::{Deserialize, Serialize};

pub use model::ModelConfig;
pub use training::{Architecture, TrainingConfig};

use crate::{AdapterErr, Result};

/// The full configuration handed to a `TrainingAdapter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub training: TrainingConfig,
}

impl Config {
    /// Checks the semantic constraints serde cannot express.
    ///
    /// # Errors
    /// Returns `AdapterErr::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let Self { model, training } = self;

        if model.input_size == 0 {
            return Err(AdapterErr::InvalidConfig(
                "model.input_size must be greater than 0".into(),
            ));
        }

        if model.output_size == 0 {
            return Err(AdapterErr::InvalidConfig(
                "model.output_size must be greater than 0".into(),
            ));
        }

        if let Some(i) = model.hidden_sizes.iter().position(|&h| h == 0) {
            return Err(AdapterErr::InvalidConfig(format!(
                "model.hidden_sizes[{i}] must be greater than 0"
            )));
        }

        if training.model_architecture == Architecture::Cnn1d {
            if model.channels == 0 {
                return Err(AdapterErr::InvalidConfig(
                    "model.channels must be greater than 0".into(),
                ));
            }

            if model.kernel_size == 0 || model.kernel_size > model.input_size {
                return Err(AdapterErr::InvalidConfig(format!(
                    "model.kernel_size ({}) must be in 1..={}",
                    model.kernel_size, model.input_size
                )));
            }
        }

        if !training.lr.is_finite() || training.lr <= 0.0 {
            return Err(AdapterErr::InvalidConfig(format!(
                "training.lr ({}) must be a positive finite number",
                training.lr
            )));
        }

        if training.batch_size == 0 {
            return Err(AdapterErr::InvalidConfig(
                "training.batch_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            model: ModelConfig {
                input_size: 4,
                hidden_sizes: vec![8],
                output_size: 3,
                channels: 2,
                kernel_size: 3,
            },
            training: TrainingConfig {
                model_architecture: Architecture::Mlp,
                lr: 1e-3,
                scheduler_patience: 5,
                seed: Some(0),
                max_epochs: 10,
                batch_size: 4,
            },
        }
    }

    #[test]
    fn a_sane_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let mut cfg = config();
        cfg.model.output_size = 0;
        assert!(matches!(cfg.validate(), Err(AdapterErr::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_learning_rate_is_rejected() {
        let mut cfg = config();
        cfg.training.lr = 0.0;
        assert!(cfg.validate().is_err());

        cfg.training.lr = f32::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn kernel_wider_than_input_is_rejected_only_for_cnn1d() {
        let mut cfg = config();
        cfg.model.kernel_size = 5;
        assert!(cfg.validate().is_ok());

        cfg.training.model_architecture = Architecture::Cnn1d;
        assert!(cfg.validate().is_err());
    }
}
