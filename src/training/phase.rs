use crate::reporting::LogOptions;

/// The stage of a training run a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Train,
    Validation,
    Test,
}

impl Phase {
    /// The prefix of every key reported during this phase.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Train => "train_",
            Self::Validation => "val_",
            Self::Test => "test_",
        }
    }

    pub fn loss_key(&self) -> &'static str {
        match self {
            Self::Train => "train_loss",
            Self::Validation => "val_loss",
            Self::Test => "test_loss",
        }
    }

    /// The training loss is reported per step, the others once per epoch.
    pub fn loss_options(&self, batch_size: usize) -> LogOptions {
        match self {
            Self::Train => LogOptions::new(true, false, batch_size),
            Self::Validation | Self::Test => LogOptions::new(false, true, batch_size),
        }
    }

    /// Metrics are reported per step and per epoch, except while testing.
    pub fn metric_options(&self, batch_size: usize) -> LogOptions {
        match self {
            Self::Train | Self::Validation => LogOptions::new(true, true, batch_size),
            Self::Test => LogOptions::new(false, true, batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_share_the_phase_prefix() {
        for phase in [Phase::Train, Phase::Validation, Phase::Test] {
            assert!(phase.loss_key().starts_with(phase.prefix()));
        }
    }

    #[test]
    fn only_the_training_loss_is_reported_per_step() {
        assert!(Phase::Train.loss_options(1).on_step);
        assert!(!Phase::Train.loss_options(1).on_epoch);
        assert!(!Phase::Validation.loss_options(1).on_step);
        assert!(Phase::Validation.loss_options(1).on_epoch);
        assert!(!Phase::Test.metric_options(1).on_step);
        assert!(Phase::Validation.metric_options(1).on_step);
    }
}
