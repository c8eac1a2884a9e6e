use std::env;

use anyhow::Context;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

use training_adapter::{
    config::{Architecture, Config, ModelConfig, TrainingConfig},
    reporting::LogSink,
    training::{Dataset, Trainer, TrainingAdapter},
};

const SAMPLES_PER_CLASS: usize = 200;
const BLOB_STD_DEV: f32 = 1.0;
const DEFAULT_SEED: u64 = 42;

fn default_config() -> Config {
    Config {
        model: ModelConfig {
            input_size: 8,
            hidden_sizes: vec![32, 16],
            output_size: 3,
            channels: 8,
            kernel_size: 3,
        },
        training: TrainingConfig {
            model_architecture: Architecture::Mlp,
            lr: 1e-3,
            scheduler_patience: 5,
            seed: Some(DEFAULT_SEED),
            max_epochs: 20,
            batch_size: 32,
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            Config::load(&path).with_context(|| format!("failed to load config from {path}"))?
        }
        None => default_config(),
    };

    let mut rng = StdRng::seed_from_u64(config.training.seed.unwrap_or(DEFAULT_SEED));
    let data = Dataset::gaussian_blobs(
        SAMPLES_PER_CLASS,
        config.model.output_size,
        config.model.input_size,
        BLOB_STD_DEV,
        &mut rng,
    )?
    .shuffled(&mut rng);

    let n = data.len();
    let (train, rest) = data.split_at(n * 7 / 10);
    let (val, test) = rest.split_at(n * 3 / 20);
    info!(
        train = train.len(),
        val = val.len(),
        test = test.len();
        "generated gaussian blobs"
    );

    let mut trainer = Trainer::from_config(&config.training)?;
    let mut adapter = TrainingAdapter::new(config).context("failed to build the adapter")?;
    let mut sink = LogSink::new();

    let summaries = trainer.fit(&mut adapter, &train, &val, &mut sink)?;
    if let Some(last) = summaries.last() {
        println!("epoch {}: {:?} (lr {})", last.epoch, last.logged, last.learning_rate);
    }

    let test_metrics = trainer.test(&mut adapter, &test, &mut sink)?;
    println!("test: {test_metrics:?}");

    Ok(())
}
