use ndarray::{array, Array2};

use training_adapter::{
    arch::Model,
    config::{Architecture, Config},
    optimization::{Interval, Optimizer},
    reporting::{MemorySink, Sink},
    training::{Batch, Phase, TrainingAdapter},
    AdapterErr,
};

fn config(architecture: &str, input_size: usize, output_size: usize) -> Config {
    Config::from_json_str(&format!(
        r#"{{
            "model": {{
                "input_size": {input_size},
                "hidden_sizes": [8],
                "output_size": {output_size},
                "channels": 4,
                "kernel_size": 3
            }},
            "training": {{
                "model_architecture": "{architecture}",
                "lr": 0.001,
                "scheduler_patience": 5,
                "seed": 0
            }}
        }}"#
    ))
    .unwrap()
}

#[test]
fn output_width_matches_the_configured_classes() {
    for architecture in ["mlp", "cnn1d"] {
        let adapter = TrainingAdapter::new(config(architecture, 10, 3)).unwrap();
        let logits = adapter.forward(Array2::zeros((2, 10)).view()).unwrap();

        assert_eq!(logits.dim(), (2, 3), "{architecture}");
        assert_eq!(adapter.model().output_size(), 3);
    }
}

#[test]
fn cnn2d_is_rejected_at_construction() {
    let result = TrainingAdapter::new(config("cnn2d", 10, 3));

    assert!(matches!(
        result,
        Err(AdapterErr::UnimplementedArchitecture(Architecture::Cnn2d))
    ));
}

#[test]
fn invalid_configurations_are_rejected() {
    let mut bad = config("mlp", 10, 3);
    bad.training.lr = 0.0;
    assert!(matches!(
        TrainingAdapter::new(bad),
        Err(AdapterErr::InvalidConfig(_))
    ));
}

#[test]
fn training_step_on_four_samples_reports_one_loss_and_four_metrics() {
    let mut adapter = TrainingAdapter::new(config("mlp", 5, 3)).unwrap();
    let mut sink = MemorySink::new();
    let x = Array2::from_shape_fn((4, 5), |(i, j)| (i as f32 - j as f32) / 4.0);
    let y = array![0, 1, 2, 1];

    let output = adapter
        .training_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink)
        .unwrap();

    assert!(output.loss.is_finite());
    assert!(output.loss >= 0.0);
    assert_eq!(
        output.metrics.keys().collect::<Vec<_>>(),
        ["train_Accuracy", "train_F1Score", "train_Precision", "train_Recall"]
    );
    for value in output.metrics.values() {
        assert!((0.0..=1.0).contains(value));
    }
    assert_eq!(sink.step_values("train_loss"), [output.loss]);
}

#[test]
fn phases_do_not_share_accumulators() {
    let mut adapter = TrainingAdapter::new(config("mlp", 3, 3)).unwrap();
    let mut sink = MemorySink::new();
    let x = Array2::<f32>::eye(3);
    let y = array![0, 1, 2];
    let batch = Batch::new(x.view(), y.view()).unwrap();

    let fresh = adapter.compute_metrics(Phase::Validation);
    adapter.training_step(batch, 0, &mut sink).unwrap();
    let train = adapter.compute_metrics(Phase::Train);

    assert_eq!(adapter.compute_metrics(Phase::Validation), fresh);
    assert!(adapter.compute_metrics(Phase::Test).values().all(|&v| v == 0.0));

    adapter.validation_step(batch, 0, &mut sink).unwrap();
    adapter.test_step(batch, 0, &mut sink).unwrap();
    assert_eq!(adapter.compute_metrics(Phase::Train), train);

    adapter.reset_metrics(Phase::Validation);
    assert_eq!(adapter.compute_metrics(Phase::Validation), fresh);
}

#[test]
fn forward_has_no_side_effects() {
    let adapter = TrainingAdapter::new(config("cnn1d", 6, 2)).unwrap();
    let x = Array2::from_shape_fn((3, 6), |(i, j)| (i * j) as f32);

    let first = adapter.forward(x.view()).unwrap();
    let second = adapter.forward(x.view()).unwrap();

    assert_eq!(first, second);
    assert!(adapter.model().grad().iter().all(|&g| g == 0.0));
    for phase in [Phase::Train, Phase::Validation, Phase::Test] {
        assert!(adapter.compute_metrics(phase).values().all(|&v| v == 0.0));
    }
}

#[test]
fn accuracy_reaches_one_once_the_labels_are_reproduced() {
    let mut config = config("mlp", 3, 3);
    config.model.hidden_sizes = vec![16];
    config.training.lr = 1e-2;

    let mut adapter = TrainingAdapter::new(config).unwrap();
    let mut sink = MemorySink::new();
    let mut schedule = adapter.configure_optimizers(&mut sink).unwrap();
    let x = Array2::<f32>::eye(3);
    let y = array![0, 1, 2];
    let batch = Batch::new(x.view(), y.view()).unwrap();

    for i in 0..300 {
        adapter.training_step(batch, i, &mut sink).unwrap();
        adapter.optimizer_step(&mut schedule.optimizer).unwrap();
    }

    let output = adapter.validation_step(batch, 0, &mut sink).unwrap();
    assert_eq!(output.metrics["val_Accuracy"], 1.0);
    assert_eq!(output.metrics["val_F1Score"], 1.0);

    let losses = sink.step_values("train_loss");
    assert!(losses.last().unwrap() < losses.first().unwrap());
}

#[test]
fn cnn1d_trains_through_every_channel() {
    let mut adapter = TrainingAdapter::new(config("cnn1d", 6, 3)).unwrap();
    let mut sink = MemorySink::new();
    let mut schedule = adapter.configure_optimizers(&mut sink).unwrap();
    let x = Array2::from_shape_fn((4, 6), |(i, j)| ((i + 1) * (j + 2)) as f32 / 10.0 - 1.0);
    let y = array![0, 1, 2, 0];
    let before = adapter.forward(x.view()).unwrap();

    let output = adapter
        .training_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink)
        .unwrap();
    assert!(output.loss.is_finite() && output.loss >= 0.0);
    // 4 channels, kernel 3: 4 * 3 kernel weights then 4 biases
    let conv_grad = &adapter.model().grad()[..16];
    assert!(conv_grad.iter().any(|&g| g != 0.0));

    adapter.optimizer_step(&mut schedule.optimizer).unwrap();
    assert!(adapter.model().grad().iter().all(|&g| g == 0.0));
    assert_ne!(adapter.forward(x.view()).unwrap(), before);
}

#[test]
fn optimizers_are_adamw_with_a_plateau_schedule_on_val_loss() {
    let adapter = TrainingAdapter::new(config("mlp", 4, 3)).unwrap();
    let mut sink = MemorySink::new();

    let schedule = adapter.configure_optimizers(&mut sink).unwrap();

    assert_eq!(schedule.lr_scheduler.monitor, "val_loss");
    assert_eq!(schedule.lr_scheduler.interval, Interval::Epoch);
    assert_eq!(schedule.lr_scheduler.scheduler.patience(), 5);
    assert_eq!(schedule.optimizer.learning_rate(), 1e-3);
    assert_eq!(sink.config()["optimizer"], "AdamW");
    assert_eq!(sink.config()["scheduler"], "ReduceLROnPlateau");
}

#[test]
fn learning_rate_never_drops_below_the_floor() {
    let adapter = TrainingAdapter::new(config("mlp", 4, 3)).unwrap();
    let mut schedule = adapter.configure_optimizers(&mut MemorySink::new()).unwrap();

    for _ in 0..5_000 {
        schedule.step_scheduler(1.0);
        assert!(schedule.optimizer.learning_rate() >= 1.0e-6);
    }
}

#[test]
fn malformed_batches_are_errors() {
    let mut adapter = TrainingAdapter::new(config("mlp", 4, 3)).unwrap();
    let mut sink = MemorySink::new();

    let x = Array2::<f32>::zeros((2, 5));
    let y = array![0, 1];
    assert!(matches!(
        adapter.training_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink),
        Err(AdapterErr::SizeMismatch { .. })
    ));

    let x = Array2::<f32>::zeros((2, 4));
    let y = array![0, 3];
    assert!(matches!(
        adapter.validation_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink),
        Err(AdapterErr::LabelOutOfRange { label: 3, num_classes: 3 })
    ));

    let x = Array2::<f32>::zeros((0, 4));
    let y = ndarray::Array1::<usize>::zeros(0);
    assert!(matches!(
        adapter.test_step(Batch::new(x.view(), y.view()).unwrap(), 0, &mut sink),
        Err(AdapterErr::EmptyBatch)
    ));

    assert!(sink.end_epoch(0).is_empty());
}
