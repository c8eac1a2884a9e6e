use std::{error::Error, fmt, io};

use ndarray::ShapeError;

use crate::config::Architecture;

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, AdapterErr>;

/// The training adapter's error type.
#[derive(Debug)]
pub enum AdapterErr {
    /// The configuration is semantically invalid.
    InvalidConfig(String),
    /// The selected architecture is recognized but has no implementation.
    UnimplementedArchitecture(Architecture),
    /// Two sizes that must agree do not.
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A label is not a valid class index.
    LabelOutOfRange { label: usize, num_classes: usize },
    /// A batch without samples was given.
    EmptyBatch,
    /// A backward pass was requested without a preceding cached forward pass.
    MissingForwardPass,
    /// The scheduler monitors a value that was never reported.
    MissingMonitor(String),
    Shape(ShapeError),
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for AdapterErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::UnimplementedArchitecture(arch) => {
                write!(f, "architecture '{}' is not implemented", arch.as_str())
            }
            Self::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}: got {got}, expected {expected}"),
            Self::LabelOutOfRange { label, num_classes } => write!(
                f,
                "label {label} is out of range for {num_classes} classes"
            ),
            Self::EmptyBatch => write!(f, "the batch has no samples"),
            Self::MissingForwardPass => {
                write!(f, "backward pass requested without a cached forward pass")
            }
            Self::MissingMonitor(key) => {
                write!(f, "monitored value '{key}' was not reported this epoch")
            }
            Self::Shape(e) => write!(f, "shape error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl Error for AdapterErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for AdapterErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<io::Error> for AdapterErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AdapterErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
