use crate::device::StorageDevice;
use crate::types::DType;
use thiserror::Error;

/// Custom error type for the frameloss crates.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum FrameLossError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Dimension mismatch: expected rank {expected}, got {actual} during operation {operation}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    /// Raised by the palette converter for anything that is not `#RRGGBB`.
    #[error("input #{input} is not in #RRGGBB format")]
    InvalidColor { input: String },

    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument { operation: String, message: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("Data type mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Weight loading error: {0}")]
    WeightLoading(String),

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Backward pass error: {0}")]
    BackwardError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for FrameLossError {
    fn from(err: std::io::Error) -> Self {
        FrameLossError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for FrameLossError {
    fn from(err: toml::de::Error) -> Self {
        FrameLossError::ConfigError(err.to_string())
    }
}
