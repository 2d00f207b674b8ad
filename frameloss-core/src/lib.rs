// Core modules of the crate
pub mod autograd;
pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;

// Layers, model containers and the losses
pub mod model;
pub mod nn;

// Re-export the Tensor type so it is reachable as `frameloss_core::Tensor`
pub use tensor::Tensor;
// Re-export traits required by public functions/structs
pub use num_traits;

pub use config::{LossConfig, LossKind};
pub use device::StorageDevice;
pub use error::FrameLossError;
pub use nn::losses::Loss;
pub use types::DType;
