// src/tensor/mod.rs

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::device::StorageDevice;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor_data::TensorData;
use crate::types::DType;

mod autograd_methods;
mod broadcast_utils;
pub mod create;
mod math_methods;
pub mod utils;
mod view_methods;

pub use create::{from_vec_f32, from_vec_f64, full, full_f64, ones, ones_f64, rand_uniform, randn, zeros, zeros_f64, zeros_like};

/// Represents a dense multi-dimensional array (tensor).
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared Ownership:** Clones point at the same underlying data.
/// 2.  **Interior Mutability:** Metadata such as `requires_grad` can be
///     modified through an immutable reference.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new Tensor with the given f32 data and shape on the CPU.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, FrameLossError> {
        Self::from_vec(data_vec, shape)
    }

    /// Creates a new Tensor with the given f64 data and shape on the CPU.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, FrameLossError> {
        Self::from_vec(data_vec, shape)
    }

    /// Creates a tensor from any supported element type.
    pub fn from_vec<T: TensorElement>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, FrameLossError> {
        let tensor_data = TensorData::from_vec(data_vec, shape)?;
        Ok(Tensor::from_tensor_data(tensor_data))
    }

    pub(crate) fn from_tensor_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns the device (`StorageDevice`) where the tensor's data resides.
    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Marks the tensor as tracked (or not) by autograd. Meant for leaves:
    /// clearing it on an op output does not detach its history.
    pub fn set_requires_grad(&self, requires_grad: bool) {
        self.write_data().requires_grad = requires_grad;
    }

    /// Acquires a read lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns the shared CPU storage of the tensor as `T`.
    ///
    /// # Errors
    /// `DeviceMismatch` if the tensor is not on the CPU, `DataTypeMismatch` if `T`
    /// does not match the tensor's dtype.
    pub(crate) fn cpu_data<T: TensorElement>(&self, operation: &str) -> Result<Arc<Vec<T>>, FrameLossError> {
        let guard = self.read_data();
        if guard.device != StorageDevice::CPU {
            return Err(FrameLossError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: guard.device,
                operation: operation.to_string(),
            });
        }
        if guard.dtype != T::DTYPE {
            return Err(FrameLossError::DataTypeMismatch {
                expected: T::DTYPE,
                actual: guard.dtype,
                operation: operation.to_string(),
            });
        }
        Ok(Arc::clone(T::cpu_slice(&guard.buffer)?))
    }

    /// Copies the data out as `Vec<f32>`. Fails on F64 tensors.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, FrameLossError> {
        Ok(self.cpu_data::<f32>("get_f32_data")?.as_ref().clone())
    }

    /// Copies the data out as `Vec<f64>`. Fails on F32 tensors.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, FrameLossError> {
        Ok(self.cpu_data::<f64>("get_f64_data")?.as_ref().clone())
    }

    /// Copies the data out widened to `f64`, whatever the dtype.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>, FrameLossError> {
        match self.dtype() {
            DType::F32 => Ok(self
                .cpu_data::<f32>("to_f64_vec")?
                .iter()
                .map(|&v| v as f64)
                .collect()),
            DType::F64 => self.get_f64_data(),
        }
    }

    /// Value of a single-element F32 tensor.
    pub fn item_f32(&self) -> Result<f32, FrameLossError> {
        self.check_single_element("item_f32")?;
        Ok(self.cpu_data::<f32>("item_f32")?[0])
    }

    /// Value of a single-element F64 tensor.
    pub fn item_f64(&self) -> Result<f64, FrameLossError> {
        self.check_single_element("item_f64")?;
        Ok(self.cpu_data::<f64>("item_f64")?[0])
    }

    /// Value of a single-element tensor widened to `f64`.
    pub fn item(&self) -> Result<f64, FrameLossError> {
        self.check_single_element("item")?;
        Ok(self.to_f64_vec()?[0])
    }

    fn check_single_element(&self, operation: &str) -> Result<(), FrameLossError> {
        if self.numel() != 1 {
            return Err(FrameLossError::ShapeMismatch {
                expected: vec![],
                actual: self.shape(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Moves the tensor to `device`. Only the CPU has a backend, so any other
    /// target is rejected.
    pub fn to_device(&self, device: StorageDevice) -> Result<Tensor, FrameLossError> {
        match device {
            StorageDevice::CPU if self.device() == StorageDevice::CPU => Ok(self.clone()),
            other => Err(FrameLossError::UnsupportedOperation(format!(
                "Moving tensors to {:?} is not supported",
                other
            ))),
        }
    }
}

impl Clone for Tensor {
    /// Shallow clone: both handles share the same `TensorData`.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("dtype", &guard.dtype)
            .field("device", &guard.device)
            .field("requires_grad", &guard.requires_grad)
            .field("grad_fn", &guard.grad_fn)
            .finish()
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
