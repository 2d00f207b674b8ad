// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::types::DType;

/// Internal storage and metadata for a Tensor.
///
/// Wrapped in `Arc<RwLock<TensorData>>` by `Tensor` so clones are cheap and
/// autograd metadata can be updated through a shared reference.
/// Data is always laid out contiguously in row-major order.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying data buffer. Shared between a tensor and its reshaped views.
    pub(crate) buffer: Arc<Buffer>,
    pub(crate) device: StorageDevice,
    pub(crate) dtype: DType,
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<usize>,

    /// Whether operations on this tensor are recorded for the backward pass.
    /// Frozen backbone parameters have it cleared.
    pub(crate) requires_grad: bool,
    /// Gradient accumulated by `backward()`. Only leaves keep one.
    pub(crate) grad: Option<Tensor>,
    /// The operation that produced this tensor; `None` for leaves.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new CPU `TensorData` from typed data and a shape.
    ///
    /// # Errors
    /// Returns `FrameLossError::TensorCreationError` if the length of `data_vec` does not match
    /// the number of elements described by `shape`.
    pub fn from_vec<T: TensorElement>(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, FrameLossError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(FrameLossError::TensorCreationError { data_len, shape });
        }
        let strides = calculate_strides(&shape);
        let buffer = Arc::new(Buffer::Cpu(T::into_cpu_buffer(data_vec)));

        Ok(TensorData {
            buffer,
            device: StorageDevice::CPU,
            dtype: T::DTYPE,
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Creates a `TensorData` sharing `buffer` under a new shape.
    /// Used by reshape-like operations; the caller guarantees the element count matches.
    pub(crate) fn new_view(
        buffer: Arc<Buffer>,
        device: StorageDevice,
        dtype: DType,
        shape: Vec<usize>,
    ) -> Self {
        let strides = calculate_strides(&shape);
        TensorData {
            buffer,
            device,
            dtype,
            shape,
            strides,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Always true for now: every op materializes contiguous output.
    pub fn is_contiguous(&self) -> bool {
        self.strides == calculate_strides(&self.shape)
    }

    /// Linear offset of a multi-dimensional index.
    pub fn get_offset(&self, indices: &[usize]) -> usize {
        indices
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }
}
