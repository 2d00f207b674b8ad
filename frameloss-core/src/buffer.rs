use std::sync::Arc;

use crate::device::StorageDevice;
use crate::error::FrameLossError;

/// Enum representing different buffer types based on device and data type.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Data resides on the CPU.
    Cpu(CpuBuffer),
    /// Placeholder for a GPU allocation. Only its length is tracked.
    Gpu { device: StorageDevice, len: usize },
}

/// Enum for CPU-specific buffer types.
#[derive(Debug, Clone)]
pub enum CpuBuffer {
    F32(Arc<Vec<f32>>),
    F64(Arc<Vec<f64>>),
}

impl Buffer {
    /// Number of elements held by the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::Cpu(CpuBuffer::F32(data)) => data.len(),
            Buffer::Cpu(CpuBuffer::F64(data)) => data.len(),
            Buffer::Gpu { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>` if this is a CPU F32 buffer.
    pub fn try_get_cpu_f32(&self) -> Result<&Arc<Vec<f32>>, FrameLossError> {
        match self {
            Buffer::Cpu(CpuBuffer::F32(data_arc)) => Ok(data_arc),
            Buffer::Cpu(CpuBuffer::F64(_)) => Err(FrameLossError::UnsupportedOperation(
                "Buffer is CPU but not F32 type".to_string(),
            )),
            Buffer::Gpu { device, .. } => Err(FrameLossError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: *device,
                operation: "try_get_cpu_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f64>>` if this is a CPU F64 buffer.
    pub fn try_get_cpu_f64(&self) -> Result<&Arc<Vec<f64>>, FrameLossError> {
        match self {
            Buffer::Cpu(CpuBuffer::F64(data_arc)) => Ok(data_arc),
            Buffer::Cpu(CpuBuffer::F32(_)) => Err(FrameLossError::UnsupportedOperation(
                "Buffer is CPU but not F64 type".to_string(),
            )),
            Buffer::Gpu { device, .. } => Err(FrameLossError::DeviceMismatch {
                expected: StorageDevice::CPU,
                actual: *device,
                operation: "try_get_cpu_f64".to_string(),
            }),
        }
    }
}
