use std::fmt::Debug;
use std::sync::Arc;

use num_traits::{Float, FromPrimitive, ToPrimitive};

use crate::buffer::{Buffer, CpuBuffer};
use crate::error::FrameLossError;
use crate::types::DType;

/// Element types that can back a `Tensor` buffer.
///
/// Kernels are written once, generic over `T: TensorElement`, and the
/// `DType` of the input selects the instantiation.
pub trait TensorElement:
    Float + FromPrimitive + ToPrimitive + Debug + Default + Send + Sync + std::iter::Sum + 'static
{
    const DTYPE: DType;

    /// Borrows the typed CPU storage out of a buffer.
    fn cpu_slice(buffer: &Buffer) -> Result<&Arc<Vec<Self>>, FrameLossError>;

    /// Wraps owned data into a CPU buffer of the matching variant.
    fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer;

    /// Lossy conversion from an `f64` constant.
    fn from_f64_lossy(value: f64) -> Self {
        <Self as FromPrimitive>::from_f64(value).unwrap_or_else(Self::nan)
    }
}

impl TensorElement for f32 {
    const DTYPE: DType = DType::F32;

    fn cpu_slice(buffer: &Buffer) -> Result<&Arc<Vec<Self>>, FrameLossError> {
        buffer.try_get_cpu_f32()
    }

    fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
        CpuBuffer::F32(Arc::new(data))
    }
}

impl TensorElement for f64 {
    const DTYPE: DType = DType::F64;

    fn cpu_slice(buffer: &Buffer) -> Result<&Arc<Vec<Self>>, FrameLossError> {
        buffer.try_get_cpu_f64()
    }

    fn into_cpu_buffer(data: Vec<Self>) -> CpuBuffer {
        CpuBuffer::F64(Arc::new(data))
    }
}
