use crate::error::FrameLossError;
use crate::ops::reduction::sum::record_sum;
use crate::ops::reduction::utils::{normalize_axes, reduce_axes, reduced_shape};
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Averages the tensor over `axes` (all axes when `None`).
///
/// Reducing over an empty extent yields NaN, as `0 / 0` would.
pub fn mean_op(a: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, FrameLossError> {
    let shape = a.shape();
    let axes = normalize_axes(axes, shape.len(), "mean")?;
    let count: usize = axes.iter().map(|&d| shape[d]).product();
    let output = match a.dtype() {
        DType::F32 => mean_typed::<f32>(a, &shape, &axes, count, keep_dims)?,
        DType::F64 => mean_typed::<f64>(a, &shape, &axes, count, keep_dims)?,
    };
    Ok(record_sum(a, axes, 1.0 / count as f64, output))
}

fn mean_typed<T: TensorElement>(
    a: &Tensor,
    shape: &[usize],
    axes: &[usize],
    count: usize,
    keep_dims: bool,
) -> Result<Tensor, FrameLossError> {
    let data = a.cpu_data::<T>("mean")?;
    let n = T::from_f64_lossy(count as f64);
    let out: Vec<T> = reduce_axes(&data, shape, axes, T::zero(), |acc, x| acc + x)
        .into_iter()
        .map(|s| s / n)
        .collect();
    Tensor::from_vec(out, reduced_shape(shape, axes, keep_dims))
}
